//! Zip archiving of built binaries
//!
//! One archive per artifact, written next to the per-target output
//! directories as `<base>_<os>-<arch>.zip` and containing the binary under
//! its own name.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::build::target::Target;

/// Archive file name for one artifact: `<base>_<os>-<arch>.zip`.
/// The base is the binary name without its extension.
pub fn archive_name(bin_name: &str, target: &Target) -> String {
    let base = bin_name.split('.').next().unwrap_or(bin_name);
    format!("{}_{}.zip", base, target.dir_name())
}

/// Zip the produced binary, returning the archive path
pub fn zip_binary(target: &Target, bin_dir: &Path, bin_name: &str) -> Result<PathBuf> {
    let bin_path = bin_dir.join(bin_name);
    let parent = bin_dir.parent().unwrap_or(bin_dir);
    let zip_path = parent.join(archive_name(bin_name, target));

    let file = File::create(&zip_path)
        .with_context(|| format!("Failed to create archive: {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(bin_name, options)?;
    let mut reader = File::open(&bin_path)
        .with_context(|| format!("Failed to open binary: {}", bin_path.display()))?;
    std::io::copy(&mut reader, &mut zip)?;
    zip.finish()?;

    Ok(zip_path)
}
