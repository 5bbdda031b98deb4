//! CLI command implementations

pub mod build;
pub mod clean;
pub mod init;
pub mod targets;

/// Build args are stored with `#` in place of `$` so injection tokens can be
/// passed through the shell unquoted; undo that here.
pub fn unescape_injection_args(args: &[String]) -> Vec<String> {
    args.iter().map(|a| a.replace('#', "$")).collect()
}
