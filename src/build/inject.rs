//! Shell-substitution tokens in build arguments
//!
//! Arguments may embed `$(command ...)` tokens, typically to stamp version
//! information into ldflags, e.g.
//! `-ldflags=-X main.GitHash=$(git rev-parse HEAD)`. Each token is replaced
//! with the captured stdout of the command, run in the project's working
//! directory. A failing command degrades to an empty substitution with a
//! warning; it never aborts the build.

use std::path::Path;
use std::sync::OnceLock;

use console::style;
use regex::Regex;

use crate::exec::{run_command, ExecOptions};

fn injection_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\([\w\W]+?\)").unwrap())
}

/// Run one embedded command and capture its stdout.
///
/// The trailing newline is trimmed so substitutions compose into flags
/// without breaking the argument.
fn capture_output(inner: &str, work_dir: &Path) -> String {
    let mut parts = inner.split(' ').filter(|s| !s.is_empty());
    let Some(program) = parts.next() else {
        return String::new();
    };
    let args: Vec<String> = parts.map(String::from).collect();

    let opts = ExecOptions::in_dir(work_dir);
    match run_command(program, &args, &opts, false) {
        Ok(result) if result.success => {
            let mut out = result.stdout;
            while out.ends_with('\n') || out.ends_with('\r') {
                out.pop();
            }
            out
        }
        Ok(result) => {
            eprintln!(
                "{} injected command '{}' exited with {}, substituting empty output",
                style("⚠").yellow(),
                inner,
                result.exit_code
            );
            String::new()
        }
        Err(_) => {
            eprintln!(
                "{} injected command '{}' could not be run, substituting empty output",
                style("⚠").yellow(),
                inner
            );
            String::new()
        }
    }
}

/// Replace every `$(...)` token in `args` with the output of the enclosed
/// command. Idempotent: a second pass over resolved arguments is a no-op.
pub fn resolve_injections(args: &mut [String], work_dir: &Path) {
    for arg in args.iter_mut() {
        let tokens: Vec<String> = injection_regex()
            .find_iter(arg)
            .map(|m| m.as_str().to_string())
            .collect();
        if tokens.is_empty() {
            continue;
        }

        let mut resolved = arg.clone();
        for token in tokens {
            let inner = token
                .trim_start_matches("$(")
                .trim_end_matches(')')
                .to_string();
            let output = capture_output(&inner, work_dir);
            resolved = resolved.replace(&token, &output);
        }
        *arg = resolved;
    }
}
