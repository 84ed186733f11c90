//! Tracing subscriber setup for the `conclave-call` binary.
//!
//! `RUST_LOG` takes precedence over the `--verbose` default. Output goes to
//! stderr so `simulate --json` keeps stdout clean, or to an append-mode file
//! without ANSI colors when `--log-file` is given.

use crate::Result;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    match log_file {
        Some(path) => builder
            .with_writer(open_log_file(path)?)
            .with_ansi(false)
            .init(),
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "conclave_call=debug"
    } else {
        "conclave_call=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Open `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "conclave_call=debug");
        assert_eq!(default_directive(false), "conclave_call=info");
    }

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("call.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
