use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "debug.log";

/// Default debug log path under the user cache directory.
pub fn default_log_path() -> PathBuf {
    ProjectDirs::from("com", "bucket-browser", "bucket-browser")
        .map(|dirs| dirs.cache_dir().join(LOG_FILE_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join("bucket-browser-debug.log"))
}

/// Sends `tracing` output to `path`. The terminal belongs to the UI, so
/// nothing is ever written to stdout or stderr.
///
/// Without this call every `tracing` macro is a no-op.
pub fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_log_name() {
        let path = default_log_path();
        assert!(
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(".log"))
        );
    }
}
