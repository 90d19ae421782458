//! One-time environment setup, done before any run starts.

use slidebot_core::AutoplayError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Overrides the browser executable when no --chrome flag is given
pub const CHROME_ENV: &str = "SLIDEBOT_CHROME";

/// Find the browser to drive: explicit path, then env var, then the
/// platform's usual install locations.
pub fn locate_browser(explicit: Option<&Path>) -> Result<PathBuf, AutoplayError> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CHROME_ENV).map(PathBuf::from));

    let path = match requested {
        Some(path) if path.is_file() => path,
        Some(path) => {
            return Err(AutoplayError::Setup(format!(
                "browser executable {} does not exist",
                path.display()
            )))
        }
        None => headless_chrome::browser::default_executable().map_err(|e| {
            AutoplayError::Setup(format!(
                "no Chrome or Chromium installation found ({}); install one or set {}",
                e, CHROME_ENV
            ))
        })?,
    };

    info!(path = %path.display(), "using browser");
    Ok(path)
}
