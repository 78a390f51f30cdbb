//! Base-path resolution for auxiliary run artifacts.
//!
//! Pure configuration: nothing in the computation core reads or writes the
//! filesystem. Callers that persist run artifacts anchor them under the
//! directory resolved here.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Environment variable that overrides the artifact base directory.
pub const BASE_DIR_ENV: &str = "REGIMEN_BASE_DIR";

const DEFAULT_DIR_NAME: &str = "regimen";

/// Resolves the base directory for auxiliary run artifacts.
///
/// `REGIMEN_BASE_DIR` wins when set and non-empty; otherwise the user's home
/// directory (falling back to the current directory when no home is known)
/// anchors a `regimen/` subtree.
pub fn resolve_base_path() -> PathBuf {
    let override_dir = env::var_os(BASE_DIR_ENV);
    let home = env::var_os("HOME");
    let path = resolve_from(override_dir.as_deref(), home.as_deref());
    log::debug!("base path resolved to {}", path.display());
    path
}

fn resolve_from(override_dir: Option<&OsStr>, home: Option<&OsStr>) -> PathBuf {
    if let Some(dir) = override_dir {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    home.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
