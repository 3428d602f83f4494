//! File discovery: settings files and the project document.
//!
//! Settings files are looked up in a list of [`SearchPath`]s given in
//! **priority-ascending** order (last = highest). Missing files are silently
//! skipped; only real I/O errors (permissions, etc.) are propagated.
//!
//! The project document is found by walking up from a start directory until a
//! directory containing the file is reached, the way `.editorconfig` or
//! `.gitignore` lookups work.

use std::path::{Path, PathBuf};

use crate::error::EncfigError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Read every `{dir}/{file_name}` that exists, in search-path order.
pub fn load_settings_files(
    search_paths: &[SearchPath],
    file_name: &str,
    app_name: &str,
) -> Result<Vec<(PathBuf, String)>, EncfigError> {
    let mut results = Vec::new();
    for dir in search_paths
        .iter()
        .filter_map(|sp| resolve_search_path(sp, app_name))
    {
        let file_path = dir.join(file_name);
        match std::fs::read_to_string(&file_path) {
            Ok(content) => {
                tracing::debug!(path = %file_path.display(), "loaded settings file");
                results.push((file_path, content));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(EncfigError::IoError {
                    path: file_path,
                    source: e,
                });
            }
        }
    }
    Ok(results)
}

/// Find the nearest `file_name` at or above `start`.
///
/// Checks `start` first, then each parent up to the filesystem root, and
/// returns the first existing path.
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}
