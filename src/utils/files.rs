//! Directory traversal for reference corpora.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Recursively list every file under `root`, sorted by path.
///
/// Symbolic links to files are listed; symbolic links to directories are not
/// followed. Subdirectories that cannot be read are skipped with a warning.
///
/// # Errors
///
/// Returns an IO error if `root` itself cannot be read.
pub fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut is_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if !is_root => {
                warn!("Skipping unreadable directory {}: {e}", dir.display());
                continue;
            }
            Err(e) => return Err(e),
        };
        is_root = false;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
