use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory missing or not writable: {0}")]
    Directory(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed data in {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Ensure a directory exists; create if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::Directory(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::Directory(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::Directory(e.to_string()))?;
    }
    Ok(())
}

/// Replaces `path` with `content` via a temp file in the same directory and a rename,
/// so readers see either the old or the new file, never a partial one.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), PersistError> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    ensure_dir(dir)?;

    let mut tmp = if dir.as_os_str().is_empty() {
        NamedTempFile::new_in(".")?
    } else {
        NamedTempFile::new_in(dir)?
    };
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
