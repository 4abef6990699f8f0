//! Disk I/O helpers: read the whole blob and atomic write.
//!
//! The rename-over approach is close to atomic on most platforms. On FAT32 or
//! network shares there are no hard guarantees.

use crate::error::{Error, Result};
use std::path::Path;

/// Reads the file at `path`. Returns `None` if the file is missing, empty, or
/// only whitespace; callers treat all three as an empty collection.
pub fn read_blob(path: &Path) -> Result<Option<Vec<u8>>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Unavailable(format!("{}: {e}", path.display()))),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(bytes))
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. Readers see
/// either the old file or the new one, never a half-written one. Missing
/// parent directories are created first.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Unavailable(e.to_string()))?;
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    std::fs::write(&tmp, bytes).map_err(|e| Error::Unavailable(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::Unavailable(e.to_string()))?;
    Ok(())
}

/// Rejects paths that can never hold a document.
pub(crate) fn check_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::Config("storage path is empty".into()));
    }
    if path.is_dir() {
        return Err(Error::Config(format!("{} is a directory", path.display())));
    }
    Ok(())
}
