use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

/// Copy `path` into `backup_dir` as `<stem>_<YYYYMMDD_HHMMSS>.bak` before a
/// destructive change. A missing source is not an error.
pub fn create_backup(path: &Path, backup_dir: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = backup_dir.join(format!("{}_{}.bak", stem, stamp));

    fs::create_dir_all(backup_dir)
        .with_context(|| format!("creating backup directory {}", backup_dir.display()))?;
    fs::copy(path, &backup_path)
        .with_context(|| format!("backing up {}", path.display()))?;
    info!("Backup created: {}", backup_path.display());
    Ok(Some(backup_path))
}

/// Replace `path` with `content` via a temp file in the same directory, so a
/// failed write never leaves a half-written target behind.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("staging write for {}", path.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
