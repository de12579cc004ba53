use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const DOWNLOAD_SUBDIR: &str = "Pictures";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("export name is empty")]
    MissingExportName,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Local download target for exported images.
#[derive(Debug, Clone)]
pub struct DownloadStorage {
    download_dir: PathBuf,
}

impl DownloadStorage {
    pub const fn with_path(download_dir: PathBuf) -> Self {
        Self { download_dir }
    }

    pub fn with_default_path() -> StorageResult<Self> {
        let home = std::env::var("HOME").map_err(|_| StorageError::MissingHomeDirectory)?;
        let mut download_dir = PathBuf::from(home);
        download_dir.push(DOWNLOAD_SUBDIR);
        fs::create_dir_all(&download_dir)?;
        Ok(Self::with_path(download_dir))
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// `<dir>/<name>.png`; path separators in `name` are replaced.
    pub fn allocate_target_path(&self, name: &str) -> StorageResult<PathBuf> {
        let name = sanitize_name(name);
        if name.is_empty() {
            return Err(StorageError::MissingExportName);
        }
        let mut path = self.download_dir.clone();
        path.push(format!("{name}.png"));
        Ok(path)
    }

    /// Writes the PNG bytes, overwriting an existing file of the same name.
    pub fn save_png(&self, name: &str, png: &[u8]) -> StorageResult<PathBuf> {
        let target = self.allocate_target_path(name)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, png)?;
        tracing::info!(path = %target.display(), bytes = png.len(), "exported image written");
        Ok(target)
    }
}

fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches(".png");
    trimmed
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect()
}
