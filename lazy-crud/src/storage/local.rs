//! Local filesystem storage

use super::{FileStorage, StorageError, StorageResult, StoredFile, UploadedFile};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Stores uploads flat in one public directory under random names
///
/// ```rust,no_run
/// use lazy_crud::storage::{FileStorage, LocalFileStorage, UploadedFile};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), lazy_crud::storage::StorageError> {
/// let storage = LocalFileStorage::new(PathBuf::from("./storage/public"), "/storage")?;
/// let stored = storage
///     .store(UploadedFile::new("cat.png", None, vec![0x89, 0x50]))
///     .await?;
/// assert!(stored.url.starts_with("/storage/"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_path: PathBuf,
    public_url: String,
}

impl LocalFileStorage {
    /// Create a storage rooted at `base_path`, served under `public_url`
    ///
    /// The directory is created on first store.
    pub fn new(base_path: PathBuf, public_url: impl Into<String>) -> StorageResult<Self> {
        if base_path.exists() && !base_path.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                base_path.display()
            )));
        }

        Ok(Self {
            base_path,
            public_url: public_url.into(),
        })
    }

    /// Directory files are written to
    #[must_use]
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.public_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, file: UploadedFile) -> StorageResult<StoredFile> {
        fs::create_dir_all(&self.base_path).await?;

        let id = Uuid::new_v4().simple().to_string();
        let name = match file.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id,
        };
        let path = self.base_path.join(&name);

        let mut f = fs::File::create(&path).await?;
        f.write_all(&file.data).await?;
        f.flush().await?;

        tracing::debug!(name = %name, size = file.size(), "stored upload");

        Ok(StoredFile {
            url: self.url_for(&name),
            path: path.to_string_lossy().to_string(),
            name,
        })
    }
}
