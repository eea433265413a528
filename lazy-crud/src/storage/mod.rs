//! Public file uploads
//!
//! The `upload` action hands the multipart `file` field to a [`FileStorage`]
//! and answers the public URL of the stored file.

mod local;

pub use local::LocalFileStorage;

use async_trait::async_trait;
use thiserror::Error;

/// Storage error
#[derive(Debug, Error)]
pub enum StorageError {
    /// The request carried no `file` field
    #[error("no file was uploaded")]
    MissingFile,

    /// The upload exceeds the configured limit
    #[error("file is larger than {max} bytes")]
    TooLarge {
        /// Configured limit
        max: usize,
    },

    /// The storage path is unusable
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    /// I/O error while writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file received from a request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name
    pub filename: String,
    /// Client-supplied content type
    pub content_type: Option<String>,
    /// File contents
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Create an uploaded file
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data,
        }
    }

    /// Size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lower-case extension of the client file name, alphanumeric only
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        let ext: String = ext
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(16)
            .collect::<String>()
            .to_ascii_lowercase();
        (!ext.is_empty()).then_some(ext)
    }
}

/// A stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated file name
    pub name: String,
    /// Path on disk
    pub path: String,
    /// Public URL
    pub url: String,
}

/// Where uploads go
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store a file and return where it can be reached
    async fn store(&self, file: UploadedFile) -> StorageResult<StoredFile>;
}
