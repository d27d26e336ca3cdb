//! Staging store implementation using Apache OpenDAL.

use std::path::PathBuf;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use serde::Deserialize;
use uuid::Uuid;

use super::error::StorageError;

/// Where staged uploads live.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StagingBackend {
    /// Local filesystem directory.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory; staged files vanish on restart.
    Memory,
}

impl StagingBackend {
    /// Create local filesystem backend.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the backend name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

/// Holds uploaded files between the request that receives them and the
/// background job that imports them.
#[derive(Debug, Clone)]
pub struct StagingStore {
    operator: Operator,
    backend: &'static str,
    max_file_size: u64,
}

impl StagingStore {
    /// Default max upload size: 20MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

    /// Create a staging store for the given backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn from_backend(backend: &StagingBackend, max_file_size: u64) -> Result<Self, StorageError> {
        let operator = match backend {
            StagingBackend::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StagingBackend::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(Self {
            operator,
            backend: backend.name(),
            max_file_size,
        })
    }

    /// Create an in-memory store with the default size limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory service cannot be initialized.
    pub fn memory() -> Result<Self, StorageError> {
        Self::from_backend(&StagingBackend::Memory, Self::DEFAULT_MAX_FILE_SIZE)
    }

    /// Validate an upload size against the configured limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::FileTooLarge` above the limit.
    pub fn validate_size(&self, size: u64) -> Result<(), StorageError> {
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }
        Ok(())
    }

    /// Generate the staging key for a job's upload.
    ///
    /// Format: `uploads/{job_id}/{sanitized_filename}`
    #[must_use]
    pub fn staging_key(job_id: Uuid, filename: &str) -> String {
        format!("uploads/{job_id}/{}", sanitize_filename(filename))
    }

    /// Stage an upload and return its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or the write fails.
    pub async fn stage(
        &self,
        job_id: Uuid,
        filename: &str,
        data: Bytes,
    ) -> Result<String, StorageError> {
        self.validate_size(data.len() as u64)?;
        let key = Self::staging_key(job_id, filename);
        self.operator.write(&key, data).await?;
        tracing::debug!(key = %key, backend = self.backend, "upload staged");
        Ok(key)
    }

    /// Read a staged file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is staged under `key`.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(key)
            } else {
                StorageError::from(e)
            }
        })?;
        Ok(buffer.to_vec())
    }

    /// Remove a staged file. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a file is staged under `key`.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the backend name.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }
}

/// Sanitize filename for storage key.
///
/// Only ASCII alphanumerics, dots, hyphens and underscores survive; anything
/// else becomes `_`. The extension is kept so the format stays detectable.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
