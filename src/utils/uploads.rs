use tracing::warn;
use uuid::Uuid;

use projex_core::file_storage::{check_upload, extension_for};
use projex_core::{AppError, FileStorage, StorageError};

use crate::utils::multipart::UploadedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
    pub mimetype: String,
    pub size: usize,
}

/// Rejected uploads are the client's fault; backend failures are ours.
pub fn storage_error(e: StorageError) -> AppError {
    if e.is_client_error() {
        AppError::unprocessable(anyhow::anyhow!(e.to_string()))
    } else {
        AppError::internal(e)
    }
}

/// Checks the file against `allowed` and the storage size limit, then stores
/// it under `{prefix}/{uuid}.{ext}`.
pub async fn store_upload(
    storage: &dyn FileStorage,
    prefix: &str,
    file: &UploadedFile,
    allowed: &[&str],
) -> Result<StoredFile, AppError> {
    let mimetype = file.content_type.to_ascii_lowercase();
    check_upload(&mimetype, file.size(), allowed, storage.max_file_size()).map_err(storage_error)?;

    let key = format!("{}/{}.{}", prefix, Uuid::new_v4(), extension_for(&mimetype));
    let key = storage.save(&key, &file.bytes).await.map_err(storage_error)?;
    let url = storage.get_url(&key).map_err(storage_error)?;

    Ok(StoredFile {
        key,
        url,
        mimetype,
        size: file.size(),
    })
}

/// Best-effort removal. Failures are logged, not returned.
pub async fn discard_files(storage: &dyn FileStorage, keys: &[&str]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            warn!(storage.key = %key, error = %e, "Failed to delete stored file");
        }
    }
}
