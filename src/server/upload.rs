//! Scoped storage for uploaded images.
//!
//! An upload lives in a named temporary file inside the configured upload
//! directory for as long as the returned [`NamedTempFile`] is held. Dropping
//! it removes the file, whichever way the request ends.

use std::path::Path;

use tempfile::NamedTempFile;

/// Write `bytes` to a fresh temporary file under `dir`.
///
/// The directory is created if it does not exist yet.
///
/// # Errors
/// Returns the underlying I/O error if the directory or file cannot be written
pub async fn store_upload(dir: &Path, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    tokio::fs::create_dir_all(dir).await?;

    let file = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(dir)?;
    tokio::fs::write(file.path(), bytes).await?;

    tracing::debug!(path = %file.path().display(), size = bytes.len(), "Stored upload");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads");

        let upload = store_upload(&nested, b"jpeg bytes").await.unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");

        drop(upload);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 0);
    }
}
