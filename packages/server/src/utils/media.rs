use common::{BlobKey, BlobStore};

use crate::config::StorageConfig;

/// Build the public URL under which an uploaded blob is served.
pub fn public_url_for_key(storage: &StorageConfig, key: &BlobKey) -> String {
    format!(
        "{}/{}",
        storage.public_base_url.trim_end_matches('/'),
        key.as_str()
    )
}

/// Reverse of [`public_url_for_key`]: recover the blob key from a stored
/// image URL. Returns `None` for URLs that point outside our own storage
/// (clients may register externally hosted images via the JSON endpoints).
pub fn key_for_public_url(storage: &StorageConfig, url: &str) -> Option<BlobKey> {
    let base = storage.public_base_url.trim_end_matches('/');
    let rest = url.strip_prefix(base)?.strip_prefix('/')?;
    BlobKey::parse(rest).ok()
}

/// Delete a blob behind an image URL if it lives in our own storage.
/// Failures are logged and swallowed; the database row is the source of
/// truth and orphaned files can be swept out of band.
pub async fn try_delete_blob(storage: &StorageConfig, blob_store: &dyn BlobStore, url: &str) {
    if let Some(key) = key_for_public_url(storage, url)
        && let Err(e) = blob_store.delete(&key).await
    {
        tracing::warn!(key = %key.as_str(), error = %e, "failed to delete blob");
    }
}
