use std::fmt;

use super::error::StorageError;

/// Identifier of a stored blob: a `/`-separated relative path.
///
/// Keys are validated on construction so a key can always be joined onto a
/// storage root without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Generate a fresh key for an uploaded file under the given prefix.
    ///
    /// A UUID component keeps two uploads with the same original filename
    /// from colliding.
    pub fn generate(prefix: &str, original_name: &str) -> BlobKey {
        let name = sanitize_file_name(original_name);
        BlobKey(format!("{prefix}/{}-{name}", uuid::Uuid::new_v4()))
    }

    /// Parse an externally supplied key, rejecting empty, absolute, and
    /// traversal paths.
    pub fn parse(raw: &str) -> Result<BlobKey, StorageError> {
        if raw.is_empty() || raw.len() > 512 {
            return Err(StorageError::InvalidKey(
                "key must be 1-512 characters".into(),
            ));
        }
        if raw.starts_with('/') || raw.ends_with('/') {
            return Err(StorageError::InvalidKey(
                "key must be a relative path".into(),
            ));
        }
        for segment in raw.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(StorageError::InvalidKey(format!(
                    "illegal path segment in key '{raw}'"
                )));
            }
            if segment.chars().any(|c| c == '\\' || c.is_control()) {
                return Err(StorageError::InvalidKey(
                    "key contains forbidden characters".into(),
                ));
            }
        }
        Ok(BlobKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the key, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The final path segment, useful for content-type guessing.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keep filenames to a safe ASCII subset; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(128)
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
