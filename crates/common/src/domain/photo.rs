use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Key prefix under which photos are written
pub const PHOTO_KEY_PREFIX: &str = "photos/";

/// Object storage for uploaded photo content
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PhotoContentStore: Send + Sync {
    /// Store content under `key`, overwriting any existing object
    async fn upload(&self, key: &str, content: Bytes) -> Result<()>;

    /// Publicly resolvable URL for `key`; no network call
    fn public_url(&self, key: &str) -> String;
}

/// Derive a collision-free object key: time-ordered xid prefix plus the original file name
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, so the key is stored verbatim
/// and can be placed in a URL without escaping.
pub fn photo_object_key(filename: &str) -> String {
    let name: String = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("photo")
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();

    format!("{}{}-{}", PHOTO_KEY_PREFIX, xid::new(), name)
}
