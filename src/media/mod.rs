//! Question image storage
//!
//! Uploads go to S3 when configured. Any storage failure degrades to a
//! placeholder URL so the editor can continue.

pub mod s3;

pub use s3::S3ImageStore;

use tracing::{info, warn};

use crate::types::{AdminError, Result};

/// Object storage for uploaded images
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the bytes under `key` and return the public URL
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<String>;
}

/// Stand-in used when no bucket is configured. Every upload fails.
pub struct DisabledImageStore;

#[async_trait::async_trait]
impl ImageStore for DisabledImageStore {
    async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: Option<&str>) -> Result<String> {
        Err(AdminError::Storage("S3 is not configured".into()))
    }
}

/// Object key for an uploaded image: `questions/{unix-millis}-{file-name}`
pub fn image_key(millis: i64, file_name: &str) -> String {
    // Some browsers send a full client path
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("image");
    format!("questions/{}-{}", millis, base)
}

pub fn placeholder_url(millis: i64) -> String {
    format!(
        "https://via.placeholder.com/400x300/cccccc/666666?text=Image+Uploaded+{}",
        millis
    )
}

/// Upload an image, falling back to a placeholder URL on any storage error
pub async fn upload_image(
    store: &dyn ImageStore,
    file_name: &str,
    bytes: Vec<u8>,
    content_type: Option<&str>,
) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let key = image_key(millis, file_name);
    let size = bytes.len();

    match store.put(&key, bytes, content_type).await {
        Ok(url) => {
            info!(key = %key, size, "Image uploaded");
            url
        }
        Err(e) => {
            let url = placeholder_url(millis);
            warn!(key = %key, error = %e, fallback = %url, "Image upload failed, using placeholder");
            url
        }
    }
}
