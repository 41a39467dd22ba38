use crate::{CoreError, CoreResult};
use async_trait::async_trait;

/// Blob-store collaborator for listing images. The platform only keeps the
/// returned public URL; where the bytes actually live is not its concern.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image and return its public URL.
    async fn store_image(&self, filename: &str, bytes: &[u8]) -> CoreResult<String>;
}

pub struct MockMediaStore {
    pub base_url: String,
}

impl MockMediaStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn store_image(&self, filename: &str, bytes: &[u8]) -> CoreResult<String> {
        // In a real deployment this uploads to the media host and returns
        // its CDN URL. The mock just mints a stable-looking address.
        if bytes.is_empty() {
            return Err(CoreError::MediaError("empty image payload".to_string()));
        }

        let key = uuid::Uuid::new_v4().simple();
        let extension = filename.rsplit('.').next().unwrap_or("jpg");

        tracing::info!("Storing image {} ({} bytes)", filename, bytes.len());

        Ok(format!("{}/{}.{}", self.base_url, key, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_mints_urls_under_base() {
        let store = MockMediaStore::new("https://media.example.com/");
        let url = store.store_image("front.png", b"not-a-real-png").await.unwrap();

        assert!(url.starts_with("https://media.example.com/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let store = MockMediaStore::new("https://media.example.com");
        assert!(store.store_image("front.png", b"").await.is_err());
    }
}
