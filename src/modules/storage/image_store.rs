use async_trait::async_trait;

use super::MinIOClient;
use crate::core::error::AppError;

/// Where report photos live
///
/// Report handling only needs to store a photo and later remove it by the URL
/// it was published under.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `data` under `path` (relative to the public area) and return its URL
    async fn put_image(&self, path: &str, data: &[u8], content_type: &str)
        -> Result<String, AppError>;

    /// Remove the object behind a URL returned by [`put_image`](Self::put_image)
    async fn delete_image(&self, url: &str) -> Result<(), AppError>;
}

#[async_trait]
impl ImageStore for MinIOClient {
    async fn put_image(
        &self,
        path: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let key = self.generate_key(path);
        self.upload(&key, data, content_type).await?;
        Ok(self.get_file_url(&key))
    }

    async fn delete_image(&self, url: &str) -> Result<(), AppError> {
        let key = self.extract_key_from_url(url).ok_or_else(|| {
            AppError::BadRequest(format!("URL is not managed by this storage: {}", url))
        })?;
        self.delete(&key).await
    }
}
