use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::reports::dtos::ImageUpload;
use crate::modules::storage::ImageStore;
use crate::shared::constants::REPORT_IMAGE_FOLDER;

/// Outcome of a best-effort batch deletion
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionSummary {
    pub deleted: usize,
    pub failed: Vec<String>,
}

/// Uploads and removes report photos
pub struct ImageService {
    store: Arc<dyn ImageStore>,
}

impl ImageService {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// `cats/{user_id}/{uuid}.{ext}`, relative to the public storage area
    fn image_path(user_id: &str, image: &ImageUpload) -> String {
        let owner: String = user_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        format!(
            "{}/{}/{}.{}",
            REPORT_IMAGE_FOLDER,
            owner,
            Uuid::new_v4(),
            image.extension()
        )
    }

    /// Upload every photo in order and return their URLs
    ///
    /// All or nothing: if one upload fails, the ones already stored are removed
    /// again (best effort) before the error is returned.
    pub async fn upload_all(&self, user_id: &str, images: &[ImageUpload]) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(images.len());

        for image in images {
            let path = Self::image_path(user_id, image);
            match self
                .store
                .put_image(&path, &image.data, &image.content_type)
                .await
            {
                Ok(url) => urls.push(url),
                Err(e) => {
                    tracing::error!("Failed to upload image '{}': {:?}", image.file_name, e);
                    self.delete_all(&urls).await;
                    return Err(e);
                }
            }
        }

        tracing::info!("Uploaded {} image(s) for user {}", urls.len(), user_id);
        Ok(urls)
    }

    /// Delete every URL independently; failures are logged and never returned
    pub async fn delete_all(&self, urls: &[String]) -> DeletionSummary {
        let results = join_all(urls.iter().map(|url| async move {
            (url, self.store.delete_image(url).await)
        }))
        .await;

        let mut summary = DeletionSummary::default();
        for (url, result) in results {
            match result {
                Ok(()) => summary.deleted += 1,
                Err(e) => {
                    tracing::warn!("Failed to delete image {}: {:?}", url, e);
                    summary.failed.push(url.clone());
                }
            }
        }
        summary
    }
}
