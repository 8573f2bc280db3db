//! Resolves staged image attachments to public URLs before anything is persisted.

use crate::{domain::MediaStore, errors::StorageError, models::StagedImage};
use std::time::Duration;
use uuid::Uuid;

/// Uploads `images` one after another and returns their URLs in input order.
///
/// The first failure aborts the batch. Objects uploaded before the failure
/// stay on the media host.
pub async fn upload_all(
    store: &dyn MediaStore,
    owner_id: &str,
    images: Vec<StagedImage>,
    timeout: Duration,
) -> Result<Vec<String>, StorageError> {
    let mut urls = Vec::with_capacity(images.len());

    for (index, image) in images.into_iter().enumerate() {
        let key = object_key(owner_id, &image);
        let content_type = content_type_for(&image, &key);
        tracing::debug!(index, s3_key = %key, %content_type, "Uploading journal image");

        let uploaded = tokio::time::timeout(timeout, store.upload(&key, image.data, &content_type))
            .await
            .map_err(|_| StorageError::Timeout { key: key.clone(), after: timeout })?
            .inspect_err(|e| tracing::warn!(index, s3_key = %key, error = %e, "Aborting image batch"))?;

        if uploaded.secure_url.trim().is_empty() {
            return Err(StorageError::MissingUrl(key));
        }
        urls.push(uploaded.secure_url);
    }

    Ok(urls)
}

fn object_key(owner_id: &str, image: &StagedImage) -> String {
    format!("journals/{}/{}.{}", owner_id, Uuid::new_v4(), image.extension())
}

fn content_type_for(image: &StagedImage, key: &str) -> String {
    image
        .content_type
        .clone()
        .or_else(|| mime_guess::from_path(key).first_raw().map(|s| s.to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string())
}
