use crate::{domain::MediaStore, errors::StorageError, models::UploadedMedia};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client as S3Client, error::SdkError, operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use tracing;

#[derive(Debug, Clone)]
pub struct S3MediaStore {
    client: S3Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3MediaStore {
    pub fn new(client: S3Client, bucket_name: String, public_base_url: String) -> Self {
        Self { client, bucket_name, public_base_url }
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_base_url, key)
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    /// Uploads data to S3 using PutObject and returns the object's public URL.
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedMedia, StorageError> {
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, content_type, size = data.len(), "S3: Uploading file");

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| put_error(key, e))?;

        let secure_url = self.public_url(key);
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, %secure_url, "S3: Upload successful");
        Ok(UploadedMedia { secure_url })
    }
}

/// S3 rejecting the object is an upload failure; anything that never got a
/// service response (timeouts, dispatch, construction) is a backend error.
fn put_error(key: &str, err: SdkError<PutObjectError>) -> StorageError {
    if let Some(service_error) = err.as_service_error() {
        return StorageError::UploadFailed(format!("S3 rejected object '{}': {}", key, service_error));
    }
    StorageError::BackendError(
        anyhow::Error::new(err).context(format!("S3: Failed to upload object with key '{}'", key)),
    )
}

fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
