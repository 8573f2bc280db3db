use crate::day_window::DayWindow;
use crate::errors::{RepoError, StorageError};
use crate::models::{JournalEntry, UploadedMedia};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining persistence operations for journal entries.
///
/// Every method is a single store operation; nothing spans two calls.
#[async_trait]
pub trait JournalRepository: Send + Sync + 'static {
    /// Persists a new entry. The store assigns the id and both timestamps.
    async fn create(
        &self,
        owner_id: &str,
        content: &str,
        images: Vec<String>,
    ) -> Result<JournalEntry, RepoError>;

    /// Replaces `content` and `images` of an existing entry wholesale.
    async fn update(
        &self,
        id: Uuid,
        content: &str,
        images: Vec<String>,
    ) -> Result<JournalEntry, RepoError>;

    /// Removes an entry and returns what was stored.
    async fn delete(&self, id: Uuid) -> Result<JournalEntry, RepoError>;

    async fn find_all_by_owner(&self, owner_id: &str) -> Result<Vec<JournalEntry>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<JournalEntry, RepoError>;

    /// First entry of `owner_id` created inside `window`, if any.
    async fn find_created_within(
        &self,
        owner_id: &str,
        window: DayWindow,
    ) -> Result<Option<JournalEntry>, RepoError>;

    /// The owner's entry for the current local day.
    ///
    /// When several entries fall on the same day, which one is returned is
    /// left to the store.
    async fn find_today(&self, owner_id: &str) -> Result<Option<JournalEntry>, RepoError> {
        self.find_created_within(owner_id, DayWindow::today()).await
    }
}

/// Trait for the external media host that turns image bytes into public URLs.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedMedia, StorageError>;
}

/// Rejects new entries the document schema would not accept.
pub fn validate_new_entry(owner_id: &str, content: &str) -> Result<(), RepoError> {
    if owner_id.trim().is_empty() {
        return Err(RepoError::Validation("ownerId is required".to_string()));
    }
    validate_content(content)
}

pub fn validate_content(content: &str) -> Result<(), RepoError> {
    if content.is_empty() {
        return Err(RepoError::Validation("content is required".to_string()));
    }
    Ok(())
}
