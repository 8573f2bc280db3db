//! In-memory doubles for the repository and media ports.

use crate::{
    day_window::DayWindow,
    domain::{JournalRepository, MediaStore, validate_content, validate_new_entry},
    errors::{RepoError, StorageError},
    models::{JournalEntry, UploadedMedia},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryJournalRepository {
    entries: Mutex<Vec<JournalEntry>>,
    unavailable: bool,
}

impl InMemoryJournalRepository {
    pub fn with_entries(entries: Vec<JournalEntry>) -> Self {
        Self { entries: Mutex::new(entries), unavailable: false }
    }

    /// A repository whose every call fails like an unreachable database.
    pub fn unavailable() -> Self {
        Self { entries: Mutex::default(), unavailable: true }
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.unavailable {
            return Err(RepoError::BackendError(anyhow::anyhow!("connection refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for InMemoryJournalRepository {
    async fn create(
        &self,
        owner_id: &str,
        content: &str,
        images: Vec<String>,
    ) -> Result<JournalEntry, RepoError> {
        self.check_available()?;
        validate_new_entry(owner_id, content)?;
        let now = Utc::now();
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            content: content.to_string(),
            images,
            created_at: now,
            updated_at: now,
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        id: Uuid,
        content: &str,
        images: Vec<String>,
    ) -> Result<JournalEntry, RepoError> {
        self.check_available()?;
        validate_content(content)?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(RepoError::NotFound(id))?;
        entry.content = content.to_string();
        entry.images = images;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<JournalEntry, RepoError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let position = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(RepoError::NotFound(id))?;
        Ok(entries.remove(position))
    }

    async fn find_all_by_owner(&self, owner_id: &str) -> Result<Vec<JournalEntry>, RepoError> {
        self.check_available()?;
        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| entry.owner_id == owner_id)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<JournalEntry, RepoError> {
        self.check_available()?;
        self.entries()
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(RepoError::NotFound(id))
    }

    async fn find_created_within(
        &self,
        owner_id: &str,
        window: DayWindow,
    ) -> Result<Option<JournalEntry>, RepoError> {
        self.check_available()?;
        Ok(self
            .entries()
            .into_iter()
            .find(|entry| entry.owner_id == owner_id && window.contains(entry.created_at)))
    }
}

enum Script {
    Succeed,
    FailAt { index: usize, message: String },
    BlankUrl,
    Stall(Duration),
}

/// Media store that records uploads and misbehaves on request.
pub struct ScriptedMediaStore {
    script: Script,
    attempts: AtomicUsize,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl Default for ScriptedMediaStore {
    fn default() -> Self {
        Self::with_script(Script::Succeed)
    }
}

impl ScriptedMediaStore {
    fn with_script(script: Script) -> Self {
        Self { script, attempts: AtomicUsize::new(0), uploads: Mutex::default() }
    }

    /// Fails the upload at zero-based `index` with `message`.
    pub fn failing_at(index: usize, message: &str) -> Self {
        Self::with_script(Script::FailAt { index, message: message.to_string() })
    }

    pub fn returning_blank_urls() -> Self {
        Self::with_script(Script::BlankUrl)
    }

    pub fn stalling(delay: Duration) -> Self {
        Self::with_script(Script::Stall(delay))
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn uploaded_payloads(&self) -> Vec<Vec<u8>> {
        self.uploads.lock().unwrap().iter().map(|(_, data)| data.clone()).collect()
    }
}

#[async_trait]
impl MediaStore for ScriptedMediaStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<UploadedMedia, StorageError> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::FailAt { index: failing, message } if *failing == index => {
                return Err(StorageError::UploadFailed(message.clone()));
            }
            Script::BlankUrl => return Ok(UploadedMedia { secure_url: String::new() }),
            Script::Stall(delay) => tokio::time::sleep(*delay).await,
            Script::Succeed | Script::FailAt { .. } => {}
        }
        self.uploads.lock().unwrap().push((key.to_string(), data));
        Ok(UploadedMedia { secure_url: format!("https://cdn.example/{key}") })
    }
}
