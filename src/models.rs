use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A journal entry as persisted and returned to clients.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub owner_id: String,
    pub content: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An image attachment received with a request, held until it is uploaded.
#[derive(Debug, Clone)]
pub struct StagedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl StagedImage {
    /// Lower-cased extension of the original file name, `bin` when there is none.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Result of a successful upload to the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub secure_url: String,
}

#[derive(Serialize, Debug)]
pub struct JournalResponse {
    pub success: bool,
    pub message: &'static str,
    pub journal: JournalEntry,
}

impl JournalResponse {
    pub fn ok(message: &'static str, journal: JournalEntry) -> Self {
        Self { success: true, message, journal }
    }
}

#[derive(Serialize, Debug)]
pub struct JournalListResponse {
    pub success: bool,
    pub message: &'static str,
    pub journals: Vec<JournalEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn staged(name: Option<&str>) -> StagedImage {
        StagedImage {
            file_name: name.map(str::to_string),
            content_type: None,
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn extension_is_lowercased_from_file_name() {
        assert_eq!(staged(Some("Beach.JPG")).extension(), "jpg");
        assert_eq!(staged(Some("archive.tar.gz")).extension(), "gz");
    }

    #[test]
    fn extension_defaults_to_bin() {
        assert_eq!(staged(None).extension(), "bin");
        assert_eq!(staged(Some("README")).extension(), "bin");
        assert_eq!(staged(Some("trailing.")).extension(), "bin");
    }

    #[test]
    fn entry_serializes_with_camel_case_fields() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap();
        let entry = JournalEntry {
            id: Uuid::nil(),
            owner_id: "user-1".to_string(),
            content: "Today was good".to_string(),
            images: vec!["https://cdn.example/a.jpg".to_string()],
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["ownerId"], "user-1");
        assert_eq!(json["images"][0], "https://cdn.example/a.jpg");
        assert_eq!(json["createdAt"], "2026-10-17T08:30:00Z");
        assert!(json.get("owner_id").is_none());
    }
}
