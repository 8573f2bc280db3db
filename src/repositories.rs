use crate::{
    day_window::DayWindow,
    domain::{JournalRepository, validate_content, validate_new_entry},
    errors::RepoError,
    models::JournalEntry,
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client as DynamoDbClient,
    types::{AttributeValue, ReturnValue},
};
use chrono::{DateTime, Timelike, Utc};
use std::collections::HashMap;
use tracing::{self, info};
use uuid::Uuid;

/// Secondary index keyed by owner, sorted by creation time.
pub const OWNER_INDEX: &str = "owner_id-created_at-index";

type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone)]
pub struct DynamoDbJournalRepository {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoDbJournalRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbJournalRepository");
        Self { client, table_name }
    }

    /// Runs an owner-index query to completion, following `LastEvaluatedKey`.
    async fn query_owner(
        &self,
        owner_id: &str,
        window: Option<DayWindow>,
        limit: Option<i32>,
    ) -> Result<Vec<JournalEntry>, RepoError> {
        let mut entries = Vec::new();
        let mut last_evaluated_key: Option<Item> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(OWNER_INDEX)
                .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_string()))
                .set_exclusive_start_key(last_evaluated_key.take())
                .set_limit(limit);

            request = match window {
                Some(window) => request
                    .key_condition_expression("owner_id = :owner AND created_at BETWEEN :start AND :end")
                    .expression_attribute_values(":start", millis_attr(window.start_millis()))
                    .expression_attribute_values(":end", millis_attr(window.end_millis())),
                None => request.key_condition_expression("owner_id = :owner"),
            };

            let resp = request
                .send()
                .await
                .context(format!("DynamoDB: Failed to query table '{}' for owner {}", self.table_name, owner_id))?;

            for item in resp.items.unwrap_or_default() {
                entries.push(parse_item(&item, &self.table_name)?);
            }

            if limit.is_some_and(|limit| entries.len() >= limit as usize) {
                break;
            }
            match resp.last_evaluated_key {
                Some(key) => {
                    tracing::debug!("DynamoDB Query (table: {}): Continuing with LastEvaluatedKey...", self.table_name);
                    last_evaluated_key = Some(key);
                }
                None => break,
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl JournalRepository for DynamoDbJournalRepository {
    /// Stores a new entry with PutItem, refusing to overwrite an existing id.
    async fn create(
        &self,
        owner_id: &str,
        content: &str,
        images: Vec<String>,
    ) -> Result<JournalEntry, RepoError> {
        validate_new_entry(owner_id, content)?;

        let now = now_millis_precision();
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            content: content.to_string(),
            images,
            created_at: now,
            updated_at: now,
        };

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(entry_to_item(&entry)))
            .condition_expression("attribute_not_exists(entry_id)")
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to put journal (id: {})", self.table_name, entry.id))?;

        tracing::debug!(journal_id = %entry.id, table_name = %self.table_name, "DynamoDB: Journal stored");
        Ok(entry)
    }

    /// Replaces content and images with a conditional UpdateItem.
    async fn update(
        &self,
        id: Uuid,
        content: &str,
        images: Vec<String>,
    ) -> Result<JournalEntry, RepoError> {
        validate_content(content)?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("entry_id", AttributeValue::S(id.to_string()))
            .update_expression("SET #content = :content, #images = :images, updated_at = :updated_at")
            .condition_expression("attribute_exists(entry_id)")
            .expression_attribute_names("#content", "content")
            .expression_attribute_names("#images", "images")
            .expression_attribute_values(":content", AttributeValue::S(content.to_string()))
            .expression_attribute_values(":images", images_attr(&images))
            .expression_attribute_values(":updated_at", millis_attr(now_millis_precision().timestamp_millis()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => {
                let item = output.attributes.ok_or_else(|| {
                    RepoError::DataCorruption(format!("UpdateItem returned no attributes for journal {}", id))
                })?;
                parse_item(&item, &self.table_name)
            }
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_conditional_check_failed_exception()) {
                    tracing::debug!(journal_id = %id, "DynamoDB: Update target does not exist");
                    return Err(RepoError::NotFound(id));
                }
                Err(anyhow::Error::new(e)
                    .context(format!("DynamoDB (table: {}): Failed to update journal (id: {})", self.table_name, id))
                    .into())
            }
        }
    }

    /// Deletes with DeleteItem and echoes the old attributes.
    async fn delete(&self, id: Uuid) -> Result<JournalEntry, RepoError> {
        tracing::debug!(journal_id = %id, table_name = %self.table_name, "DynamoDB: Deleting item");

        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("entry_id", AttributeValue::S(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to delete journal (id: {})", self.table_name, id))?;

        // DeleteItem succeeds for missing keys; no old attributes means nothing was there.
        let item = output.attributes.ok_or(RepoError::NotFound(id))?;
        parse_item(&item, &self.table_name)
    }

    async fn find_all_by_owner(&self, owner_id: &str) -> Result<Vec<JournalEntry>, RepoError> {
        let entries = self.query_owner(owner_id, None, None).await?;
        tracing::info!("DynamoDB (table: {}): Listed {} journals for owner {}", self.table_name, entries.len(), owner_id);
        Ok(entries)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<JournalEntry, RepoError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("entry_id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to get journal (id: {})", self.table_name, id))?;

        let item = resp.item.ok_or(RepoError::NotFound(id))?;
        parse_item(&item, &self.table_name)
    }

    async fn find_created_within(
        &self,
        owner_id: &str,
        window: DayWindow,
    ) -> Result<Option<JournalEntry>, RepoError> {
        tracing::debug!(owner_id, start = %window.start, end = %window.end, "DynamoDB: Looking up journal in day window");
        let mut entries = self.query_owner(owner_id, Some(window), Some(1)).await?;
        Ok(entries.pop().filter(|entry| window.contains(entry.created_at)))
    }
}

fn now_millis_precision() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.timestamp_subsec_millis() * 1_000_000).unwrap_or(now)
}

fn millis_attr(millis: i64) -> AttributeValue {
    AttributeValue::N(millis.to_string())
}

fn images_attr(images: &[String]) -> AttributeValue {
    AttributeValue::L(images.iter().cloned().map(AttributeValue::S).collect())
}

fn entry_to_item(entry: &JournalEntry) -> Item {
    HashMap::from([
        ("entry_id".to_string(), AttributeValue::S(entry.id.to_string())),
        ("owner_id".to_string(), AttributeValue::S(entry.owner_id.clone())),
        ("content".to_string(), AttributeValue::S(entry.content.clone())),
        ("images".to_string(), images_attr(&entry.images)),
        ("created_at".to_string(), millis_attr(entry.created_at.timestamp_millis())),
        ("updated_at".to_string(), millis_attr(entry.updated_at.timestamp_millis())),
    ])
}

fn parse_item(item: &Item, table_name: &str) -> Result<JournalEntry, RepoError> {
    item_to_entry(item).ok_or_else(|| {
        let item_id = item.get("entry_id").and_then(|v| v.as_s().ok());
        tracing::error!(item.id = ?item_id, %table_name, "DynamoDB: Failed to parse item into JournalEntry");
        RepoError::DataCorruption(format!(
            "Failed to parse journal {:?} from DynamoDB table '{}'",
            item_id, table_name
        ))
    })
}

fn item_to_entry(item: &Item) -> Option<JournalEntry> {
    let id = item
        .get("entry_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let owner_id = item.get("owner_id")?.as_s().ok()?.to_string();
    let content = item.get("content")?.as_s().ok()?.to_string();
    let images = item
        .get("images")?
        .as_l()
        .ok()?
        .iter()
        .map(|value| value.as_s().ok().cloned())
        .collect::<Option<Vec<String>>>()?;
    let created_at = millis_from(item.get("created_at")?)?;
    let updated_at = millis_from(item.get("updated_at")?)?;

    Some(JournalEntry { id, owner_id, content, images, created_at, updated_at })
}

fn millis_from(value: &AttributeValue) -> Option<DateTime<Utc>> {
    let millis = value.as_n().ok()?.parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}
