use crate::{
    AppState,
    auth::AuthUser,
    domain::validate_content,
    errors::AppError,
    models::{JournalListResponse, JournalResponse, StagedImage},
    uploads::upload_all,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing;
use uuid::Uuid;

/// Fields of a create/update form.
struct JournalForm {
    content: Option<String>,
    images: Vec<StagedImage>,
}

async fn read_journal_form(mut multipart: Multipart) -> Result<JournalForm, AppError> {
    let mut content = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        match field_name.as_str() {
            "content" => {
                content = Some(field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read content: {}", e))
                })?)
            }
            "images" | "images[]" => {
                let file_name = field.file_name().map(|s| s.to_string()).filter(|s| !s.is_empty());
                let content_type = field.content_type().map(|m| m.to_string());
                let data = field.bytes().await?.to_vec();
                // Browsers send an empty, nameless part for an untouched file input.
                if file_name.is_none() && data.is_empty() {
                    continue;
                }
                images.push(StagedImage { file_name, content_type, data });
            }
            _ => tracing::debug!("Ignoring unknown multipart field: {}", field_name),
        }
    }

    Ok(JournalForm { content, images })
}

/// Pulls the required content out of the form before any upload happens.
fn required_content(form: &mut JournalForm) -> Result<String, AppError> {
    let content = form
        .content
        .take()
        .ok_or_else(|| AppError::MissingFormField("content".to_string()))?;
    validate_content(&content)?;
    Ok(content)
}

pub async fn create_journal(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = read_journal_form(multipart).await?;
    let content = required_content(&mut form)?;
    let image_count = form.images.len();

    let images = upload_all(state.media_store.as_ref(), &owner_id, form.images, state.upload_timeout).await?;
    let journal = state.journal_repo.create(&owner_id, &content, images).await?;

    tracing::info!(journal_id = %journal.id, %owner_id, image_count, "Journal created");
    Ok((StatusCode::CREATED, Json(JournalResponse::ok("Journal added successfully", journal))))
}

pub async fn update_journal(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id_str): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let journal_id = Uuid::parse_str(&id_str)?;
    let mut form = read_journal_form(multipart).await?;
    let content = required_content(&mut form)?;

    let images = upload_all(state.media_store.as_ref(), &owner_id, form.images, state.upload_timeout).await?;
    let journal = state.journal_repo.update(journal_id, &content, images).await?;

    tracing::info!(%journal_id, image_count = journal.images.len(), "Journal updated");
    Ok(Json(JournalResponse::ok("Journal updated successfully", journal)))
}

pub async fn delete_journal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let journal_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%journal_id, %user_id, "Deleting journal");

    let journal = state.journal_repo.delete(journal_id).await?;

    // Images stay on the media host.
    tracing::info!(%journal_id, orphaned_images = journal.images.len(), "Journal deleted");
    Ok(Json(JournalResponse::ok("Journal deleted successfully", journal)))
}

pub async fn list_journals(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let journals = state.journal_repo.find_all_by_owner(&owner_id).await?;
    tracing::debug!(%owner_id, count = journals.len(), "Listed journals");
    Ok(Json(JournalListResponse {
        success: true,
        message: "Journals fetched successfully",
        journals,
    }))
}

pub async fn get_journal(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let journal_id = Uuid::parse_str(&id_str)?;
    let journal = state.journal_repo.find_by_id(journal_id).await?;
    Ok(Json(JournalResponse::ok("Journal fetched successfully", journal)))
}

pub async fn get_today_journal(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let journal = state
        .journal_repo
        .find_today(&owner_id)
        .await
        .inspect_err(|e| tracing::error!(%owner_id, error = %e, "Error fetching today's journal"))?
        .ok_or(AppError::NoJournalToday)?;

    Ok(Json(JournalResponse::ok("Journal fetched successfully", journal)))
}
