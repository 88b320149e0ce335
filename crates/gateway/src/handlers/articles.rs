//! Article handlers

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::handlers::payload::NotePayload;
use crate::handlers::path::IdPath;
use crate::AppState;
use newsnotes_common::{
    db::{ArticleWithNoteIds, ArticleWithNotes, Repository},
    errors::{AppError, Result},
};

/// Response after clearing the article table
#[derive(Serialize)]
pub struct DeleteAllResponse {
    pub deleted: u64,
}

/// List every article with its notes
pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<ArticleWithNotes>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.list_articles().await?))
}

/// Get one article with its notes
pub async fn get_article(
    State(state): State<AppState>,
    IdPath(article_id): IdPath<Uuid>,
) -> Result<Json<ArticleWithNotes>> {
    let repo = Repository::new(state.db.clone());

    repo.get_article(article_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })
}

/// Create a note from the request body and attach it to the article
pub async fn add_note(
    State(state): State<AppState>,
    IdPath(article_id): IdPath<Uuid>,
    NotePayload(body): NotePayload,
) -> Result<Json<ArticleWithNoteIds>> {
    let repo = Repository::new(state.db.clone());

    let (note, article) = repo
        .create_note_for_article(article_id, body)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    tracing::info!(
        article_id = %article_id,
        note_id = %note.id,
        "Note attached"
    );

    Ok(Json(article))
}

/// Delete every article
pub async fn delete_all_articles(State(state): State<AppState>) -> Result<Json<DeleteAllResponse>> {
    let repo = Repository::new(state.db.clone());
    let deleted = repo.delete_all_articles().await?;

    tracing::info!(deleted, "All articles deleted");

    Ok(Json(DeleteAllResponse { deleted }))
}
