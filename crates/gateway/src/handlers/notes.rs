//! Note handlers

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::handlers::path::IdPath;
use crate::AppState;
use newsnotes_common::{
    db::{models::Note, ArticleWithNotes, Repository},
    errors::{AppError, Result},
};

/// List every note
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.list_notes().await?))
}

/// Delete a note and drop it from the article's list.
///
/// The note is removed even when the article does not exist; the 404 only
/// reports that there is no article to return.
pub async fn delete_note(
    State(state): State<AppState>,
    IdPath((note_id, article_id)): IdPath<(Uuid, Uuid)>,
) -> Result<Json<ArticleWithNotes>> {
    let repo = Repository::new(state.db.clone());

    let article = repo.detach_note(note_id, article_id).await?;

    tracing::info!(
        note_id = %note_id,
        article_id = %article_id,
        "Note deleted"
    );

    article.map(Json).ok_or_else(|| AppError::ArticleNotFound {
        id: article_id.to_string(),
    })
}
