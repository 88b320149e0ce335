//! Saved-articles handlers

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::handlers::path::IdPath;
use crate::AppState;
use newsnotes_common::{
    db::{ArticleWithNotes, Repository},
    errors::{AppError, Result},
};

/// List saved articles with their notes
pub async fn list_saved(State(state): State<AppState>) -> Result<Json<Vec<ArticleWithNotes>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.list_saved().await?))
}

/// Mark an article saved
pub async fn save_article(
    State(state): State<AppState>,
    IdPath(article_id): IdPath<Uuid>,
) -> Result<Json<ArticleWithNotes>> {
    set_saved(state, article_id, true).await
}

/// Remove an article from the saved list
pub async fn unsave_article(
    State(state): State<AppState>,
    IdPath(article_id): IdPath<Uuid>,
) -> Result<Json<ArticleWithNotes>> {
    set_saved(state, article_id, false).await
}

async fn set_saved(state: AppState, article_id: Uuid, saved: bool) -> Result<Json<ArticleWithNotes>> {
    let repo = Repository::new(state.db.clone());

    let article = repo
        .set_saved(article_id, saved)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    tracing::info!(article_id = %article_id, saved, "Saved flag updated");

    Ok(Json(article))
}
