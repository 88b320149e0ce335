//! Repository pattern for database operations
//!
//! Articles and notes live in separate tables; an article's note list is the
//! set of `article_notes` rows pointing at it. Reads resolve that list with an
//! explicit batch fetch instead of per-article queries.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Article fields needed to store a scraped record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub summary: String,
}

/// Article with its note references resolved to full notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleWithNotes {
    #[serde(flatten)]
    pub article: Article,
    pub note: Vec<Note>,
}

/// Article with its note references left as ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleWithNoteIds {
    #[serde(flatten)]
    pub article: Article,
    pub note: Vec<Uuid>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Store one scraped article
    pub async fn create_article(&self, new: NewArticle) -> Result<Article> {
        let article = ArticleActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new.title),
            link: Set(new.link),
            summary: Set(new.summary),
            saved: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        article.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// List every article with its notes resolved
    pub async fn list_articles(&self) -> Result<Vec<ArticleWithNotes>> {
        let articles = ArticleEntity::find()
            .order_by_asc(ArticleColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        resolve_notes(self.read_conn(), articles).await
    }

    /// List articles the user has saved
    pub async fn list_saved(&self) -> Result<Vec<ArticleWithNotes>> {
        let articles = ArticleEntity::find()
            .filter(ArticleColumn::Saved.eq(true))
            .order_by_asc(ArticleColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        resolve_notes(self.read_conn(), articles).await
    }

    /// Find one article by ID with its notes resolved
    pub async fn get_article(&self, id: Uuid) -> Result<Option<ArticleWithNotes>> {
        let Some(article) = ArticleEntity::find_by_id(id).one(self.read_conn()).await? else {
            return Ok(None);
        };

        Ok(resolve_notes(self.read_conn(), vec![article]).await?.pop())
    }

    /// Flip the saved flag, returning the updated article
    pub async fn set_saved(&self, id: Uuid, saved: bool) -> Result<Option<ArticleWithNotes>> {
        let Some(article) = ArticleEntity::find_by_id(id).one(self.write_conn()).await? else {
            return Ok(None);
        };

        let mut article: ArticleActiveModel = article.into();
        article.saved = Set(saved);
        let article = article.update(self.write_conn()).await?;

        Ok(resolve_notes(self.write_conn(), vec![article]).await?.pop())
    }

    /// Remove every article along with its note references.
    ///
    /// Notes themselves are left in place.
    pub async fn delete_all_articles(&self) -> Result<u64> {
        let txn = self.write_conn().begin().await?;

        ArticleNoteEntity::delete_many().exec(&txn).await?;
        let result = ArticleEntity::delete_many().exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected)
    }

    // ========================================================================
    // Note Operations
    // ========================================================================

    /// List every note
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        NoteEntity::find()
            .order_by_asc(NoteColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a note that is not yet attached to any article
    pub async fn create_note(&self, body: serde_json::Value) -> Result<Note> {
        insert_note(self.write_conn(), body).await
    }

    /// Add a note reference to an article.
    ///
    /// Attaching a note that is already referenced leaves the list unchanged.
    /// Returns `None` when either the article or the note does not exist.
    pub async fn attach_note(&self, article_id: Uuid, note_id: Uuid) -> Result<Option<ArticleWithNoteIds>> {
        let txn = self.write_conn().begin().await?;

        if NoteEntity::find_by_id(note_id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Ok(None);
        }
        let attached = link_note(&txn, article_id, note_id).await?;

        txn.commit().await?;
        Ok(attached)
    }

    /// Create a note and attach it to an article in one transaction.
    ///
    /// Returns `None` without creating anything when the article is missing.
    pub async fn create_note_for_article(
        &self,
        article_id: Uuid,
        body: serde_json::Value,
    ) -> Result<Option<(Note, ArticleWithNoteIds)>> {
        let txn = self.write_conn().begin().await?;

        if ArticleEntity::find_by_id(article_id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Ok(None);
        }

        let note = insert_note(&txn, body).await?;
        let attached = link_note(&txn, article_id, note.id).await?;

        txn.commit().await?;
        Ok(attached.map(|article| (note, article)))
    }

    /// Delete a note and pull its id out of every article's list.
    ///
    /// Deleting a note that does not exist is not an error. Returns the
    /// article named by `article_id` as it looks afterwards.
    pub async fn detach_note(&self, note_id: Uuid, article_id: Uuid) -> Result<Option<ArticleWithNotes>> {
        let txn = self.write_conn().begin().await?;

        let unlinked = ArticleNoteEntity::delete_many()
            .filter(ArticleNoteColumn::NoteId.eq(note_id))
            .exec(&txn)
            .await?;
        let deleted = NoteEntity::delete_by_id(note_id).exec(&txn).await?;

        tracing::debug!(
            note_id = %note_id,
            notes_deleted = deleted.rows_affected,
            references_removed = unlinked.rows_affected,
            "Note detached"
        );

        let article = match ArticleEntity::find_by_id(article_id).one(&txn).await? {
            Some(article) => resolve_notes(&txn, vec![article]).await?.pop(),
            None => None,
        };

        txn.commit().await?;
        Ok(article)
    }
}

async fn insert_note<C: ConnectionTrait>(conn: &C, body: serde_json::Value) -> Result<Note> {
    let note = NoteActiveModel {
        id: Set(Uuid::new_v4()),
        body: Set(body),
        created_at: Set(chrono::Utc::now().into()),
    };

    note.insert(conn).await.map_err(Into::into)
}

/// Insert the reference row unless it already exists, then read the
/// article back with its note ids.
async fn link_note<C: ConnectionTrait>(
    conn: &C,
    article_id: Uuid,
    note_id: Uuid,
) -> Result<Option<ArticleWithNoteIds>> {
    let Some(article) = ArticleEntity::find_by_id(article_id).one(conn).await? else {
        return Ok(None);
    };

    let link = ArticleNoteActiveModel {
        article_id: Set(article_id),
        note_id: Set(note_id),
        attached_at: Set(chrono::Utc::now().into()),
    };

    ArticleNoteEntity::insert(link)
        .on_conflict(
            OnConflict::columns([ArticleNoteColumn::ArticleId, ArticleNoteColumn::NoteId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let note = ArticleNoteEntity::find()
        .filter(ArticleNoteColumn::ArticleId.eq(article_id))
        .order_by_asc(ArticleNoteColumn::AttachedAt)
        .order_by_asc(ArticleNoteColumn::NoteId)
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.note_id)
        .collect();

    Ok(Some(ArticleWithNoteIds { article, note }))
}

/// Fetch the reference rows and notes for a batch of articles and stitch
/// them together. References to notes that no longer exist are skipped.
async fn resolve_notes<C: ConnectionTrait>(conn: &C, articles: Vec<Article>) -> Result<Vec<ArticleWithNotes>> {
    if articles.is_empty() {
        return Ok(Vec::new());
    }

    let article_ids: Vec<Uuid> = articles.iter().map(|a| a.id).collect();
    let links = ArticleNoteEntity::find()
        .filter(ArticleNoteColumn::ArticleId.is_in(article_ids))
        .order_by_asc(ArticleNoteColumn::AttachedAt)
        .order_by_asc(ArticleNoteColumn::NoteId)
        .all(conn)
        .await?;

    let note_ids: HashSet<Uuid> = links.iter().map(|link| link.note_id).collect();
    let notes: HashMap<Uuid, Note> = if note_ids.is_empty() {
        HashMap::new()
    } else {
        NoteEntity::find()
            .filter(NoteColumn::Id.is_in(note_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|note| (note.id, note))
            .collect()
    };

    let mut by_article: HashMap<Uuid, Vec<Note>> = HashMap::new();
    for link in links {
        if let Some(note) = notes.get(&link.note_id) {
            by_article.entry(link.article_id).or_default().push(note.clone());
        }
    }

    Ok(articles
        .into_iter()
        .map(|article| {
            let note = by_article.remove(&article.id).unwrap_or_default();
            ArticleWithNotes { article, note }
        })
        .collect())
}
