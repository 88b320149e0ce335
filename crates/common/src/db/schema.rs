//! Table bootstrap
//!
//! Tables are derived from the entity definitions and created only when
//! missing. There is no migration history.

use crate::db::models::{ArticleEntity, ArticleNoteEntity, NoteEntity};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};
use tracing::info;

/// Create the `articles`, `notes` and `article_notes` tables if absent
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    // article_notes references both other tables, so it goes last
    create_table(db, &schema, ArticleEntity).await?;
    create_table(db, &schema, NoteEntity).await?;
    create_table(db, &schema, ArticleNoteEntity).await?;

    info!("Database schema ready");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()> {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}
