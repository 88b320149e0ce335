//! Note entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Client payload, stored as sent
    #[sea_orm(column_type = "Json")]
    pub body: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::article_note::Entity")]
    ArticleNotes,
}

impl Related<super::article_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleNotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
