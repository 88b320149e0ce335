//! SeaORM entity models
//!
//! Database entities for NewsNotes

mod article;
mod article_note;
mod note;

pub use article::{
    Entity as ArticleEntity,
    Model as Article,
    ActiveModel as ArticleActiveModel,
    Column as ArticleColumn,
};

pub use note::{
    Entity as NoteEntity,
    Model as Note,
    ActiveModel as NoteActiveModel,
    Column as NoteColumn,
};

pub use article_note::{
    Entity as ArticleNoteEntity,
    Model as ArticleNote,
    ActiveModel as ArticleNoteActiveModel,
    Column as ArticleNoteColumn,
};
