//! HTTP request handlers

pub mod articles;
pub mod health;
pub mod notes;
pub mod path;
pub mod payload;
pub mod saved;
pub mod scrape;
