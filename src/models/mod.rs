//! Data models for comic catalog entities.
//!
//! This module contains the data structures used to represent content
//! from the comic API:
//!
//! - `ComicSummary`: one card in a listing (updates, projects, search)
//! - `ComicDetail`: full detail page for one comic, with its chapter list
//! - `ChapterRef`, `ChapterPages`: chapter identity and readable pages
//! - `User`: the authenticated user object stored next to the token
//!
//! Wire field names are the API's own; the structs expose idiomatic names
//! through serde renames.

pub mod chapter;
pub mod comic;
pub mod user;

pub use chapter::{ChapterPages, ChapterRef};
pub use comic::{ComicDetail, ComicListResponse, ComicSummary};
pub use user::User;
