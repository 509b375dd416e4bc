use serde::{Deserialize, Serialize};

use super::ChapterRef;

/// One comic as it appears in listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComicSummary {
    #[serde(rename = "judul")]
    pub title: String,
    /// Stable slug identifying the comic; the identity key for favorites
    /// and history.
    #[serde(rename = "link")]
    pub slug: String,
    #[serde(rename = "img")]
    pub image_url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Wrapper for listing endpoints; the API nests results under `anime_list`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComicListResponse {
    #[serde(default)]
    pub anime_list: Vec<ComicSummary>,
}

/// Detail page for one comic.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComicDetail {
    #[serde(rename = "judul", default)]
    pub title: String,
    #[serde(rename = "img", default)]
    pub image_url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "sinopsis", default)]
    pub synopsis: Option<String>,
    #[serde(rename = "chapter", default)]
    pub chapters: Vec<ChapterRef>,
}
