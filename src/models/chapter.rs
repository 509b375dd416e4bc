use serde::{Deserialize, Serialize};

/// Chapter identity as listed on a comic's detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterRef {
    #[serde(rename = "judul")]
    pub title: String,
    #[serde(rename = "link")]
    pub slug: String,
}

/// One readable chapter: the smallest cacheable content unit.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChapterPages {
    #[serde(rename = "judul", default)]
    pub title: String,
    #[serde(rename = "link", default)]
    pub slug: String,
    #[serde(rename = "image_list", default)]
    pub images: Vec<String>,
}
