use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ChapterPages, ChapterRef, ComicSummary};
use crate::storage::{KvStore, Storage};

/// Storage key for the favorites collection
const FAVORITES_KEY: &str = "panelcache_favorites";

/// Storage key for the reading history
const HISTORY_KEY: &str = "panelcache_history";

/// Storage key for offline chapters
const CHAPTERS_KEY: &str = "panelcache_chapters";

/// Maximum history entries kept; oldest beyond this are dropped.
const MAX_HISTORY_ENTRIES: usize = 50;

/// Maximum chapters cached for offline reading.
const MAX_CACHED_CHAPTERS: usize = 20;

/// Number of entries in the continue-reading rail.
const CONTINUE_READING_COUNT: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteEntry {
    pub slug: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastChapter {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub slug: String,
    pub title: String,
    pub image_url: String,
    pub last_chapter: LastChapter,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedChapter {
    pub pages: ChapterPages,
    pub cached_at: DateTime<Utc>,
}

/// Persisted user library with bounded collections.
///
/// Every operation is a whole-collection read-modify-write through the
/// key-value adapter. Persistence failures degrade to `false`/`None`/empty
/// rather than surfacing as errors.
pub struct Library<S: Storage> {
    kv: KvStore<S>,
}

impl<S: Storage> Library<S> {
    pub fn new(backend: S) -> Self {
        Self {
            kv: KvStore::new(backend),
        }
    }

    // ===== Favorites =====

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.kv.read(FAVORITES_KEY).value()
    }

    pub fn is_favorite(&self, slug: &str) -> bool {
        self.favorites().iter().any(|f| f.slug == slug)
    }

    /// Toggle a comic in the favorites set.
    ///
    /// Returns `true` if the comic was added, `false` if it was removed.
    pub fn toggle_favorite(&self, comic: &ComicSummary) -> bool {
        let mut favorites = self.favorites();

        let added = match favorites.iter().position(|f| f.slug == comic.slug) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                favorites.push(FavoriteEntry {
                    slug: comic.slug.clone(),
                    title: comic.title.clone(),
                    image_url: comic.image_url.clone(),
                    kind: comic.kind.clone(),
                    added_at: Utc::now(),
                });
                true
            }
        };

        self.kv.write(FAVORITES_KEY, &favorites);
        added
    }

    // ===== History =====

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.kv.read(HISTORY_KEY).value()
    }

    /// Record that a chapter of a comic was read.
    ///
    /// Any existing entry for the comic moves to the front with the new
    /// chapter and timestamp; the list is truncated to the history cap.
    pub fn record_read(&self, comic: &ComicSummary, chapter: &ChapterRef) {
        let mut history = self.history();
        history.retain(|h| h.slug != comic.slug);

        history.insert(
            0,
            HistoryEntry {
                slug: comic.slug.clone(),
                title: comic.title.clone(),
                image_url: comic.image_url.clone(),
                last_chapter: LastChapter {
                    title: chapter.title.clone(),
                    slug: chapter.slug.clone(),
                },
                read_at: Utc::now(),
            },
        );

        history.truncate(MAX_HISTORY_ENTRIES);
        self.kv.write(HISTORY_KEY, &history);
    }

    /// The `n` most recent history entries (derived view, no extra key).
    pub fn recent_history(&self, n: usize) -> Vec<HistoryEntry> {
        let mut history = self.history();
        history.truncate(n);
        history
    }

    /// Entries for the home-screen continue-reading rail.
    pub fn continue_reading(&self) -> Vec<HistoryEntry> {
        self.recent_history(CONTINUE_READING_COUNT)
    }

    // ===== Offline chapters =====

    fn cached_chapters(&self) -> HashMap<String, CachedChapter> {
        self.kv.read(CHAPTERS_KEY).value()
    }

    /// Save a chapter for offline reading.
    ///
    /// Overwrites any existing entry wholesale with a fresh timestamp, then
    /// evicts oldest-first until the collection is back at the cap. Returns
    /// whether the write was confirmed durable.
    pub fn cache_chapter(&self, slug: &str, pages: &ChapterPages) -> bool {
        self.cache_chapter_at(slug, pages, Utc::now())
    }

    fn cache_chapter_at(&self, slug: &str, pages: &ChapterPages, at: DateTime<Utc>) -> bool {
        let mut chapters = self.cached_chapters();
        chapters.insert(
            slug.to_string(),
            CachedChapter {
                pages: pages.clone(),
                cached_at: at,
            },
        );

        if chapters.len() > MAX_CACHED_CHAPTERS {
            // Evict oldest first; equal timestamps evict in slug order so
            // the outcome is deterministic.
            let mut by_age: Vec<(DateTime<Utc>, String)> = chapters
                .iter()
                .map(|(slug, entry)| (entry.cached_at, slug.clone()))
                .collect();
            by_age.sort();

            let excess = chapters.len() - MAX_CACHED_CHAPTERS;
            for (_, slug) in by_age.into_iter().take(excess) {
                chapters.remove(&slug);
            }
        }

        self.kv.write(CHAPTERS_KEY, &chapters)
    }

    pub fn cached_chapter(&self, slug: &str) -> Option<ChapterPages> {
        self.cached_chapters().remove(slug).map(|c| c.pages)
    }

    pub fn is_chapter_cached(&self, slug: &str) -> bool {
        self.cached_chapters().contains_key(slug)
    }

    pub fn cached_chapter_slugs(&self) -> Vec<String> {
        self.cached_chapters().into_keys().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::Duration;

    fn comic(slug: &str) -> ComicSummary {
        ComicSummary {
            title: format!("Title {}", slug),
            slug: slug.to_string(),
            image_url: format!("https://cdn/{}.jpg", slug),
            kind: None,
        }
    }

    fn chapter(slug: &str) -> ChapterRef {
        ChapterRef {
            title: format!("Chapter {}", slug),
            slug: slug.to_string(),
        }
    }

    fn pages(slug: &str) -> ChapterPages {
        ChapterPages {
            title: format!("Chapter {}", slug),
            slug: slug.to_string(),
            images: vec![format!("https://cdn/{}/1.jpg", slug)],
        }
    }

    #[test]
    fn test_toggle_favorite_parity() {
        let library = Library::new(MemoryStorage::new());
        let c = comic("solo-leveling");

        assert!(library.toggle_favorite(&c)); // added
        assert!(library.is_favorite("solo-leveling"));

        assert!(!library.toggle_favorite(&c)); // removed
        assert!(!library.is_favorite("solo-leveling"));

        // Odd number of toggles ends in membership
        for _ in 0..3 {
            library.toggle_favorite(&c);
        }
        assert!(library.is_favorite("solo-leveling"));
        assert_eq!(library.favorites().len(), 1);
    }

    #[test]
    fn test_record_read_is_idempotent_per_slug() {
        let library = Library::new(MemoryStorage::new());
        let c = comic("one-piece");

        library.record_read(&c, &chapter("one-piece-1"));
        library.record_read(&comic("bleach"), &chapter("bleach-1"));
        library.record_read(&c, &chapter("one-piece-2"));

        let history = library.history();
        assert_eq!(history.len(), 2);
        // Re-read moved one-piece to the front with the latest chapter
        assert_eq!(history[0].slug, "one-piece");
        assert_eq!(history[0].last_chapter.slug, "one-piece-2");
        assert_eq!(history[1].slug, "bleach");
    }

    #[test]
    fn test_history_capped_at_50_oldest_dropped() {
        let library = Library::new(MemoryStorage::new());

        for i in 0..55 {
            let slug = format!("comic-{:02}", i);
            library.record_read(&comic(&slug), &chapter(&format!("{}-ch1", slug)));
        }

        let history = library.history();
        assert_eq!(history.len(), 50);
        // Newest first; the five oldest are gone
        assert_eq!(history[0].slug, "comic-54");
        assert!(!history.iter().any(|h| h.slug == "comic-04"));
        assert!(history.iter().any(|h| h.slug == "comic-05"));
    }

    #[test]
    fn test_recent_history_view() {
        let library = Library::new(MemoryStorage::new());
        for i in 0..10 {
            let slug = format!("comic-{}", i);
            library.record_read(&comic(&slug), &chapter(&format!("{}-ch1", slug)));
        }

        assert_eq!(library.continue_reading().len(), 6);
        assert_eq!(library.recent_history(3).len(), 3);
        assert_eq!(library.recent_history(3)[0].slug, "comic-9");
    }

    #[test]
    fn test_chapter_cache_round_trip() {
        let library = Library::new(MemoryStorage::new());
        let p = pages("solo-leveling-chapter-1");

        assert!(library.cache_chapter("solo-leveling-chapter-1", &p));
        assert!(library.is_chapter_cached("solo-leveling-chapter-1"));
        assert_eq!(
            library.cached_chapter("solo-leveling-chapter-1"),
            Some(p)
        );
        assert_eq!(library.cached_chapter("missing"), None);
    }

    #[test]
    fn test_chapter_cache_evicts_oldest() {
        let library = Library::new(MemoryStorage::new());
        let base = Utc::now();

        // 21 inserts with strictly increasing timestamps
        for i in 0..21 {
            let slug = format!("ch-{:02}", i);
            let at = base + Duration::seconds(i);
            assert!(library.cache_chapter_at(&slug, &pages(&slug), at));
        }

        let slugs = library.cached_chapter_slugs();
        assert_eq!(slugs.len(), 20);
        // The entry with the smallest timestamp was evicted
        assert!(!library.is_chapter_cached("ch-00"));
        assert!(library.is_chapter_cached("ch-01"));
        assert!(library.is_chapter_cached("ch-20"));
    }

    #[test]
    fn test_chapter_cache_overwrite_refreshes_timestamp() {
        let library = Library::new(MemoryStorage::new());
        let base = Utc::now();

        for i in 0..20 {
            let slug = format!("ch-{:02}", i);
            library.cache_chapter_at(&slug, &pages(&slug), base + Duration::seconds(i));
        }

        // Re-caching the oldest entry makes it the newest
        library.cache_chapter_at("ch-00", &pages("ch-00"), base + Duration::seconds(100));
        library.cache_chapter_at("ch-99", &pages("ch-99"), base + Duration::seconds(101));

        assert!(library.is_chapter_cached("ch-00"));
        // ch-01 is now the oldest and was evicted instead
        assert!(!library.is_chapter_cached("ch-01"));
        assert_eq!(library.cached_chapter_slugs().len(), 20);
    }
}
