//! Chapter data as the export pipeline sees it.
//!
//! The manuscript itself lives elsewhere; the pipeline only reads from it
//! through the injected [`ChapterStore`] repository. Listing chapters is cheap
//! and returns [`ChapterMeta`] (enough to drive range selection and word-count
//! estimates), while [`ChapterStore::chapter_by_id`] loads the full text as an
//! immutable [`ChapterContent`] snapshot. Snapshots are not kept in sync with
//! later edits; a new load is required to see them.

mod json_store;

pub use json_store::{JsonChapterStore, Manuscript, ManuscriptChapter};

use anyhow::Result;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

/// Listing entry for one chapter.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ChapterMeta {
    pub id: String,
    pub number: u32,
    #[builder(default)]
    pub title: String,
    #[builder(default)]
    pub word_count: usize,
}

/// The full text of a chapter at the moment it was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    pub number: u32,
    pub title: String,
    pub content: String,
}

impl ChapterContent {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        number: u32,
        title: S1,
        content: S2,
    ) -> ChapterContent {
        ChapterContent {
            number,
            title: title.into(),
            content: content.into(),
        }
    }

    /// Empty or whitespace-only content.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.content)
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.content)
    }
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Read access to the manuscript's chapters.
///
/// Both calls are asynchronous and may fail; callers decide how a failure shows
/// up for the user. The returned futures are `Send` so that sessions can drive
/// them from spawned tasks.
pub trait ChapterStore: Send + Sync + 'static {
    /// All chapters in manuscript order.
    fn list_chapters(&self) -> impl Future<Output = Result<Vec<ChapterMeta>>> + Send;

    /// Full content of one chapter, or `None` if the id is unknown.
    fn chapter_by_id(&self, id: &str) -> impl Future<Output = Result<Option<ChapterContent>>> + Send;
}

/// A store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryChapterStore {
    order: Vec<String>,
    chapters: HashMap<String, ChapterContent>,
}

impl MemoryChapterStore {
    pub fn new() -> MemoryChapterStore {
        MemoryChapterStore::default()
    }

    /// Insert or replace a chapter, keeping first-insertion order for listings.
    pub fn insert<S: Into<String>>(&mut self, id: S, chapter: ChapterContent) {
        let id = id.into();
        if !self.chapters.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.chapters.insert(id, chapter);
    }

    pub fn with_chapter<S: Into<String>>(mut self, id: S, chapter: ChapterContent) -> Self {
        self.insert(id, chapter);
        self
    }

    pub fn metas(&self) -> Vec<ChapterMeta> {
        self.order
            .iter()
            .filter_map(|id| {
                self.chapters.get(id).map(|chapter| ChapterMeta {
                    id: id.clone(),
                    number: chapter.number,
                    title: chapter.title.clone(),
                    word_count: chapter.word_count(),
                })
            })
            .collect()
    }
}

impl ChapterStore for MemoryChapterStore {
    async fn list_chapters(&self) -> Result<Vec<ChapterMeta>> {
        Ok(self.metas())
    }

    async fn chapter_by_id(&self, id: &str) -> Result<Option<ChapterContent>> {
        Ok(self.chapters.get(id).cloned())
    }
}
