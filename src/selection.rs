//! Batch range selection and the numbers derived from it.
//!
//! A batch export covers the closed interval of chapter *numbers*
//! `[from, to]`. Chapters are matched by number, not by position or id, so a
//! manuscript with gaps or duplicated numbers yields a selection whose size is
//! not simply `to - from + 1`.
//!
//! Everything here is a pure function of its inputs and cheap enough to be
//! recomputed on every change of the range selectors.

use crate::chapters::{ChapterContent, ChapterMeta};
use serde::{Deserialize, Serialize};

/// Selections above this size are flagged but still exported.
pub const MAX_BATCH_CHAPTERS: usize = 50;

/// Words per page used by the page estimate for body sizes up to 12pt.
pub const WORDS_PER_PAGE_SMALL: usize = 250;
/// Words per page used by the page estimate for body sizes above 12pt.
pub const WORDS_PER_PAGE_LARGE: usize = 200;

/// Empty chapters are listed by name up to this many, then only counted.
const EMPTY_CHAPTERS_LISTED: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterRange {
    pub from: u32,
    pub to: u32,
}

impl ChapterRange {
    pub fn new(from: u32, to: u32) -> ChapterRange {
        ChapterRange { from, to }
    }

    /// First to last chapter of the listing, `1..=1` when it is empty.
    pub fn spanning(chapters: &[ChapterMeta]) -> ChapterRange {
        ChapterRange {
            from: chapters.first().map(|c| c.number).unwrap_or(1),
            to: chapters.last().map(|c| c.number).unwrap_or(1),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.to >= self.from
    }

    pub fn contains(&self, number: u32) -> bool {
        number >= self.from && number <= self.to
    }

    /// Chapters whose number falls in the range, in listing order. Always empty
    /// for an invalid range.
    pub fn select<'c>(&self, chapters: &'c [ChapterMeta]) -> Vec<&'c ChapterMeta> {
        if !self.is_valid() {
            return Vec::new();
        }
        chapters
            .iter()
            .filter(|chapter| self.contains(chapter.number))
            .collect()
    }
}

pub fn total_words(chapters: &[&ChapterMeta]) -> usize {
    chapters.iter().map(|chapter| chapter.word_count).sum()
}

/// A rough page count: a fixed words-per-page figure for small and large body
/// text, not a layout calculation.
pub fn estimate_pages(total_words: usize, content_size: u32) -> usize {
    let words_per_page = if content_size <= 12 {
        WORDS_PER_PAGE_SMALL
    } else {
        WORDS_PER_PAGE_LARGE
    };
    total_words.div_ceil(words_per_page)
}

pub fn too_many_chapters(selected: usize) -> bool {
    selected > MAX_BATCH_CHAPTERS
}

/// Everything the range selectors display, derived in one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeSummary {
    pub range: ChapterRange,
    pub is_valid: bool,
    pub selected: Vec<ChapterMeta>,
    pub total_words: usize,
    pub estimated_pages: usize,
    pub too_many_chapters: bool,
}

impl RangeSummary {
    pub fn evaluate(chapters: &[ChapterMeta], range: ChapterRange, content_size: u32) -> Self {
        let selected = range.select(chapters);
        let total_words = total_words(&selected);
        RangeSummary {
            range,
            is_valid: range.is_valid(),
            too_many_chapters: too_many_chapters(selected.len()),
            estimated_pages: estimate_pages(total_words, content_size),
            total_words,
            selected: selected.into_iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Drop blank chapters unless the user asked to keep them.
pub fn chapters_to_render(loaded: &[ChapterContent], include_empty: bool) -> Vec<ChapterContent> {
    loaded
        .iter()
        .filter(|chapter| include_empty || !chapter.is_blank())
        .cloned()
        .collect()
}

/// The warning shown when loaded chapters turn out to be blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmptyChapterNotice {
    /// A handful of chapters, named individually.
    Listed(Vec<u32>),
    /// Too many to name; the full list is available separately.
    Counted(usize),
}

impl EmptyChapterNotice {
    pub fn for_loaded(loaded: &[ChapterContent]) -> Option<EmptyChapterNotice> {
        let empty: Vec<u32> = loaded
            .iter()
            .filter(|chapter| chapter.is_blank())
            .map(|chapter| chapter.number)
            .collect();
        match empty.len() {
            0 => None,
            n if n <= EMPTY_CHAPTERS_LISTED => Some(EmptyChapterNotice::Listed(empty)),
            n => Some(EmptyChapterNotice::Counted(n)),
        }
    }

    pub fn describe(&self, excluded: bool) -> String {
        let mut text = match self {
            EmptyChapterNotice::Listed(numbers) => format!(
                "Empty chapters: {}",
                numbers
                    .iter()
                    .map(|n| format!("Ch {n}"))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            EmptyChapterNotice::Counted(count) => format!("{count} empty chapters"),
        };
        if excluded {
            text.push_str(" (they will be left out of the export)");
        }
        text
    }
}
