//! Which pages of a rendered preview get displayed.

use anyhow::{Context, Result};

/// Batch previews display at most this many pages.
pub const BATCH_PAGE_CAP: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub total: usize,
    pub shown: usize,
    pub remaining: usize,
}

impl PageWindow {
    pub fn new(total: usize, cap: Option<usize>) -> PageWindow {
        let shown = cap.map_or(total, |cap| total.min(cap));
        PageWindow {
            total,
            shown,
            remaining: total - shown,
        }
    }

    /// 1-based numbers of the displayed pages.
    pub fn pages(&self) -> impl Iterator<Item = usize> {
        1..=self.shown
    }

    /// The note shown below the last displayed page, if pages were left out.
    pub fn notice(&self) -> Option<String> {
        match self.remaining {
            0 => None,
            1 => Some("1 additional page".to_string()),
            n => Some(format!("{n} additional pages")),
        }
    }
}

/// Parse a PDF and count its pages.
pub fn count_pages(bytes: &[u8]) -> Result<usize> {
    let document =
        lopdf::Document::load_mem(bytes).with_context(|| "Failed to parse the rendered PDF")?;
    Ok(document.get_pages().len())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn batch_window_is_capped() {
        let window = PageWindow::new(14, Some(BATCH_PAGE_CAP));
        assert_eq!(window.shown, 10);
        assert_eq!(window.remaining, 4);
        assert_eq!(window.pages().last(), Some(10));
        assert_eq!(window.notice().as_deref(), Some("4 additional pages"));
    }

    #[test]
    fn short_documents_show_everything() {
        let window = PageWindow::new(3, Some(BATCH_PAGE_CAP));
        assert_eq!(window.shown, 3);
        assert_eq!(window.notice(), None);

        let uncapped = PageWindow::new(40, None);
        assert_eq!(uncapped.shown, 40);
        assert_eq!(uncapped.remaining, 0);
    }

    #[test]
    fn garbage_is_not_a_pdf() {
        assert!(count_pages(b"definitely not a pdf").is_err());
    }
}
