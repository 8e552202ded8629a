//! Document rendering: chapters plus a config in, a finished file out.
//!
//! The rest of the pipeline treats rendering as an opaque, fallible function
//! behind [`DocumentRenderer`]; it never looks inside the bytes it gets back.
//! [`ManuscriptRenderer`] is the implementation shipped with the crate, producing
//! PDF through [`pdf`] and Word documents through [`docx`].
//!
//! Both formats share the same reading of the config: content is split on
//! newlines and every line is its own paragraph, blank lines keep their height,
//! and chapter headings are built by [`format_chapter_title`].

pub mod docx;
pub mod pdf;

use crate::chapters::ChapterContent;
use crate::config::{BatchExportConfig, ExportConfig, ExportMode, TitleFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing words the renderers and feedback messages need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// The word placed before chapter numbers in headings
    pub chapter: String,
    pub table_of_contents: String,
    /// Heading used for chapters without a title
    pub untitled: String,
    pub pdf_export_success: String,
    pub word_export_success: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            chapter: "Chapter".to_string(),
            table_of_contents: "Table of Contents".to_string(),
            untitled: "Untitled".to_string(),
            pdf_export_success: "PDF exported successfully".to_string(),
            word_export_success: "Word document exported successfully".to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    Pdf,
    Word,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Word => "docx",
        }
    }

    /// Name of the file-type filter offered by save dialogs.
    pub fn filter_name(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Word => "Word",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filter_name())
    }
}

/// What to render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderJob {
    Chapter {
        chapter: ChapterContent,
        config: ExportConfig,
    },
    Batch {
        chapters: Vec<ChapterContent>,
        config: BatchExportConfig,
    },
}

impl RenderJob {
    /// Title recorded in the document metadata.
    pub fn document_title(&self, labels: &Labels) -> String {
        match self {
            RenderJob::Chapter { chapter, config } => {
                format_chapter_title(config.title_format, chapter, labels)
            }
            RenderJob::Batch { chapters, .. } => match (chapters.first(), chapters.last()) {
                (Some(first), Some(last)) if first.number != last.number => {
                    format!("{} {}-{}", labels.chapter, first.number, last.number)
                }
                (Some(only), _) => format!("{} {}", labels.chapter, only.number),
                _ => labels.chapter.clone(),
            },
        }
    }
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, job: &RenderJob, format: DocumentFormat) -> Result<Vec<u8>>;
}

/// Renders PDF and Word documents from validated configs.
#[derive(Debug, Clone, Default)]
pub struct ManuscriptRenderer {
    labels: Labels,
}

impl ManuscriptRenderer {
    pub fn new(labels: Labels) -> ManuscriptRenderer {
        ManuscriptRenderer { labels }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

impl DocumentRenderer for ManuscriptRenderer {
    fn render(&self, job: &RenderJob, format: DocumentFormat) -> Result<Vec<u8>> {
        let title = job.document_title(&self.labels);
        let (chapters, config) = match job {
            RenderJob::Chapter { chapter, config } => {
                config
                    .validate(ExportMode::Single)
                    .with_context(|| "Invalid export settings")?;
                (
                    std::slice::from_ref(chapter),
                    BatchExportConfig::single(config.clone()),
                )
            }
            RenderJob::Batch { chapters, config } => {
                config
                    .validate()
                    .with_context(|| "Invalid export settings")?;
                (chapters.as_slice(), config.clone())
            }
        };

        log::debug!(
            "rendering {} chapter(s) as {format} ({title})",
            chapters.len()
        );
        match format {
            DocumentFormat::Pdf => pdf::render(chapters, &config, &self.labels, &title)
                .with_context(|| "Failed to render PDF"),
            DocumentFormat::Word => docx::render(chapters, &config, &self.labels, &title)
                .with_context(|| "Failed to render Word document"),
        }
    }
}

/// Build a chapter heading, falling back to the untitled label for blank titles.
pub fn format_chapter_title(format: TitleFormat, chapter: &ChapterContent, labels: &Labels) -> String {
    let title = if chapter.title.trim().is_empty() {
        labels.untitled.as_str()
    } else {
        chapter.title.as_str()
    };
    let word = &labels.chapter;
    let number = chapter.number;
    match format {
        TitleFormat::NumberColonTitle => format!("{word} {number}: {title}"),
        TitleFormat::NumberDashTitle => format!("{word} {number} - {title}"),
        TitleFormat::TitleOnly => title.to_string(),
        TitleFormat::NumberOnly => format!("{word} {number}"),
    }
}

/// Content split into the lines that become paragraphs.
pub(crate) fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').map(|line| line.trim_end_matches('\r'))
}
