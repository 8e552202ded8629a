//! Exporting a document to a user-chosen file.
//!
//! An export renders the document, asks the desktop shell where to put it and
//! writes the bytes there. The shell is reached through the [`SaveDialog`] and
//! [`FileWriter`] traits. Whatever happens, the result is an [`ExportOutcome`]
//! rather than an error: cancelling the dialog is not a failure and yields no
//! feedback, while a failed render, dialog or write is logged and reported as a
//! [`Feedback`] message.
//!
//! An [`Exporter`] runs one export at a time. Its state is `Exporting` for the
//! duration of [`Exporter::export`] and returns to `Idle` on every path out of
//! it; asking for a second export meanwhile yields [`ExportOutcome::Busy`].

use crate::render::{DocumentFormat, DocumentRenderer, Labels, RenderJob};
use crate::selection::ChapterRange;
use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the save dialog is asked to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    pub default_name: String,
    /// Name of the file type filter, e.g. `PDF`
    pub filter_name: &'static str,
    pub extensions: Vec<&'static str>,
}

impl SaveRequest {
    pub fn new<S: Into<String>>(default_name: S, format: DocumentFormat) -> SaveRequest {
        SaveRequest {
            default_name: default_name.into(),
            filter_name: format.filter_name(),
            extensions: vec![format.extension()],
        }
    }
}

/// Asks the user for a destination. `Ok(None)` means the user cancelled.
pub trait SaveDialog: Send + Sync {
    fn save_path(&self, request: &SaveRequest) -> impl Future<Output = Result<Option<PathBuf>>> + Send;
}

pub trait FileWriter: Send + Sync {
    fn write_file(&self, path: &Path, bytes: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

/// Default name for a batch export, e.g. `Capitulos_1_a_5.pdf`.
pub fn batch_file_name(range: ChapterRange, format: DocumentFormat) -> String {
    format!(
        "Capitulos_{}_a_{}.{}",
        range.from,
        range.to,
        format.extension()
    )
}

/// Default name for a single chapter export, e.g. `Capitulo_3_O_Portal.docx`.
pub fn chapter_file_name(number: u32, title: &str, format: DocumentFormat) -> String {
    let title = sanitize_title(title);
    if title.is_empty() {
        format!("Capitulo_{number}.{}", format.extension())
    } else {
        format!("Capitulo_{number}_{title}.{}", format.extension())
    }
}

/// Keep letters, digits, `-` and `_`; spaces become underscores.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_' || *c == '-')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("_")
}

/// A document to export and the name to suggest for it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRequest {
    pub job: RenderJob,
    pub default_name: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    #[default]
    Idle,
    Exporting,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExportOutcome {
    /// Nothing to export: invalid range or nothing loaded
    Unavailable,
    /// Another export is still running
    Busy,
    /// The user closed the save dialog
    Cancelled,
    Saved {
        path: PathBuf,
        bytes: usize,
        format: DocumentFormat,
    },
    Failed(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// The message shown once an export finished, after the modal has closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl ExportOutcome {
    pub fn feedback(&self, labels: &Labels) -> Option<Feedback> {
        match self {
            ExportOutcome::Saved { format, .. } => Some(Feedback {
                kind: FeedbackKind::Success,
                message: match format {
                    DocumentFormat::Pdf => labels.pdf_export_success.clone(),
                    DocumentFormat::Word => labels.word_export_success.clone(),
                },
            }),
            ExportOutcome::Failed(message) => Some(Feedback {
                kind: FeedbackKind::Error,
                message: message.clone(),
            }),
            _ => None,
        }
    }

    /// Only a successful save closes the export modal.
    pub fn closes_modal(&self) -> bool {
        matches!(self, ExportOutcome::Saved { .. })
    }
}

/// Marks the exporter busy until dropped.
struct ExportingGuard<'a>(&'a AtomicBool);

impl Drop for ExportingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Exporter<D, W> {
    dialog: D,
    writer: W,
    renderer: Arc<dyn DocumentRenderer>,
    exporting: AtomicBool,
}

impl<D: SaveDialog, W: FileWriter> Exporter<D, W> {
    pub fn new(dialog: D, writer: W, renderer: Arc<dyn DocumentRenderer>) -> Exporter<D, W> {
        Exporter {
            dialog,
            writer,
            renderer,
            exporting: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ExportState {
        if self.exporting.load(Ordering::Acquire) {
            ExportState::Exporting
        } else {
            ExportState::Idle
        }
    }

    fn begin(&self) -> Option<ExportingGuard<'_>> {
        self.exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportingGuard(&self.exporting))
    }

    /// Render, ask for a destination and write.
    pub async fn export(&self, request: ExportRequest, format: DocumentFormat) -> ExportOutcome {
        if let RenderJob::Batch { chapters, .. } = &request.job {
            if chapters.is_empty() {
                return ExportOutcome::Unavailable;
            }
        }
        let Some(_guard) = self.begin() else {
            log::warn!("export requested while another export is running");
            return ExportOutcome::Busy;
        };

        match self.try_export(request, format).await {
            Ok(Some((path, bytes))) => {
                log::info!("exported {format} to {}", path.display());
                ExportOutcome::Saved {
                    path,
                    bytes,
                    format,
                }
            }
            Ok(None) => {
                log::info!("export cancelled");
                ExportOutcome::Cancelled
            }
            Err(e) => {
                log::error!("Failed to export {format}: {e:#}");
                ExportOutcome::Failed(format!("{e:#}"))
            }
        }
    }

    async fn try_export(&self, request: ExportRequest, format: DocumentFormat) -> Result<Option<(PathBuf, usize)>> {
        let renderer = self.renderer.clone();
        let job = request.job;
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&job, format))
            .await
            .with_context(|| "Rendering was interrupted")??;

        let save = SaveRequest::new(request.default_name, format);
        let Some(path) = self
            .dialog
            .save_path(&save)
            .await
            .with_context(|| "Failed to choose a destination")?
        else {
            return Ok(None);
        };

        self.writer
            .write_file(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some((path, bytes.len())))
    }
}
