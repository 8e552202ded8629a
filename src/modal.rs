//! The state behind the two export modals.
//!
//! A modal owns its config for as long as it is open: opening one starts from
//! the defaults (with the chapter editor's typography carried over), every
//! control change goes through [`ExportConfig::set`] or
//! [`BatchExportConfig::set`], and closing discards it along with the preview
//! and its object URL. Each change that affects the preview is handed to the
//! modal's [`PreviewSession`], which takes care of debouncing.
//!
//! Exports are performed by an [`Exporter`] passed in by the caller, so the
//! same exporter (and its busy state) can serve both modals.

use crate::chapters::{ChapterMeta, ChapterStore};
use crate::config::{BatchExportConfig, BatchField, ConfigField, EditorTypography, ExportConfig, ExportMode};
use crate::export::{
    batch_file_name, chapter_file_name, ExportOutcome, ExportRequest, Exporter, FileWriter, SaveDialog,
};
use crate::preview::{BlobRegistry, PreviewRequest, PreviewSession, PreviewState};
use crate::render::{DocumentFormat, DocumentRenderer, RenderJob};
use crate::selection::{chapters_to_render, ChapterRange, EmptyChapterNotice, RangeSummary};
use std::sync::Arc;

/// Export of a range of chapters into one document.
pub struct BatchExportModal<S> {
    preview: PreviewSession<S>,
    defaults: BatchExportConfig,
    default_include_empty: bool,
    listing: Vec<ChapterMeta>,
    config: BatchExportConfig,
    range: ChapterRange,
    include_empty: bool,
    open: bool,
}

impl<S: ChapterStore> BatchExportModal<S> {
    pub fn new(
        store: Arc<S>,
        renderer: Arc<dyn DocumentRenderer>,
        blobs: BlobRegistry,
        defaults: BatchExportConfig,
        include_empty: bool,
    ) -> BatchExportModal<S> {
        BatchExportModal {
            preview: PreviewSession::new(ExportMode::Batch, store, renderer, blobs),
            config: defaults.clone(),
            defaults,
            default_include_empty: include_empty,
            listing: Vec::new(),
            range: ChapterRange::new(1, 1),
            include_empty,
            open: false,
        }
    }

    /// Open over the manuscript's chapter listing. The range starts out
    /// spanning every chapter.
    pub fn open(&mut self, listing: Vec<ChapterMeta>, typography: &EditorTypography) {
        let mut config = self.defaults.clone();
        config.base = config
            .base
            .with_typography(typography)
            .fit_to(ExportMode::Batch);
        self.config = config;
        self.range = ChapterRange::spanning(&listing);
        self.listing = listing;
        self.include_empty = self.default_include_empty;
        self.open = true;
        log::debug!(
            "opened batch export over {} chapters",
            self.listing.len()
        );
        self.reschedule();
    }

    pub fn close(&mut self) {
        self.preview.close();
        self.listing.clear();
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn config(&self) -> &BatchExportConfig {
        &self.config
    }

    pub fn range(&self) -> ChapterRange {
        self.range
    }

    pub fn include_empty(&self) -> bool {
        self.include_empty
    }

    pub fn set_from(&mut self, from: u32) {
        self.set_range(ChapterRange::new(from, self.range.to));
    }

    pub fn set_to(&mut self, to: u32) {
        self.set_range(ChapterRange::new(self.range.from, to));
    }

    pub fn set_range(&mut self, range: ChapterRange) {
        self.range = range;
        self.reschedule();
    }

    pub fn set_field(&mut self, field: impl Into<BatchField>) {
        self.config = self.config.set(field);
        self.reschedule();
    }

    pub fn set_include_empty(&mut self, include_empty: bool) {
        self.include_empty = include_empty;
        self.reschedule();
    }

    /// Replace the whole config, e.g. after the defaults were edited.
    pub fn set_config(&mut self, config: BatchExportConfig) {
        self.config = config;
        self.reschedule();
    }

    /// Swap in a fresh chapter listing, keeping the range.
    pub fn set_listing(&mut self, listing: Vec<ChapterMeta>) {
        self.listing = listing;
        self.reschedule();
    }

    /// Reload the selected chapters even if nothing in the modal changed.
    pub fn refresh(&mut self) {
        if self.open {
            self.preview.refresh();
        }
    }

    /// Validity, selection and estimates for the current range.
    pub fn summary(&self) -> RangeSummary {
        RangeSummary::evaluate(&self.listing, self.range, self.config.base.content_size)
    }

    pub fn preview_state(&self) -> PreviewState {
        self.preview.state()
    }

    pub fn preview(&self) -> &PreviewSession<S> {
        &self.preview
    }

    /// Wait for the preview of the latest change.
    pub async fn settled(&self) -> PreviewState {
        self.preview.settled().await
    }

    /// Blank chapters among those loaded for the current selection.
    pub fn empty_notice(&self) -> Option<EmptyChapterNotice> {
        EmptyChapterNotice::for_loaded(&self.preview.state().loaded)
    }

    fn export_request(&self, format: DocumentFormat) -> Option<ExportRequest> {
        if !self.open || !self.range.is_valid() || self.config.validate().is_err() {
            return None;
        }
        // the loaded chapters must come from the current range, not one still
        // being replaced
        let state = self.preview.current_state()?;
        let chapters = chapters_to_render(&state.loaded, self.include_empty);
        if chapters.is_empty() {
            return None;
        }
        Some(ExportRequest {
            job: RenderJob::Batch {
                chapters,
                config: self.config.clone(),
            },
            default_name: batch_file_name(self.range, format),
        })
    }

    /// The export buttons are enabled for a valid range and config once the
    /// range's chapters have loaded and one of them has something to export.
    pub fn can_export(&self) -> bool {
        self.export_request(DocumentFormat::Pdf).is_some()
    }

    /// Export the loaded chapters. A successful save closes the modal.
    pub async fn export<D: SaveDialog, W: FileWriter>(
        &mut self,
        exporter: &Exporter<D, W>,
        format: DocumentFormat,
    ) -> ExportOutcome {
        let Some(request) = self.export_request(format) else {
            return ExportOutcome::Unavailable;
        };
        let outcome = exporter.export(request, format).await;
        if outcome.closes_modal() {
            self.close();
        }
        outcome
    }

    fn reschedule(&mut self) {
        if !self.open {
            return;
        }
        let summary = self.summary();
        self.preview.update(PreviewRequest::Batch {
            chapters: summary.selected,
            range: self.range,
            config: self.config.clone(),
            include_empty: self.include_empty,
        });
    }
}

/// Export of the chapter open in the editor.
pub struct ChapterExportModal<S> {
    preview: PreviewSession<S>,
    defaults: ExportConfig,
    chapter: Option<ChapterMeta>,
    config: ExportConfig,
}

impl<S: ChapterStore> ChapterExportModal<S> {
    pub fn new(
        store: Arc<S>,
        renderer: Arc<dyn DocumentRenderer>,
        blobs: BlobRegistry,
        defaults: ExportConfig,
    ) -> ChapterExportModal<S> {
        ChapterExportModal {
            preview: PreviewSession::new(ExportMode::Single, store, renderer, blobs),
            config: defaults.clone(),
            defaults,
            chapter: None,
        }
    }

    pub fn open(&mut self, chapter: ChapterMeta, typography: &EditorTypography) {
        self.config = self
            .defaults
            .with_typography(typography)
            .fit_to(ExportMode::Single);
        log::debug!("opened export of chapter {}", chapter.number);
        self.chapter = Some(chapter);
        self.reschedule();
    }

    pub fn close(&mut self) {
        self.preview.close();
        self.chapter = None;
    }

    pub fn is_open(&self) -> bool {
        self.chapter.is_some()
    }

    pub fn chapter(&self) -> Option<&ChapterMeta> {
        self.chapter.as_ref()
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn set_field(&mut self, field: ConfigField) {
        self.config = self.config.set(field);
        self.reschedule();
    }

    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
        self.reschedule();
    }

    pub fn refresh(&mut self) {
        if self.chapter.is_some() {
            self.preview.refresh();
        }
    }

    pub fn preview_state(&self) -> PreviewState {
        self.preview.state()
    }

    pub fn preview(&self) -> &PreviewSession<S> {
        &self.preview
    }

    pub async fn settled(&self) -> PreviewState {
        self.preview.settled().await
    }

    fn export_request(&self, format: DocumentFormat) -> Option<ExportRequest> {
        let meta = self.chapter.as_ref()?;
        if self.config.validate(ExportMode::Single).is_err() {
            return None;
        }
        let chapter = self
            .preview
            .state()
            .loaded
            .into_iter()
            .find(|loaded| loaded.number == meta.number)?;
        Some(ExportRequest {
            default_name: chapter_file_name(meta.number, &meta.title, format),
            job: RenderJob::Chapter {
                chapter,
                config: self.config.clone(),
            },
        })
    }

    /// Exporting only needs the chapter to have been loaded and a valid config;
    /// a blank chapter exports as its title alone.
    pub fn can_export(&self) -> bool {
        self.export_request(DocumentFormat::Pdf).is_some()
    }

    pub async fn export<D: SaveDialog, W: FileWriter>(
        &mut self,
        exporter: &Exporter<D, W>,
        format: DocumentFormat,
    ) -> ExportOutcome {
        let Some(request) = self.export_request(format) else {
            return ExportOutcome::Unavailable;
        };
        let outcome = exporter.export(request, format).await;
        if outcome.closes_modal() {
            self.close();
        }
        outcome
    }

    fn reschedule(&mut self) {
        if let Some(chapter) = &self.chapter {
            self.preview.update(PreviewRequest::Chapter {
                chapter: chapter.clone(),
                config: self.config.clone(),
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chapters::{ChapterContent, MemoryChapterStore};
    use crate::config::{ContentAlignment, FontFamily};
    use crate::preview::PreviewStatus;
    use crate::render::ManuscriptRenderer;
    use anyhow::Result;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct AlwaysSave(PathBuf);

    impl SaveDialog for AlwaysSave {
        async fn save_path(&self, _request: &crate::export::SaveRequest) -> Result<Option<PathBuf>> {
            Ok(Some(self.0.clone()))
        }
    }

    struct NeverSave;

    impl SaveDialog for NeverSave {
        async fn save_path(&self, _request: &crate::export::SaveRequest) -> Result<Option<PathBuf>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct Recorded(Mutex<Vec<PathBuf>>);

    /// Renders with the real renderer, noting which chapters each job held.
    #[derive(Default)]
    struct ChapterLog {
        inner: ManuscriptRenderer,
        numbers: Mutex<Vec<Vec<u32>>>,
    }

    impl DocumentRenderer for ChapterLog {
        fn render(&self, job: &RenderJob, format: DocumentFormat) -> Result<Vec<u8>> {
            let numbers = match job {
                RenderJob::Chapter { chapter, .. } => vec![chapter.number],
                RenderJob::Batch { chapters, .. } => chapters.iter().map(|c| c.number).collect(),
            };
            self.numbers.lock().expect("can lock").push(numbers);
            self.inner.render(job, format)
        }
    }

    impl FileWriter for Recorded {
        async fn write_file(&self, path: &Path, _bytes: &[u8]) -> Result<()> {
            self.0.lock().expect("can lock").push(path.to_path_buf());
            Ok(())
        }
    }

    fn store() -> Arc<MemoryChapterStore> {
        Arc::new(
            MemoryChapterStore::new()
                .with_chapter("a", ChapterContent::new(1, "Um", "Era uma vez."))
                .with_chapter("b", ChapterContent::new(2, "Dois", "   "))
                .with_chapter("c", ChapterContent::new(3, "Três", "Fim da história.")),
        )
    }

    fn batch_modal(store: &Arc<MemoryChapterStore>, blobs: &BlobRegistry) -> BatchExportModal<MemoryChapterStore> {
        BatchExportModal::new(
            store.clone(),
            Arc::new(ManuscriptRenderer::default()),
            blobs.clone(),
            BatchExportConfig::default(),
            false,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn can_open_a_batch_over_every_chapter() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = batch_modal(&store, &blobs);
        modal.open(
            store.metas(),
            &EditorTypography {
                content_font: Some(FontFamily::CourierNew),
                ..EditorTypography::default()
            },
        );

        assert_eq!(modal.range(), ChapterRange::new(1, 3));
        assert_eq!(modal.config().base.content_font, FontFamily::CourierNew);
        assert_eq!(modal.summary().selected.len(), 3);

        let state = modal.settled().await;
        assert!(matches!(state.status, PreviewStatus::Ready(_)));
        assert_eq!(state.loaded.len(), 3);
        assert_eq!(modal.empty_notice(), Some(EmptyChapterNotice::Listed(vec![2])));
        assert!(modal.can_export());
    }

    #[tokio::test(start_paused = true)]
    async fn inverted_range_disables_export() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = batch_modal(&store, &blobs);
        modal.open(store.metas(), &EditorTypography::default());
        modal.settled().await;

        modal.set_from(3);
        modal.set_to(2);
        assert!(!modal.summary().is_valid);
        let state = modal.settled().await;
        assert_eq!(state.status, PreviewStatus::InvalidRange);
        assert!(!modal.can_export());
        assert_eq!(blobs.live_count(), 0);

        let exporter = Exporter::new(
            AlwaysSave(PathBuf::from("/tmp/x.pdf")),
            Recorded::default(),
            Arc::new(ManuscriptRenderer::default()),
        );
        assert_eq!(
            modal.export(&exporter, DocumentFormat::Pdf).await,
            ExportOutcome::Unavailable
        );
    }

    #[tokio::test(start_paused = true)]
    async fn saving_closes_the_modal_and_frees_the_preview() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = batch_modal(&store, &blobs);
        modal.open(store.metas(), &EditorTypography::default());
        modal.set_range(ChapterRange::new(2, 3));
        modal.settled().await;
        assert_eq!(blobs.live_count(), 1);

        let exporter = Exporter::new(
            AlwaysSave(PathBuf::from("/tmp/x.docx")),
            Recorded::default(),
            Arc::new(ManuscriptRenderer::default()),
        );
        let outcome = modal.export(&exporter, DocumentFormat::Word).await;
        assert!(matches!(outcome, ExportOutcome::Saved { .. }));
        assert!(!modal.is_open());
        assert_eq!(blobs.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reopening_starts_from_defaults() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = batch_modal(&store, &blobs);
        modal.open(store.metas(), &EditorTypography::default());
        modal.set_field(ConfigField::ContentAlignment(ContentAlignment::Right));
        modal.set_field(BatchField::IncludeTableOfContents(true));
        modal.set_include_empty(true);
        modal.close();

        modal.open(store.metas(), &EditorTypography::default());
        assert_eq!(modal.config(), &BatchExportConfig::default());
        assert!(!modal.include_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn chapter_modal_exports_the_loaded_chapter() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = ChapterExportModal::new(
            store.clone(),
            Arc::new(ManuscriptRenderer::default()),
            blobs.clone(),
            ExportConfig::default(),
        );
        assert!(!modal.can_export());

        let meta = store.metas().remove(2);
        modal.open(meta, &EditorTypography::default());
        modal.set_field(ConfigField::ContentAlignment(ContentAlignment::Justify));
        let state = modal.settled().await;
        assert!(matches!(state.status, PreviewStatus::Ready(_)));
        assert!(modal.can_export());

        let writer = Recorded::default();
        let exporter = Exporter::new(
            AlwaysSave(PathBuf::from("/tmp/c.pdf")),
            writer,
            Arc::new(ManuscriptRenderer::default()),
        );
        let outcome = modal.export(&exporter, DocumentFormat::Pdf).await;
        assert!(outcome.closes_modal());
        assert!(!modal.is_open());
        assert_eq!(blobs.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_chapter_can_still_be_exported() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = ChapterExportModal::new(
            store.clone(),
            Arc::new(ManuscriptRenderer::default()),
            blobs.clone(),
            ExportConfig::default(),
        );
        modal.open(store.metas().remove(1), &EditorTypography::default());
        let state = modal.settled().await;
        assert_eq!(state.status, PreviewStatus::NoContent);
        assert!(modal.can_export());
    }

    #[tokio::test(start_paused = true)]
    async fn range_change_waits_for_its_chapters() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = batch_modal(&store, &blobs);
        modal.open(store.metas(), &EditorTypography::default());
        modal.settled().await;
        assert!(modal.can_export());

        modal.set_range(ChapterRange::new(3, 3));
        assert!(!modal.can_export());

        let renderer = Arc::new(ChapterLog::default());
        let exporter = Exporter::new(
            AlwaysSave(PathBuf::from("/tmp/x.pdf")),
            Recorded::default(),
            renderer.clone(),
        );
        assert_eq!(
            modal.export(&exporter, DocumentFormat::Pdf).await,
            ExportOutcome::Unavailable
        );
        assert!(modal.is_open());

        modal.settled().await;
        assert!(modal.can_export());
        let outcome = modal.export(&exporter, DocumentFormat::Pdf).await;
        assert!(matches!(outcome, ExportOutcome::Saved { .. }));
        assert_eq!(*renderer.numbers.lock().expect("can lock"), vec![vec![3]]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_the_save_keeps_the_modal_open() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = batch_modal(&store, &blobs);
        modal.open(store.metas(), &EditorTypography::default());
        modal.settled().await;

        let writer = Recorded::default();
        let exporter = Exporter::new(NeverSave, writer, Arc::new(ManuscriptRenderer::default()));
        let outcome = modal.export(&exporter, DocumentFormat::Pdf).await;
        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert!(!outcome.closes_modal());

        assert!(modal.is_open());
        assert_eq!(modal.range(), ChapterRange::new(1, 3));
        assert!(matches!(modal.preview_state().status, PreviewStatus::Ready(_)));
        assert_eq!(blobs.live_count(), 1);
        assert!(modal.can_export());
    }

    #[tokio::test(start_paused = true)]
    async fn editor_typography_is_fitted_to_single_export() {
        let store = store();
        let blobs = BlobRegistry::new();
        let mut modal = ChapterExportModal::new(
            store.clone(),
            Arc::new(ManuscriptRenderer::default()),
            blobs.clone(),
            ExportConfig::default().set(ConfigField::ContentAlignment(ContentAlignment::Right)),
        );
        modal.open(
            store.metas().remove(0),
            &EditorTypography {
                content_size: Some(18),
                content_line_spacing: Some(3.0),
                ..EditorTypography::default()
            },
        );
        assert_eq!(modal.config().content_size, 16);
        assert_eq!(modal.config().content_line_spacing, 2.5);
        assert_eq!(modal.config().content_alignment, ContentAlignment::Left);

        let state = modal.settled().await;
        assert!(matches!(state.status, PreviewStatus::Ready(_)));
        assert!(modal.can_export());

        modal.set_field(ConfigField::ContentSize(20));
        let state = modal.settled().await;
        assert!(matches!(state.status, PreviewStatus::Failed(_)));
        assert!(!modal.can_export());
    }
}
