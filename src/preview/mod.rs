//! Debounced preview generation.
//!
//! A [`PreviewSession`] keeps a rendered PDF preview in step with the chapter
//! selection and export config of an open export modal. Every change is handed
//! to [`PreviewSession::update`]; bursts of changes collapse into a single
//! regeneration once the quiet period has passed (300 ms for a single chapter,
//! 500 ms for a batch).
//!
//! ## Regeneration Cycle
//!
//! Each cycle runs on its own task:
//!
//! 1. wait out the debounce delay,
//! 2. fetch the chapters from the [`ChapterStore`] one after the other,
//!    publishing `{current, total}` progress,
//! 3. drop blank chapters unless they were asked for,
//! 4. render on the blocking pool and count the pages of the result,
//! 5. commit: revoke the previous blob URL, register the new one, publish the
//!    new status.
//!
//! The cycle checks its [`Ticket`] after every await and gives up as soon as a
//! newer request exists, and the commit re-checks it under the same lock that
//! guards the held URL. Whichever cycle finishes first, only the most recent
//! request ever reaches the published state, and at most one blob URL is live
//! per session.
//!
//! ## Validation States
//!
//! An invalid chapter range, or a range that matches no chapter, never starts a
//! cycle. The state is committed immediately and any held preview is released.

mod blob;
mod pager;

pub use blob::{BlobRegistry, BlobUrl};
pub use pager::{count_pages, PageWindow, BATCH_PAGE_CAP};

use crate::chapters::{ChapterContent, ChapterMeta, ChapterStore};
use crate::config::presets::{page_size_px, PageSize};
use crate::config::{BatchExportConfig, ExportConfig, ExportMode};
use crate::debounce::{Debouncer, Ticket};
use crate::render::{DocumentFormat, DocumentRenderer, RenderJob};
use crate::selection::{chapters_to_render, ChapterRange};
use anyhow::{anyhow, Context, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

pub const SINGLE_CHAPTER_DELAY: Duration = Duration::from_millis(300);
pub const BATCH_DELAY: Duration = Duration::from_millis(500);

/// Everything a preview depends on.
#[derive(Clone, Debug, PartialEq)]
pub enum PreviewRequest {
    Chapter {
        chapter: ChapterMeta,
        config: ExportConfig,
    },
    Batch {
        /// The chapters the range selected, in listing order
        chapters: Vec<ChapterMeta>,
        range: ChapterRange,
        config: BatchExportConfig,
        include_empty: bool,
    },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub current: usize,
    pub total: usize,
}

/// A rendered preview ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewDocument {
    pub url: BlobUrl,
    pub pages: PageWindow,
    /// Size of one page on screen
    pub page_size: PageSize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PreviewStatus {
    /// Nothing requested yet, or the session was closed
    #[default]
    Idle,
    /// A valid range that matches no chapter
    NoSelection,
    InvalidRange,
    /// Nothing to render once blank chapters are left out
    NoContent,
    Ready(PreviewDocument),
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewState {
    /// Generation of the most recent commit
    pub committed: u64,
    pub generating: bool,
    pub progress: LoadProgress,
    pub status: PreviewStatus,
    /// Chapter snapshots loaded by the most recent cycle, blank ones included
    pub loaded: Vec<ChapterContent>,
}

impl PreviewState {
    /// The config controls are dimmed while a preview error is shown.
    pub fn settings_enabled(&self) -> bool {
        !matches!(self.status, PreviewStatus::Failed(_))
    }

    pub fn document(&self) -> Option<&PreviewDocument> {
        match &self.status {
            PreviewStatus::Ready(document) => Some(document),
            _ => None,
        }
    }
}

/// What a finished cycle hands to the commit.
enum Outcome {
    Rendered { bytes: Vec<u8>, pages: PageWindow },
    Status(PreviewStatus),
}

struct Shared<S> {
    store: Arc<S>,
    renderer: Arc<dyn DocumentRenderer>,
    blobs: BlobRegistry,
    /// The live preview URL; its lock also serialises commits
    held: Mutex<Option<BlobUrl>>,
    state: watch::Sender<PreviewState>,
    mode: ExportMode,
}

impl<S: ChapterStore> Shared<S> {
    fn lock_held(&self) -> MutexGuard<'_, Option<BlobUrl>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the outcome of `ticket`'s cycle, unless a newer one exists.
    fn commit(&self, ticket: &Ticket, outcome: Outcome, page_size: PageSize, loaded: Vec<ChapterContent>) -> bool {
        let mut held = self.lock_held();
        if !ticket.is_current() {
            log::debug!("discarding stale preview cycle {}", ticket.generation());
            return false;
        }

        if let Some(url) = held.take() {
            self.blobs.revoke(&url);
        }
        let status = match outcome {
            Outcome::Rendered { bytes, pages } => {
                let url = self.blobs.create(bytes);
                *held = Some(url.clone());
                PreviewStatus::Ready(PreviewDocument {
                    url,
                    pages,
                    page_size,
                })
            }
            Outcome::Status(status) => status,
        };

        self.state.send_modify(|state| {
            state.committed = ticket.generation();
            state.generating = false;
            state.status = status;
            state.loaded = loaded;
        });
        true
    }

    fn set_progress(&self, ticket: &Ticket, current: usize, total: usize) {
        if ticket.is_current() {
            self.state.send_modify(|state| {
                state.generating = true;
                state.progress = LoadProgress { current, total };
            });
        }
    }

    async fn run(self: Arc<Self>, ticket: Ticket, request: PreviewRequest) {
        if !ticket.settle().await {
            return;
        }
        let page_size = match &request {
            PreviewRequest::Chapter { config, .. } => page_size_px(config.page_format),
            PreviewRequest::Batch { config, .. } => page_size_px(config.base.page_format),
        };
        if let Some((outcome, loaded)) = self.generate(&ticket, request).await {
            self.commit(&ticket, outcome, page_size, loaded);
        }
    }

    /// One regeneration cycle. `None` means the cycle was superseded.
    async fn generate(&self, ticket: &Ticket, request: PreviewRequest) -> Option<(Outcome, Vec<ChapterContent>)> {
        let (job, loaded) = match request {
            PreviewRequest::Chapter { chapter, config } => {
                self.set_progress(ticket, 0, 1);
                let content = match self.store.chapter_by_id(&chapter.id).await {
                    Ok(content) => content,
                    Err(e) => return Some(failed(e, Vec::new())),
                };
                if !ticket.is_current() {
                    return None;
                }
                self.set_progress(ticket, 1, 1);

                // a chapter the store doesn't know is treated as having no text
                let content = content
                    .unwrap_or_else(|| ChapterContent::new(chapter.number, chapter.title, ""));
                if content.is_blank() {
                    return Some((Outcome::Status(PreviewStatus::NoContent), vec![content]));
                }
                (
                    RenderJob::Chapter {
                        chapter: content.clone(),
                        config,
                    },
                    vec![content],
                )
            }
            PreviewRequest::Batch {
                chapters,
                config,
                include_empty,
                ..
            } => {
                let total = chapters.len();
                self.set_progress(ticket, 0, total);
                let mut loaded = Vec::with_capacity(total);
                for (i, meta) in chapters.iter().enumerate() {
                    if !ticket.is_current() {
                        return None;
                    }
                    let fetched = self
                        .store
                        .chapter_by_id(&meta.id)
                        .await
                        .and_then(|content| {
                            content.ok_or_else(|| anyhow!("Chapter {} no longer exists", meta.number))
                        })
                        .with_context(|| format!("Failed to load chapter {}", meta.number));
                    match fetched {
                        Ok(content) => loaded.push(content),
                        Err(e) => return Some(failed(e, Vec::new())),
                    }
                    self.set_progress(ticket, i + 1, total);
                }
                if !ticket.is_current() {
                    return None;
                }

                let chapters = chapters_to_render(&loaded, include_empty);
                if chapters.is_empty() {
                    return Some((Outcome::Status(PreviewStatus::NoContent), loaded));
                }
                (RenderJob::Batch { chapters, config }, loaded)
            }
        };

        let renderer = self.renderer.clone();
        let cap = match self.mode {
            ExportMode::Single => None,
            ExportMode::Batch => Some(BATCH_PAGE_CAP),
        };
        let rendered = tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, PageWindow)> {
            let bytes = renderer.render(&job, DocumentFormat::Pdf)?;
            let total = count_pages(&bytes)?;
            Ok((bytes, PageWindow::new(total, cap)))
        })
        .await
        .with_context(|| "Preview rendering was interrupted")
        .and_then(|result| result);

        if !ticket.is_current() {
            return None;
        }
        match rendered {
            Ok((bytes, pages)) => Some((Outcome::Rendered { bytes, pages }, loaded)),
            Err(e) => Some(failed(e, loaded)),
        }
    }
}

fn failed(e: anyhow::Error, loaded: Vec<ChapterContent>) -> (Outcome, Vec<ChapterContent>) {
    log::error!("Failed to generate preview: {e:#}");
    (Outcome::Status(PreviewStatus::Failed(format!("{e:#}"))), loaded)
}

/// The preview of one open export modal.
///
/// Must be used from within a Tokio runtime: every scheduled cycle is spawned
/// as a task.
pub struct PreviewSession<S> {
    shared: Arc<Shared<S>>,
    debouncer: Debouncer,
    last_request: Option<PreviewRequest>,
}

impl<S: ChapterStore> PreviewSession<S> {
    pub fn new(
        mode: ExportMode,
        store: Arc<S>,
        renderer: Arc<dyn DocumentRenderer>,
        blobs: BlobRegistry,
    ) -> PreviewSession<S> {
        let delay = match mode {
            ExportMode::Single => SINGLE_CHAPTER_DELAY,
            ExportMode::Batch => BATCH_DELAY,
        };
        let (state, _) = watch::channel(PreviewState::default());
        PreviewSession {
            shared: Arc::new(Shared {
                store,
                renderer,
                blobs,
                held: Mutex::new(None),
                state,
                mode,
            }),
            debouncer: Debouncer::new(delay),
            last_request: None,
        }
    }

    pub fn mode(&self) -> ExportMode {
        self.shared.mode
    }

    /// Schedule a regeneration for `request`. A request equal to the last one
    /// is ignored.
    pub fn update(&mut self, request: PreviewRequest) {
        if self.last_request.as_ref() == Some(&request) {
            log::debug!("preview request unchanged, not rescheduling");
            return;
        }
        self.last_request = Some(request.clone());
        self.schedule(request);
    }

    /// Regenerate the last request even though nothing changed, for instance to
    /// pick up edits made in the chapter store.
    pub fn refresh(&mut self) {
        if let Some(request) = self.last_request.clone() {
            self.schedule(request);
        }
    }

    fn schedule(&self, request: PreviewRequest) {
        let ticket = self.debouncer.issue();

        if let PreviewRequest::Batch {
            chapters, range, config, ..
        } = &request
        {
            let immediate = if !range.is_valid() {
                Some(PreviewStatus::InvalidRange)
            } else if chapters.is_empty() {
                Some(PreviewStatus::NoSelection)
            } else {
                None
            };
            if let Some(status) = immediate {
                let page_size = page_size_px(config.base.page_format);
                self.shared
                    .commit(&ticket, Outcome::Status(status), page_size, Vec::new());
                return;
            }
        }

        log::debug!("scheduled preview cycle {}", ticket.generation());
        tokio::spawn(self.shared.clone().run(ticket, request));
    }

    pub fn state(&self) -> PreviewState {
        self.shared.state.borrow().clone()
    }

    /// The published state, but only once it reflects the latest request.
    /// While a newer change is still waiting out its delay or loading, the
    /// published chapters belong to an older selection.
    pub fn current_state(&self) -> Option<PreviewState> {
        let state = self.shared.state.borrow();
        (!state.generating && state.committed == self.debouncer.latest()).then(|| state.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.shared.state.subscribe()
    }

    /// Wait until the most recently scheduled request has been committed.
    pub async fn settled(&self) -> PreviewState {
        let latest = self.debouncer.latest();
        let mut receiver = self.subscribe();
        let settled = receiver
            .wait_for(|state| state.committed >= latest)
            .await
            .map(|state| state.clone());
        match settled {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }

    /// The bytes behind the current preview, if one is ready.
    pub fn document_bytes(&self) -> Option<Arc<[u8]>> {
        let state = self.shared.state.borrow();
        let bytes = state
            .document()
            .and_then(|document| self.shared.blobs.get(&document.url));
        bytes
    }

    /// Abandon in-flight cycles and release the held preview.
    pub fn close(&mut self) {
        self.debouncer.invalidate();
        self.last_request = None;
        let mut held = self.shared.lock_held();
        if let Some(url) = held.take() {
            self.shared.blobs.revoke(&url);
        }
        let latest = self.debouncer.latest();
        self.shared.state.send_modify(|state| {
            *state = PreviewState {
                committed: latest,
                ..PreviewState::default()
            };
        });
    }
}

impl<S> Drop for PreviewSession<S> {
    fn drop(&mut self) {
        self.debouncer.invalidate();
        let mut held = self.shared.held.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(url) = held.take() {
            self.shared.blobs.revoke(&url);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chapters::MemoryChapterStore;
    use crate::config::ConfigField;
    use crate::render::ManuscriptRenderer;
    use crate::selection::RangeSummary;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Delegates to the real renderer, recording every job.
    #[derive(Default)]
    struct RecordingRenderer {
        inner: ManuscriptRenderer,
        jobs: Mutex<Vec<RenderJob>>,
        fail: bool,
    }

    impl RecordingRenderer {
        fn failing() -> RecordingRenderer {
            RecordingRenderer {
                fail: true,
                ..RecordingRenderer::default()
            }
        }

        fn calls(&self) -> usize {
            self.jobs.lock().expect("can lock jobs").len()
        }

        fn last_job(&self) -> Option<RenderJob> {
            self.jobs.lock().expect("can lock jobs").last().cloned()
        }
    }

    impl DocumentRenderer for RecordingRenderer {
        fn render(&self, job: &RenderJob, format: DocumentFormat) -> Result<Vec<u8>> {
            self.jobs.lock().expect("can lock jobs").push(job.clone());
            if self.fail {
                anyhow::bail!("renderer exploded");
            }
            self.inner.render(job, format)
        }
    }

    /// Counts fetches and optionally takes its time answering.
    struct SlowStore {
        inner: MemoryChapterStore,
        fetches: AtomicUsize,
        delay: Duration,
    }

    impl SlowStore {
        fn new(inner: MemoryChapterStore, delay: Duration) -> SlowStore {
            SlowStore {
                inner,
                fetches: AtomicUsize::new(0),
                delay,
            }
        }
    }

    impl ChapterStore for SlowStore {
        async fn list_chapters(&self) -> Result<Vec<ChapterMeta>> {
            self.inner.list_chapters().await
        }

        async fn chapter_by_id(&self, id: &str) -> Result<Option<ChapterContent>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.chapter_by_id(id).await
        }
    }

    fn store_with(contents: &[&str]) -> MemoryChapterStore {
        let mut store = MemoryChapterStore::new();
        for (i, content) in contents.iter().enumerate() {
            let number = i as u32 + 1;
            store.insert(
                format!("ch-{number}"),
                ChapterContent::new(number, format!("Chapter title {number}"), *content),
            );
        }
        store
    }

    struct Fixture {
        store: Arc<SlowStore>,
        renderer: Arc<RecordingRenderer>,
        blobs: BlobRegistry,
        session: PreviewSession<SlowStore>,
    }

    fn fixture(mode: ExportMode, store: MemoryChapterStore, renderer: RecordingRenderer, delay: Duration) -> Fixture {
        let store = Arc::new(SlowStore::new(store, delay));
        let renderer = Arc::new(renderer);
        let blobs = BlobRegistry::new();
        let session = PreviewSession::new(mode, store.clone(), renderer.clone(), blobs.clone());
        Fixture {
            store,
            renderer,
            blobs,
            session,
        }
    }

    fn batch_request(store: &MemoryChapterStore, from: u32, to: u32, include_empty: bool) -> PreviewRequest {
        let metas = store.metas();
        let summary = RangeSummary::evaluate(&metas, ChapterRange::new(from, to), 12);
        PreviewRequest::Batch {
            chapters: summary.selected,
            range: summary.range,
            config: BatchExportConfig::default(),
            include_empty,
        }
    }

    fn chapter_request(store: &MemoryChapterStore, index: usize, config: ExportConfig) -> PreviewRequest {
        PreviewRequest::Chapter {
            chapter: store.metas()[index].clone(),
            config,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_of_changes_render_once() {
        let store = store_with(&["Era uma vez"]);
        let mut f = fixture(ExportMode::Single, store.clone(), RecordingRenderer::default(), Duration::ZERO);

        for size in [12, 13, 14, 15, 16] {
            let config = ExportConfig::default().set(ConfigField::ContentSize(size));
            f.session.update(chapter_request(&store, 0, config));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let state = f.session.settled().await;

        assert_eq!(f.renderer.calls(), 1);
        match f.renderer.last_job() {
            Some(RenderJob::Chapter { config, .. }) => assert_eq!(config.content_size, 16),
            other => panic!("unexpected job {other:?}"),
        }
        let document = state.document().expect("preview is ready");
        assert_eq!(document.pages.total, 1);
        assert_eq!(document.page_size, page_size_px(crate::config::PageFormat::A4));
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_requests_are_ignored_until_refreshed() {
        let store = store_with(&["text"]);
        let mut f = fixture(ExportMode::Single, store.clone(), RecordingRenderer::default(), Duration::ZERO);

        let request = chapter_request(&store, 0, ExportConfig::default());
        f.session.update(request.clone());
        f.session.settled().await;
        f.session.update(request);
        f.session.settled().await;
        assert_eq!(f.renderer.calls(), 1);

        f.session.refresh();
        f.session.settled().await;
        assert_eq!(f.renderer.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn only_one_preview_url_stays_live() {
        let store = store_with(&["one", "two"]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);

        let mut urls = Vec::new();
        for size in [10, 11, 12, 13] {
            let mut request = batch_request(&store, 1, 2, false);
            if let PreviewRequest::Batch { config, .. } = &mut request {
                *config = config.set(ConfigField::ContentSize(size));
            }
            f.session.update(request);
            let state = f.session.settled().await;
            urls.push(state.document().expect("preview is ready").url.clone());
            assert_eq!(f.blobs.live_count(), 1);
        }
        assert!(f.blobs.get(&urls[0]).is_none());
        assert!(f.session.document_bytes().is_some());

        f.session.close();
        assert_eq!(f.blobs.live_count(), 0);
        assert_eq!(f.session.state().status, PreviewStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_releases_the_preview() {
        let store = store_with(&["one"]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);
        f.session.update(batch_request(&store, 1, 1, false));
        f.session.settled().await;
        assert_eq!(f.blobs.live_count(), 1);

        let blobs = f.blobs.clone();
        drop(f);
        assert_eq!(blobs.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_range_commits_without_loading() {
        let store = store_with(&["one", "two", "three", "four", "five"]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);

        f.session.update(batch_request(&store, 1, 2, false));
        f.session.settled().await;
        assert_eq!(f.blobs.live_count(), 1);
        let fetches = f.store.fetches.load(Ordering::SeqCst);

        f.session.update(batch_request(&store, 5, 2, false));
        // committed right away, no timer involved
        assert_eq!(f.session.state().status, PreviewStatus::InvalidRange);
        assert_eq!(f.blobs.live_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.store.fetches.load(Ordering::SeqCst), fetches);
        assert_eq!(f.renderer.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn range_without_chapters_is_no_selection() {
        let store = store_with(&["one"]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);
        f.session.update(batch_request(&store, 7, 9, false));
        assert_eq!(f.session.state().status, PreviewStatus::NoSelection);
        assert_eq!(f.renderer.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn render_failures_disable_the_settings() {
        let store = store_with(&["one"]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::failing(), Duration::ZERO);
        f.session.update(batch_request(&store, 1, 1, false));
        let state = f.session.settled().await;

        match &state.status {
            PreviewStatus::Failed(message) => assert!(message.contains("renderer exploded")),
            other => panic!("expected a failure, got {other:?}"),
        }
        assert!(!state.settings_enabled());
        assert_eq!(f.blobs.live_count(), 0);
        assert!(!state.generating);
        // the loaded chapters survive a render failure
        assert_eq!(state.loaded.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_chapters_are_left_out_unless_included() {
        let store = store_with(&["one", "   ", "", "four"]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);

        f.session.update(batch_request(&store, 1, 4, false));
        let state = f.session.settled().await;
        assert_eq!(state.loaded.len(), 4);
        match f.renderer.last_job() {
            Some(RenderJob::Batch { chapters, .. }) => {
                let numbers: Vec<u32> = chapters.iter().map(|c| c.number).collect();
                assert_eq!(numbers, vec![1, 4]);
            }
            other => panic!("unexpected job {other:?}"),
        }

        f.session.update(batch_request(&store, 1, 4, true));
        f.session.settled().await;
        match f.renderer.last_job() {
            Some(RenderJob::Batch { chapters, .. }) => assert_eq!(chapters.len(), 4),
            other => panic!("unexpected job {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn all_blank_batch_has_no_content() {
        let store = store_with(&["", " \n "]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);
        f.session.update(batch_request(&store, 1, 2, false));
        let state = f.session.settled().await;
        assert_eq!(state.status, PreviewStatus::NoContent);
        assert_eq!(f.renderer.calls(), 0);
        assert_eq!(state.progress, LoadProgress { current: 2, total: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn blank_single_chapter_skips_rendering() {
        let store = store_with(&["  "]);
        let mut f = fixture(ExportMode::Single, store.clone(), RecordingRenderer::default(), Duration::ZERO);
        f.session.update(chapter_request(&store, 0, ExportConfig::default()));
        let state = f.session.settled().await;
        assert_eq!(state.status, PreviewStatus::NoContent);
        assert_eq!(f.renderer.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_single_chapter_counts_as_blank() {
        let store = store_with(&["text"]);
        let mut f = fixture(ExportMode::Single, store, RecordingRenderer::default(), Duration::ZERO);
        let request = PreviewRequest::Chapter {
            chapter: ChapterMeta {
                id: "gone".to_string(),
                number: 9,
                title: "Gone".to_string(),
                word_count: 0,
            },
            config: ExportConfig::default(),
        };
        f.session.update(request);
        assert_eq!(f.session.settled().await.status, PreviewStatus::NoContent);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_cycles_never_commit() {
        let store = store_with(&["one", "two"]);
        let mut f = fixture(
            ExportMode::Batch,
            store.clone(),
            RecordingRenderer::default(),
            Duration::from_secs(1),
        );

        f.session.update(batch_request(&store, 1, 2, false));
        // past the debounce delay, the first cycle is now fetching
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(f.session.state().generating);

        let newer = batch_request(&store, 1, 1, false);
        f.session.update(newer);
        let state = f.session.settled().await;

        assert_eq!(f.renderer.calls(), 1);
        match f.renderer.last_job() {
            Some(RenderJob::Batch { chapters, .. }) => assert_eq!(chapters.len(), 1),
            other => panic!("unexpected job {other:?}"),
        }
        assert_eq!(state.loaded.len(), 1);
        assert_eq!(f.blobs.live_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_preview_shows_at_most_ten_pages() {
        let long = "Palavra ".repeat(8000);
        let store = store_with(&[long.as_str()]);
        let mut f = fixture(ExportMode::Batch, store.clone(), RecordingRenderer::default(), Duration::ZERO);
        f.session.update(batch_request(&store, 1, 1, false));
        let state = f.session.settled().await;
        let pages = state.document().expect("preview is ready").pages;
        assert!(pages.total > BATCH_PAGE_CAP);
        assert_eq!(pages.shown, BATCH_PAGE_CAP);
        assert_eq!(pages.remaining, pages.total - BATCH_PAGE_CAP);
    }
}
