use anyhow::{anyhow, bail, Context, Result};
use cli::{Cli, Commands, Selection, Target};
use console::style;
use grimorium_export::chapters::{ChapterMeta, ChapterStore, JsonChapterStore};
use grimorium_export::config::{BatchField, ExportMode};
use grimorium_export::export::{ExportOutcome, Exporter, FeedbackKind, FileWriter, SaveDialog};
use grimorium_export::modal::{BatchExportModal, ChapterExportModal};
use grimorium_export::preview::{BlobRegistry, PreviewSession, PreviewState, PreviewStatus};
use grimorium_export::render::{DocumentFormat, DocumentRenderer, ManuscriptRenderer};
use grimorium_export::selection::MAX_BATCH_CHAPTERS;
use grimorium_export::settings::Settings;
use grimorium_export::shell::{DialoguerSaveDialog, FixedPathDialog, TokioFileWriter};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
mod wizard;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Config => wizard::run(&cli.settings),
        Commands::Chapters => {
            let workspace = Workspace::load(&cli.settings)?;
            block_on(list_chapters(&workspace))
        }
        Commands::Preview {
            selection,
            out,
            watch,
        } => {
            let workspace = Workspace::load(&cli.settings)?;
            block_on(preview(workspace, &cli.settings, selection, out, watch))
        }
        Commands::Export {
            selection,
            format,
            output,
        } => {
            let workspace = Workspace::load(&cli.settings)?;
            let format = DocumentFormat::from(format);
            match output {
                Some(path) => block_on(export(&workspace, selection, format, FixedPathDialog(path))),
                None => block_on(export(&workspace, selection, format, DialoguerSaveDialog)),
            }
        }
    }
}

/// Log to stderr. `GRIMORIUM_LOG` takes an env-filter directive and wins over
/// the verbosity flags.
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("GRIMORIUM_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("{}: failed to set up logging: {e}", style("Warning").yellow());
    }
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "Failed to start the async runtime")?
        .block_on(future)
}

fn human_size(bytes: usize) -> String {
    let size = byte_unit::Byte::from_u64(bytes as u64)
        .get_appropriate_unit(byte_unit::UnitType::Binary);
    format!("{size:.1}")
}

/// What every command works against.
struct Workspace {
    settings: Settings,
    store: Arc<JsonChapterStore>,
    renderer: Arc<dyn DocumentRenderer>,
    blobs: BlobRegistry,
}

impl Workspace {
    fn load(path: &Path) -> Result<Workspace> {
        let settings = Settings::load(path)?;
        Ok(Workspace {
            store: Arc::new(settings.store()),
            renderer: Arc::new(ManuscriptRenderer::new(settings.labels.clone())),
            blobs: BlobRegistry::new(),
            settings,
        })
    }

    async fn listing(&self) -> Result<Vec<ChapterMeta>> {
        self.store
            .list_chapters()
            .await
            .with_context(|| "Failed to list chapters")
    }
}

async fn list_chapters(workspace: &Workspace) -> Result<()> {
    let chapters = workspace.listing().await?;
    if chapters.is_empty() {
        println!("No chapters in {}", workspace.settings.manuscript.display());
        return Ok(());
    }

    for chapter in &chapters {
        let title = if chapter.title.trim().is_empty() {
            workspace.settings.labels.untitled.as_str()
        } else {
            chapter.title.as_str()
        };
        let words = if chapter.word_count == 0 {
            style("empty").yellow().to_string()
        } else {
            format!("{} words", chapter.word_count)
        };
        println!("{:>4}  {:<40} {}", chapter.number, title, words);
    }
    let total: usize = chapters.iter().map(|chapter| chapter.word_count).sum();
    println!("\n{} chapters, {} words", chapters.len(), total);
    Ok(())
}

/// One of the two export modals, driven from the command line.
enum Modal {
    Chapter(ChapterExportModal<JsonChapterStore>),
    Batch(BatchExportModal<JsonChapterStore>),
}

impl Modal {
    fn new(workspace: &Workspace, target: Target) -> Modal {
        let store = workspace.store.clone();
        let renderer = workspace.renderer.clone();
        let blobs = workspace.blobs.clone();
        match target {
            Target::Chapter(_) => Modal::Chapter(ChapterExportModal::new(
                store,
                renderer,
                blobs,
                workspace.settings.export.clone(),
            )),
            Target::Batch(_) => Modal::Batch(BatchExportModal::new(
                store,
                renderer,
                blobs,
                workspace.settings.batch_config(),
                workspace.settings.batch.include_empty_chapters,
            )),
        }
    }

    /// Bring the modal in line with the settings, the manuscript and the
    /// command line, then force a reload of the chapters.
    async fn configure(&mut self, workspace: &Workspace, target: Target, overrides: &[BatchField]) -> Result<()> {
        let typography = workspace.settings.typography();
        let listing = workspace.listing().await?;

        match (self, target) {
            (Modal::Chapter(modal), Target::Chapter(number)) => {
                let meta = listing
                    .into_iter()
                    .find(|chapter| chapter.number == number)
                    .ok_or_else(|| anyhow!("No chapter numbered {number}"))?;
                let mut config = workspace
                    .settings
                    .export
                    .with_typography(&typography)
                    .fit_to(ExportMode::Single);
                for field in overrides {
                    match field {
                        BatchField::Base(field) => config = config.set(*field),
                        other => log::warn!("{other:?} only applies to batch exports, ignoring"),
                    }
                }
                modal.open(meta, &typography);
                modal.set_config(config);
                modal.refresh();
            }
            (Modal::Batch(modal), Target::Batch(range)) => {
                let mut config = workspace.settings.batch_config();
                config.base = config
                    .base
                    .with_typography(&typography)
                    .fit_to(ExportMode::Batch);
                for field in overrides {
                    config = config.set(*field);
                }
                if modal.is_open() {
                    modal.set_listing(listing);
                } else {
                    modal.open(listing, &typography);
                }
                modal.set_range(range);
                modal.set_config(config);
                modal.set_include_empty(workspace.settings.batch.include_empty_chapters);
                modal.refresh();
            }
            _ => bail!("Selection doesn't match the export modal"),
        }
        Ok(())
    }

    fn preview(&self) -> &PreviewSession<JsonChapterStore> {
        match self {
            Modal::Chapter(modal) => modal.preview(),
            Modal::Batch(modal) => modal.preview(),
        }
    }

    fn print_selection(&self) {
        let Modal::Batch(modal) = self else {
            return;
        };
        let summary = modal.summary();
        if !summary.is_valid {
            println!(
                "{}",
                style(format!(
                    "Invalid range: chapter {} comes after chapter {}",
                    summary.range.from, summary.range.to
                ))
                .red()
            );
            return;
        }
        println!(
            "Chapters {} to {}: {} selected, {} words, about {} pages",
            summary.range.from,
            summary.range.to,
            summary.selected.len(),
            summary.total_words,
            summary.estimated_pages
        );
        if summary.too_many_chapters {
            println!(
                "{}",
                style(format!(
                    "More than {MAX_BATCH_CHAPTERS} chapters selected, this may take a while"
                ))
                .yellow()
            );
        }
    }

    fn print_empty_notice(&self) {
        if let Modal::Batch(modal) = self {
            if let Some(notice) = modal.empty_notice() {
                println!(
                    "{}",
                    style(notice.describe(!modal.include_empty())).yellow()
                );
            }
        }
    }

    async fn export<D: SaveDialog, W: FileWriter>(
        &mut self,
        exporter: &Exporter<D, W>,
        format: DocumentFormat,
    ) -> ExportOutcome {
        match self {
            Modal::Chapter(modal) => modal.export(exporter, format).await,
            Modal::Batch(modal) => modal.export(exporter, format).await,
        }
    }

    fn close(&mut self) {
        match self {
            Modal::Chapter(modal) => modal.close(),
            Modal::Batch(modal) => modal.close(),
        }
    }
}

/// Wait for the preview to settle, showing chapter loading progress.
async fn wait_for_preview(preview: &PreviewSession<JsonChapterStore>) -> PreviewState {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("can parse progress style")
            .progress_chars("#>-"),
    );
    progress.set_message("Loading chapters...");

    let mut updates = preview.subscribe();
    let settled = preview.settled();
    tokio::pin!(settled);
    let state = loop {
        tokio::select! {
            state = &mut settled => break state,
            changed = updates.changed() => {
                if changed.is_err() {
                    break (&mut settled).await;
                }
                let loaded = updates.borrow_and_update().progress;
                progress.set_length(loaded.total as u64);
                progress.set_position(loaded.current as u64);
                if loaded.total > 0 && loaded.current == loaded.total {
                    progress.set_message("Rendering...");
                }
            }
        }
    };
    progress.finish_and_clear();
    state
}

/// Turn the states that block an export into errors.
fn check_status(status: &PreviewStatus, target: Target) -> Result<()> {
    match status {
        PreviewStatus::InvalidRange => bail!("The first chapter of the range comes after the last"),
        PreviewStatus::NoSelection => match target {
            Target::Batch(range) => bail!("No chapters numbered {} to {}", range.from, range.to),
            Target::Chapter(number) => bail!("No chapter numbered {number}"),
        },
        PreviewStatus::Failed(message) => Err(anyhow!("{message}")),
        _ => Ok(()),
    }
}

async fn write_preview(modal: &Modal, state: &PreviewState, target: Target, out: &Path) -> Result<()> {
    check_status(&state.status, target)?;
    modal.print_empty_notice();

    match &state.status {
        PreviewStatus::Ready(document) => {
            let bytes = modal
                .preview()
                .document_bytes()
                .ok_or_else(|| anyhow!("The preview was released before it could be written"))?;
            tokio::fs::write(out, &*bytes)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "Preview written to {} ({} pages, {})",
                out.display(),
                document.pages.total,
                human_size(bytes.len())
            );
            if let Some(notice) = document.pages.notice() {
                println!("  first {} pages shown, {notice}", document.pages.shown);
            }
        }
        PreviewStatus::NoContent => {
            println!(
                "{}",
                style("Nothing to preview: the selected chapters have no text").yellow()
            );
        }
        _ => {}
    }
    Ok(())
}

async fn preview(
    mut workspace: Workspace,
    settings_path: &Path,
    selection: Selection,
    out: PathBuf,
    watch: bool,
) -> Result<()> {
    let target = selection.target()?;
    let mut modal = Modal::new(&workspace, target);
    modal.configure(&workspace, target, &selection.overrides).await?;
    modal.print_selection();
    let state = wait_for_preview(modal.preview()).await;

    if !watch {
        let written = write_preview(&modal, &state, target, &out).await;
        modal.close();
        return written;
    }

    if let Err(e) = write_preview(&modal, &state, target, &out).await {
        eprintln!("{}: {e:#}", style("Error").red());
    }

    use notify::{RecursiveMode, Watcher};
    let (changes, mut changed) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| match event {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
            let _ = changes.send(());
        }
        Ok(_) => {}
        Err(e) => log::warn!("file watch error: {e}"),
    })
    .with_context(|| "Failed to start watching files")?;
    for path in [settings_path, workspace.settings.manuscript.as_path()] {
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
    }
    println!(
        "Watching {} and {} for changes, press Ctrl+C to stop",
        settings_path.display(),
        workspace.settings.manuscript.display()
    );

    loop {
        tokio::select! {
            received = changed.recv() => {
                if received.is_none() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        // editors tend to save in several steps
        while changed.try_recv().is_ok() {}

        match Settings::load(settings_path) {
            Ok(settings) => {
                if settings.manuscript != workspace.settings.manuscript {
                    log::warn!("manuscript path changed, restart to pick it up");
                }
                workspace.settings = settings;
            }
            Err(e) => {
                eprintln!("{}: {e:#}", style("Error").red());
                continue;
            }
        }

        if let Err(e) = modal.configure(&workspace, target, &selection.overrides).await {
            eprintln!("{}: {e:#}", style("Error").red());
            continue;
        }
        let state = wait_for_preview(modal.preview()).await;
        if let Err(e) = write_preview(&modal, &state, target, &out).await {
            eprintln!("{}: {e:#}", style("Error").red());
        }
    }

    modal.close();
    Ok(())
}

async fn export<D: SaveDialog>(
    workspace: &Workspace,
    selection: Selection,
    format: DocumentFormat,
    dialog: D,
) -> Result<()> {
    let target = selection.target()?;
    let mut modal = Modal::new(workspace, target);
    modal.configure(workspace, target, &selection.overrides).await?;
    modal.print_selection();
    let state = wait_for_preview(modal.preview()).await;
    check_status(&state.status, target)?;
    modal.print_empty_notice();

    let exporter = Exporter::new(dialog, TokioFileWriter, workspace.renderer.clone());
    let outcome = modal.export(&exporter, format).await;
    modal.close();

    if let Some(feedback) = outcome.feedback(&workspace.settings.labels) {
        match feedback.kind {
            FeedbackKind::Success => println!("{}", style(&feedback.message).green()),
            FeedbackKind::Error => bail!("{}", feedback.message),
        }
    }
    match outcome {
        ExportOutcome::Saved { path, bytes, .. } => {
            println!("  {} ({})", path.display(), human_size(bytes));
            Ok(())
        }
        ExportOutcome::Cancelled => {
            println!("Export cancelled");
            Ok(())
        }
        ExportOutcome::Unavailable => bail!("Nothing to export: the selected chapters have no text"),
        ExportOutcome::Busy => bail!("Another export is still running"),
        ExportOutcome::Failed(message) => Err(anyhow!("{message}")),
    }
}
