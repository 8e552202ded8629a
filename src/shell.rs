//! Terminal stand-ins for the desktop shell: a prompting save dialog, a fixed
//! destination for non-interactive use, and the filesystem writer.

use crate::export::{FileWriter, SaveDialog, SaveRequest};
use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::path::{Path, PathBuf};

/// Asks for the destination on the terminal. The default name is pre-filled;
/// clearing the line cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerSaveDialog;

impl SaveDialog for DialoguerSaveDialog {
    async fn save_path(&self, request: &SaveRequest) -> Result<Option<PathBuf>> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<PathBuf>> {
            let theme = ColorfulTheme {
                ..ColorfulTheme::default()
            };
            let answer: String = Input::with_theme(&theme)
                .with_prompt(format!(
                    "Save {} file as (empty to cancel)",
                    request.filter_name
                ))
                .with_initial_text(request.default_name.clone())
                .allow_empty(true)
                .interact_text()
                .with_context(|| "Failed to obtain a destination")?;
            Ok(chosen_path(&answer, &request))
        })
        .await
        .with_context(|| "Save prompt was interrupted")?
    }
}

/// Turn the typed answer into a path, adding the filter's extension when the
/// answer has none.
fn chosen_path(answer: &str, request: &SaveRequest) -> Option<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    let mut path = PathBuf::from(answer);
    if path.extension().is_none() {
        if let Some(extension) = request.extensions.first() {
            path.set_extension(extension);
        }
    }
    Some(path)
}

/// Always answers with the same path, e.g. one given on the command line.
#[derive(Debug, Clone)]
pub struct FixedPathDialog(pub PathBuf);

impl SaveDialog for FixedPathDialog {
    async fn save_path(&self, _request: &SaveRequest) -> Result<Option<PathBuf>> {
        Ok(Some(self.0.clone()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFileWriter;

impl FileWriter for TokioFileWriter {
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
