//! The `grimorium-export.toml` settings file.
//!
//! Only `manuscript` is required; every section falls back to the built-in
//! defaults. The file seeds each new export session and is never written back
//! by one, so changes made while exporting last only as long as the session.

use crate::chapters::JsonChapterStore;
use crate::config::{BatchExportConfig, EditorTypography, ExportConfig};
use crate::render::Labels;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "grimorium-export.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Manuscript JSON file, relative to the settings file
    pub manuscript: PathBuf,
    /// Typography carried over from the chapter editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorTypography>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub labels: Labels,
}

/// The batch-only options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub show_chapter_titles: bool,
    pub page_break_between_chapters: bool,
    pub include_table_of_contents: bool,
    pub chapter_spacing: u32,
    pub include_empty_chapters: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        let defaults = BatchExportConfig::default();
        BatchSettings {
            show_chapter_titles: defaults.show_chapter_titles,
            page_break_between_chapters: defaults.page_break_between_chapters,
            include_table_of_contents: defaults.include_table_of_contents,
            chapter_spacing: defaults.chapter_spacing,
            include_empty_chapters: false,
        }
    }
}

impl Settings {
    pub fn new<P: Into<PathBuf>>(manuscript: P) -> Settings {
        Settings {
            manuscript: manuscript.into(),
            editor: None,
            export: ExportConfig::default(),
            batch: BatchSettings::default(),
            labels: Labels::default(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        let mut settings: Settings =
            toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
        if settings.manuscript.is_relative() {
            if let Some(dir) = path.parent() {
                settings.manuscript = dir.join(&settings.manuscript);
            }
        }
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn typography(&self) -> EditorTypography {
        self.editor.clone().unwrap_or_default()
    }

    /// Defaults for a batch export. Editor typography is not applied here; it
    /// is carried over when a modal opens.
    pub fn batch_config(&self) -> BatchExportConfig {
        BatchExportConfig {
            base: self.export.clone(),
            show_chapter_titles: self.batch.show_chapter_titles,
            page_break_between_chapters: self.batch.page_break_between_chapters,
            include_table_of_contents: self.batch.include_table_of_contents,
            chapter_spacing: self.batch.chapter_spacing,
        }
    }

    pub fn store(&self) -> JsonChapterStore {
        JsonChapterStore::new(&self.manuscript)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{FontFamily, PageFormat, TitleFormat};

    #[test]
    fn minimal_file_uses_defaults() {
        let settings: Settings = toml::from_str(r#"manuscript = "book.json""#).expect("can parse");
        assert_eq!(settings, Settings::new("book.json"));
        assert_eq!(settings.batch_config(), BatchExportConfig::default());
    }

    #[test]
    fn can_read_every_section() {
        let settings: Settings = toml::from_str(
            r#"
manuscript = "book.json"

[editor]
content_font = "Courier New"
content_size = 14

[export]
page_format = "letter"
title_format = "number-only"

[batch]
include_table_of_contents = true
include_empty_chapters = true

[labels]
chapter = "Capítulo"
"#,
        )
        .expect("can parse");

        assert_eq!(settings.export.page_format, PageFormat::Letter);
        assert_eq!(settings.export.title_format, TitleFormat::NumberOnly);
        assert!(settings.batch.include_empty_chapters);
        assert_eq!(settings.labels.chapter, "Capítulo");
        assert_eq!(settings.labels.untitled, "Untitled");

        let batch = settings.batch_config();
        assert!(batch.include_table_of_contents);
        assert_eq!(batch.base, settings.export);

        let opened = batch.base.with_typography(&settings.typography());
        assert_eq!(opened.content_font, FontFamily::CourierNew);
        assert_eq!(opened.content_size, 14);
        assert_eq!(opened.content_line_spacing, 2.0);
    }

    #[test]
    fn can_save_and_load() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join(SETTINGS_FILE);

        let mut settings = Settings::new("book.json");
        settings.batch.chapter_spacing = 80;
        settings.editor = Some(EditorTypography {
            content_size: Some(11),
            ..EditorTypography::default()
        });
        settings.save(&path).expect("can save");

        let loaded = Settings::load(&path).expect("can load");
        assert_eq!(loaded.manuscript, dir.path().join("book.json"));
        assert_eq!(loaded.batch.chapter_spacing, 80);
        assert_eq!(loaded.editor, settings.editor);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Settings::load("/definitely/not/here.toml").expect_err("file is missing");
        assert!(format!("{err:#}").contains("/definitely/not/here.toml"));
    }
}
