//! Export configuration model.
//!
//! [`ExportConfig`] is the plain, serialisable record of every layout and style
//! choice that drives document rendering. Batch exports wrap it in a
//! [`BatchExportConfig`] which adds the options that only make sense when several
//! chapters are combined into one document.
//!
//! Configs are never mutated in place. Every control change goes through
//! [`ExportConfig::set`] / [`BatchExportConfig::set`], which return a new value with
//! the single field merged in. There is no cross-field validation at that point:
//! `chapter_spacing` can be changed while `page_break_between_chapters` is on, it
//! simply has no effect on the rendered document.
//!
//! Numeric fields have declared ranges. Interactive front ends only offer in-range
//! values, but anything that crosses a process boundary (a settings file, a
//! `--set` override) must pass [`ExportConfig::validate`] before it reaches a
//! renderer.

pub mod presets;

use serde::de::value::StrDeserializer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

pub const TITLE_SIZE_RANGE: RangeInclusive<u32> = 14..=28;
pub const CONTENT_SIZE_RANGE: RangeInclusive<u32> = 8..=24;
/// Single-chapter export offers a narrower set of body sizes.
pub const SINGLE_CONTENT_SIZE_RANGE: RangeInclusive<u32> = 10..=16;
pub const LINE_SPACING_RANGE: RangeInclusive<f32> = 1.0..=2.5;
pub const TITLE_SPACING_RANGE: RangeInclusive<u32> = 20..=80;
pub const CHAPTER_SPACING_RANGE: RangeInclusive<u32> = 20..=120;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    pub fn all() -> &'static [PageFormat] {
        &[PageFormat::A4, PageFormat::Letter]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PageFormat::A4 => "A4 (21 x 29.7 cm)",
            PageFormat::Letter => "US Letter (21.6 x 27.9 cm)",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarginPreset {
    #[default]
    Editorial,
    Narrow,
    Wide,
}

impl MarginPreset {
    pub fn all() -> &'static [MarginPreset] {
        &[MarginPreset::Editorial, MarginPreset::Narrow, MarginPreset::Wide]
    }
}

impl fmt::Display for MarginPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarginPreset::Editorial => "Editorial",
            MarginPreset::Narrow => "Narrow",
            MarginPreset::Wide => "Wide",
        };
        write!(f, "{name}")
    }
}

/// How a chapter heading combines the chapter word, number and title.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleFormat {
    #[default]
    NumberColonTitle,
    NumberDashTitle,
    TitleOnly,
    NumberOnly,
}

impl TitleFormat {
    pub fn all() -> &'static [TitleFormat] {
        &[
            TitleFormat::NumberColonTitle,
            TitleFormat::NumberDashTitle,
            TitleFormat::TitleOnly,
            TitleFormat::NumberOnly,
        ]
    }
}

impl fmt::Display for TitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let example = match self {
            TitleFormat::NumberColonTitle => "Chapter 1: Title",
            TitleFormat::NumberDashTitle => "Chapter 1 - Title",
            TitleFormat::TitleOnly => "Title",
            TitleFormat::NumberOnly => "Chapter 1",
        };
        write!(f, "{example}")
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleAlignment {
    Left,
    #[default]
    Center,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl ContentAlignment {
    pub fn all() -> &'static [ContentAlignment] {
        &[
            ContentAlignment::Left,
            ContentAlignment::Center,
            ContentAlignment::Right,
            ContentAlignment::Justify,
        ]
    }
}

impl fmt::Display for ContentAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentAlignment::Left => "left",
            ContentAlignment::Center => "center",
            ContentAlignment::Right => "right",
            ContentAlignment::Justify => "justify",
        };
        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberPosition {
    Left,
    #[default]
    Center,
    Right,
}

/// The font families offered by the editor. Each maps onto a concrete font per
/// output format, see [`presets::pdf_font`] and [`presets::word_font`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[serde(rename = "Inter")]
    Inter,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    #[serde(rename = "Courier New")]
    CourierNew,
    #[serde(rename = "Arial")]
    Arial,
    #[serde(rename = "sans-serif")]
    SansSerif,
}

impl FontFamily {
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Arial => "Arial",
            FontFamily::SansSerif => "sans-serif",
        }
    }

    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Inter,
            FontFamily::TimesNewRoman,
            FontFamily::CourierNew,
            FontFamily::Arial,
            FontFamily::SansSerif,
        ]
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFamily::SansSerif => write!(f, "Sans Serif"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Single-chapter and batch exports accept slightly different value sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportMode {
    Single,
    Batch,
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::Single => write!(f, "single-chapter"),
            ExportMode::Batch => write!(f, "batch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("`{field}` = {value} is not available for {mode} export")]
    NotAllowed {
        field: &'static str,
        value: String,
        mode: ExportMode,
    },
    #[error("unknown export setting `{0}`")]
    UnknownField(String),
    #[error("invalid value `{value}` for `{field}`: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Layout and style choices for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_format: PageFormat,
    pub margins: MarginPreset,
    pub title_format: TitleFormat,
    pub title_font: FontFamily,
    /// Title size in points, see [`TITLE_SIZE_RANGE`]
    pub title_size: u32,
    pub title_alignment: TitleAlignment,
    pub title_bold: bool,
    /// Space below a chapter title in points, see [`TITLE_SPACING_RANGE`]
    pub title_spacing: u32,
    pub show_page_numbers: bool,
    pub page_number_position: PageNumberPosition,
    pub content_font: FontFamily,
    /// Body size in points, see [`CONTENT_SIZE_RANGE`]
    pub content_size: u32,
    /// Line height as a multiple of the body size, see [`LINE_SPACING_RANGE`]
    pub content_line_spacing: f32,
    pub content_alignment: ContentAlignment,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            page_format: PageFormat::A4,
            margins: MarginPreset::Editorial,
            title_format: TitleFormat::NumberColonTitle,
            title_font: FontFamily::Inter,
            title_size: 24,
            title_alignment: TitleAlignment::Center,
            title_bold: true,
            title_spacing: 40,
            show_page_numbers: true,
            page_number_position: PageNumberPosition::Center,
            content_font: FontFamily::TimesNewRoman,
            content_size: 12,
            content_line_spacing: 2.0,
            content_alignment: ContentAlignment::Left,
        }
    }
}

/// Body typography carried over from the chapter editor when an export opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorTypography {
    pub content_font: Option<FontFamily>,
    pub content_size: Option<u32>,
    pub content_line_spacing: Option<f32>,
}

/// One control change. Applying it with [`ExportConfig::set`] yields a new config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigField {
    PageFormat(PageFormat),
    Margins(MarginPreset),
    TitleFormat(TitleFormat),
    TitleFont(FontFamily),
    TitleSize(u32),
    TitleAlignment(TitleAlignment),
    TitleBold(bool),
    TitleSpacing(u32),
    ShowPageNumbers(bool),
    PageNumberPosition(PageNumberPosition),
    ContentFont(FontFamily),
    ContentSize(u32),
    ContentLineSpacing(f32),
    ContentAlignment(ContentAlignment),
}

impl ExportConfig {
    /// Merge a single field change into a copy of this config.
    pub fn set(&self, field: ConfigField) -> ExportConfig {
        let mut next = self.clone();
        match field {
            ConfigField::PageFormat(v) => next.page_format = v,
            ConfigField::Margins(v) => next.margins = v,
            ConfigField::TitleFormat(v) => next.title_format = v,
            ConfigField::TitleFont(v) => next.title_font = v,
            ConfigField::TitleSize(v) => next.title_size = v,
            ConfigField::TitleAlignment(v) => next.title_alignment = v,
            ConfigField::TitleBold(v) => next.title_bold = v,
            ConfigField::TitleSpacing(v) => next.title_spacing = v,
            ConfigField::ShowPageNumbers(v) => next.show_page_numbers = v,
            ConfigField::PageNumberPosition(v) => next.page_number_position = v,
            ConfigField::ContentFont(v) => next.content_font = v,
            ConfigField::ContentSize(v) => next.content_size = v,
            ConfigField::ContentLineSpacing(v) => next.content_line_spacing = v,
            ConfigField::ContentAlignment(v) => next.content_alignment = v,
        }
        next
    }

    /// Apply editor typography over the defaults, keeping anything the editor
    /// didn't specify.
    pub fn with_typography(&self, typography: &EditorTypography) -> ExportConfig {
        let mut next = self.clone();
        if let Some(font) = typography.content_font {
            next.content_font = font;
        }
        if let Some(size) = typography.content_size {
            next.content_size = size;
        }
        if let Some(spacing) = typography.content_line_spacing {
            next.content_line_spacing = spacing;
        }
        next
    }

    /// Pull the body typography into what `mode` accepts. Editor typography
    /// and saved defaults may carry values only the wider batch ranges allow.
    pub fn fit_to(&self, mode: ExportMode) -> ExportConfig {
        let mut next = self.clone();
        let content_range = match mode {
            ExportMode::Single => SINGLE_CONTENT_SIZE_RANGE,
            ExportMode::Batch => CONTENT_SIZE_RANGE,
        };
        next.content_size = next
            .content_size
            .clamp(*content_range.start(), *content_range.end());
        if !LINE_SPACING_RANGE.contains(&next.content_line_spacing) {
            let (min, max) = (*LINE_SPACING_RANGE.start(), *LINE_SPACING_RANGE.end());
            next.content_line_spacing = if next.content_line_spacing > max { max } else { min };
        }
        if mode == ExportMode::Single && next.content_alignment != ContentAlignment::Justify {
            next.content_alignment = ContentAlignment::Left;
        }
        next
    }

    /// Check every numeric field against its declared range, and the value sets
    /// that single-chapter export narrows.
    pub fn validate(&self, mode: ExportMode) -> Result<(), ConfigError> {
        check_range("title_size", self.title_size, &TITLE_SIZE_RANGE)?;
        check_range("title_spacing", self.title_spacing, &TITLE_SPACING_RANGE)?;
        let content_range = match mode {
            ExportMode::Single => &SINGLE_CONTENT_SIZE_RANGE,
            ExportMode::Batch => &CONTENT_SIZE_RANGE,
        };
        check_range("content_size", self.content_size, content_range)?;
        check_range(
            "content_line_spacing",
            self.content_line_spacing,
            &LINE_SPACING_RANGE,
        )?;

        if mode == ExportMode::Single
            && !matches!(
                self.content_alignment,
                ContentAlignment::Left | ContentAlignment::Justify
            )
        {
            return Err(ConfigError::NotAllowed {
                field: "content_alignment",
                value: self.content_alignment.to_string(),
                mode,
            });
        }

        Ok(())
    }
}

/// Batch export: the shared config plus options for combining chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchExportConfig {
    #[serde(flatten)]
    pub base: ExportConfig,
    pub show_chapter_titles: bool,
    pub page_break_between_chapters: bool,
    pub include_table_of_contents: bool,
    /// Gap after each chapter in points when chapters share pages. Inert while
    /// `page_break_between_chapters` is set.
    pub chapter_spacing: u32,
}

impl Default for BatchExportConfig {
    fn default() -> Self {
        BatchExportConfig {
            base: ExportConfig::default(),
            show_chapter_titles: true,
            page_break_between_chapters: true,
            include_table_of_contents: false,
            chapter_spacing: 60,
        }
    }
}

/// A change to a batch config: either a shared field or a batch-only one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchField {
    Base(ConfigField),
    ShowChapterTitles(bool),
    PageBreakBetweenChapters(bool),
    IncludeTableOfContents(bool),
    ChapterSpacing(u32),
}

impl From<ConfigField> for BatchField {
    fn from(field: ConfigField) -> Self {
        BatchField::Base(field)
    }
}

impl BatchExportConfig {
    /// Wrap a single-chapter config: one chapter, title shown, no contents page.
    pub fn single(base: ExportConfig) -> BatchExportConfig {
        BatchExportConfig {
            base,
            show_chapter_titles: true,
            page_break_between_chapters: true,
            include_table_of_contents: false,
            ..BatchExportConfig::default()
        }
    }

    pub fn set(&self, field: impl Into<BatchField>) -> BatchExportConfig {
        let mut next = self.clone();
        match field.into() {
            BatchField::Base(field) => next.base = self.base.set(field),
            BatchField::ShowChapterTitles(v) => next.show_chapter_titles = v,
            BatchField::PageBreakBetweenChapters(v) => next.page_break_between_chapters = v,
            BatchField::IncludeTableOfContents(v) => next.include_table_of_contents = v,
            BatchField::ChapterSpacing(v) => next.chapter_spacing = v,
        }
        next
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base.validate(ExportMode::Batch)?;
        check_range("chapter_spacing", self.chapter_spacing, &CHAPTER_SPACING_RANGE)
    }
}

fn check_range<T>(field: &'static str, value: T, range: &RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            min: range.start().to_string(),
            max: range.end().to_string(),
        })
    }
}

fn invalid(field: &str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_scalar<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse::<T>().map_err(|e| invalid(field, value, e))
}

fn parse_named<T: DeserializeOwned>(field: &str, value: &str) -> Result<T, ConfigError> {
    T::deserialize(StrDeserializer::<serde::de::value::Error>::new(value))
        .map_err(|e| invalid(field, value, e))
}

/// Parses `key=value` overrides, using the same names as the settings file.
impl FromStr for BatchField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| invalid(s, "", "expected `key=value`"))?;
        let key = key.trim();
        let value = value.trim();

        use ConfigField as F;
        let field = match key {
            "page_format" => F::PageFormat(parse_named(key, value)?).into(),
            "margins" => F::Margins(parse_named(key, value)?).into(),
            "title_format" => F::TitleFormat(parse_named(key, value)?).into(),
            "title_font" => F::TitleFont(parse_named(key, value)?).into(),
            "title_size" => F::TitleSize(parse_scalar(key, value)?).into(),
            "title_alignment" => F::TitleAlignment(parse_named(key, value)?).into(),
            "title_bold" => F::TitleBold(parse_scalar(key, value)?).into(),
            "title_spacing" => F::TitleSpacing(parse_scalar(key, value)?).into(),
            "show_page_numbers" => F::ShowPageNumbers(parse_scalar(key, value)?).into(),
            "page_number_position" => F::PageNumberPosition(parse_named(key, value)?).into(),
            "content_font" => F::ContentFont(parse_named(key, value)?).into(),
            "content_size" => F::ContentSize(parse_scalar(key, value)?).into(),
            "content_line_spacing" => F::ContentLineSpacing(parse_scalar(key, value)?).into(),
            "content_alignment" => F::ContentAlignment(parse_named(key, value)?).into(),
            "show_chapter_titles" => BatchField::ShowChapterTitles(parse_scalar(key, value)?),
            "page_break_between_chapters" => {
                BatchField::PageBreakBetweenChapters(parse_scalar(key, value)?)
            }
            "include_table_of_contents" => {
                BatchField::IncludeTableOfContents(parse_scalar(key, value)?)
            }
            "chapter_spacing" => BatchField::ChapterSpacing(parse_scalar(key, value)?),
            other => return Err(ConfigError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_serialize_config() {
        let config = BatchExportConfig::default();
        let text = toml::to_string(&config).expect("can serialize config to TOML");
        assert!(text.contains("page_format = \"a4\""));
        assert!(text.contains("title_format = \"number-colon-title\""));
        assert!(text.contains("content_font = \"Times New Roman\""));

        let parsed: BatchExportConfig = toml::from_str(&text).expect("can parse config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let parsed: ExportConfig =
            toml::from_str("page_format = \"letter\"\ncontent_size = 14\n").expect("can parse");
        assert_eq!(parsed.page_format, PageFormat::Letter);
        assert_eq!(parsed.content_size, 14);
        assert_eq!(parsed.margins, MarginPreset::Editorial);
    }

    #[test]
    fn unknown_font_is_rejected() {
        let parsed: Result<ExportConfig, _> = toml::from_str("title_font = \"Comic Sans\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn set_merges_a_single_field() {
        let config = ExportConfig::default();
        let next = config.set(ConfigField::TitleSize(18));
        assert_eq!(next.title_size, 18);
        assert_eq!(config.title_size, 24);
        assert_eq!(next.set(ConfigField::TitleSize(24)), config);
    }

    #[test]
    fn chapter_spacing_stays_while_page_breaks_are_on() {
        let config = BatchExportConfig::default()
            .set(BatchField::PageBreakBetweenChapters(true))
            .set(BatchField::ChapterSpacing(100));
        assert!(config.page_break_between_chapters);
        assert_eq!(config.chapter_spacing, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_reports_out_of_range_fields() {
        let config = ExportConfig::default().set(ConfigField::TitleSize(40));
        assert_eq!(
            config.validate(ExportMode::Batch),
            Err(ConfigError::OutOfRange {
                field: "title_size",
                value: "40".to_string(),
                min: "14".to_string(),
                max: "28".to_string(),
            })
        );

        let config = ExportConfig::default().set(ConfigField::ContentLineSpacing(f32::NAN));
        assert!(config.validate(ExportMode::Batch).is_err());
    }

    #[test]
    fn single_export_narrows_size_and_alignment() {
        let large = ExportConfig::default().set(ConfigField::ContentSize(20));
        assert!(large.validate(ExportMode::Batch).is_ok());
        assert!(large.validate(ExportMode::Single).is_err());

        let centred =
            ExportConfig::default().set(ConfigField::ContentAlignment(ContentAlignment::Center));
        assert!(centred.validate(ExportMode::Batch).is_ok());
        assert!(matches!(
            centred.validate(ExportMode::Single),
            Err(ConfigError::NotAllowed { field: "content_alignment", .. })
        ));
    }

    #[test]
    fn fitting_pulls_typography_into_range() {
        let wide = ExportConfig::default()
            .set(ConfigField::ContentSize(18))
            .set(ConfigField::ContentLineSpacing(3.0))
            .set(ConfigField::ContentAlignment(ContentAlignment::Center));
        assert!(wide.validate(ExportMode::Single).is_err());

        let single = wide.fit_to(ExportMode::Single);
        assert_eq!(single.content_size, 16);
        assert_eq!(single.content_line_spacing, 2.5);
        assert_eq!(single.content_alignment, ContentAlignment::Left);
        assert!(single.validate(ExportMode::Single).is_ok());

        let batch = wide.fit_to(ExportMode::Batch);
        assert_eq!(batch.content_size, 18);
        assert_eq!(batch.content_alignment, ContentAlignment::Center);
        assert!(batch.validate(ExportMode::Batch).is_ok());

        let tiny = ExportConfig::default().set(ConfigField::ContentSize(4));
        assert_eq!(tiny.fit_to(ExportMode::Batch).content_size, 8);
        assert_eq!(ExportConfig::default().fit_to(ExportMode::Single), ExportConfig::default());
    }

    #[test]
    fn typography_overrides_only_given_fields() {
        let typography = EditorTypography {
            content_font: Some(FontFamily::CourierNew),
            content_size: None,
            content_line_spacing: Some(1.5),
        };
        let config = ExportConfig::default().with_typography(&typography);
        assert_eq!(config.content_font, FontFamily::CourierNew);
        assert_eq!(config.content_size, 12);
        assert_eq!(config.content_line_spacing, 1.5);
    }

    #[test]
    fn can_parse_overrides() {
        assert_eq!(
            "title_format=title-only".parse::<BatchField>(),
            Ok(BatchField::Base(ConfigField::TitleFormat(TitleFormat::TitleOnly)))
        );
        assert_eq!(
            "content_font = Courier New".parse::<BatchField>(),
            Ok(BatchField::Base(ConfigField::ContentFont(FontFamily::CourierNew)))
        );
        assert_eq!(
            "chapter_spacing=80".parse::<BatchField>(),
            Ok(BatchField::ChapterSpacing(80))
        );
        assert!(matches!(
            "colour=red".parse::<BatchField>(),
            Err(ConfigError::UnknownField(_))
        ));
        assert!(matches!(
            "content_size=huge".parse::<BatchField>(),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!("page_format=legal".parse::<BatchField>().is_err());
    }
}
