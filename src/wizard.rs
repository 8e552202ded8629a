//! Interactive wizard for creating `grimorium-export.toml`.
//!
//! The wizard asks for the manuscript file and the export defaults every new
//! export session starts from, then writes the settings file.

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input};
use grimorium_export::config::{
    ContentAlignment, FontFamily, MarginPreset, PageFormat, PageNumberPosition, TitleAlignment,
    TitleFormat, CHAPTER_SPACING_RANGE, SINGLE_CONTENT_SIZE_RANGE, TITLE_SIZE_RANGE,
};
use grimorium_export::settings::Settings;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

fn select<T: Copy + PartialEq + Display>(
    theme: &ColorfulTheme,
    prompt: &str,
    options: &[T],
    current: T,
) -> Result<T> {
    let default = options.iter().position(|o| *o == current).unwrap_or(0);
    let index = FuzzySelect::with_theme(theme)
        .with_prompt(prompt)
        .items(options)
        .default(default)
        .interact()
        .with_context(|| format!("Failed to obtain {}", prompt.to_lowercase()))?;
    Ok(options[index])
}

fn size(theme: &ColorfulTheme, prompt: &str, default: u32, range: RangeInclusive<u32>) -> Result<u32> {
    Input::with_theme(theme)
        .with_prompt(format!("{prompt} ({}-{})", range.start(), range.end()))
        .default(default)
        .validate_with(|value: &u32| -> Result<(), String> {
            if range.contains(value) {
                Ok(())
            } else {
                Err(format!("must be between {} and {}", range.start(), range.end()))
            }
        })
        .interact()
        .with_context(|| format!("Failed to obtain {}", prompt.to_lowercase()))
}

/// Run the interactive settings wizard and write the result to `path`.
pub fn run(path: &Path) -> Result<()> {
    let theme = ColorfulTheme {
        ..ColorfulTheme::default()
    };

    let manuscript: String = Input::with_theme(&theme)
        .with_prompt("Manuscript file")
        .default("book.json".to_string())
        .interact()
        .with_context(|| "Failed to obtain manuscript path")?;
    let manuscript = PathBuf::from(manuscript);
    let base = path.parent().unwrap_or(Path::new(""));
    if !base.join(&manuscript).is_file() {
        println!(
            "{} '{}' doesn't exist yet",
            console::style("Note:").yellow(),
            manuscript.display()
        );
    }

    let mut settings = Settings::new(manuscript);
    let export = &mut settings.export;

    export.page_format = select(&theme, "Page format", PageFormat::all(), export.page_format)?;
    export.margins = select(&theme, "Margins", MarginPreset::all(), export.margins)?;
    export.title_format = select(&theme, "Chapter titles", TitleFormat::all(), export.title_format)?;
    export.title_font = select(&theme, "Title font", FontFamily::all(), export.title_font)?;
    export.title_size = size(&theme, "Title size in points", export.title_size, TITLE_SIZE_RANGE)?;
    export.title_bold = Confirm::with_theme(&theme)
        .with_prompt("Bold titles?")
        .default(export.title_bold)
        .interact()?;
    export.title_alignment = if Confirm::with_theme(&theme)
        .with_prompt("Center titles?")
        .default(export.title_alignment == TitleAlignment::Center)
        .interact()?
    {
        TitleAlignment::Center
    } else {
        TitleAlignment::Left
    };

    export.content_font = select(&theme, "Body font", FontFamily::all(), export.content_font)?;
    // the defaults also seed single-chapter exports, which take the narrower
    // size range and only left or justified text
    export.content_size = size(
        &theme,
        "Body size in points",
        export.content_size,
        SINGLE_CONTENT_SIZE_RANGE,
    )?;
    export.content_alignment = select(
        &theme,
        "Body alignment",
        &[ContentAlignment::Left, ContentAlignment::Justify],
        export.content_alignment,
    )?;

    export.show_page_numbers = Confirm::with_theme(&theme)
        .with_prompt("Number pages?")
        .default(export.show_page_numbers)
        .interact()?;
    if export.show_page_numbers {
        let positions = ["left", "center", "right"];
        let index = FuzzySelect::with_theme(&theme)
            .with_prompt("Page number position")
            .items(&positions)
            .default(1)
            .interact()?;
        export.page_number_position = match index {
            0 => PageNumberPosition::Left,
            2 => PageNumberPosition::Right,
            _ => PageNumberPosition::Center,
        };
    }

    let batch = &mut settings.batch;
    batch.include_table_of_contents = Confirm::with_theme(&theme)
        .with_prompt("Start batch exports with a table of contents?")
        .default(batch.include_table_of_contents)
        .interact()?;
    batch.page_break_between_chapters = Confirm::with_theme(&theme)
        .with_prompt("Start every chapter on a new page?")
        .default(batch.page_break_between_chapters)
        .interact()?;
    if !batch.page_break_between_chapters {
        batch.chapter_spacing = size(
            &theme,
            "Space between chapters in points",
            batch.chapter_spacing,
            CHAPTER_SPACING_RANGE,
        )?;
    }
    batch.include_empty_chapters = Confirm::with_theme(&theme)
        .with_prompt("Include empty chapters in batch exports?")
        .default(batch.include_empty_chapters)
        .interact()?;

    settings.labels.chapter = Input::with_theme(&theme)
        .with_prompt("Word used before chapter numbers")
        .default(settings.labels.chapter.clone())
        .interact()
        .with_context(|| "Failed to obtain chapter label")?;

    if path.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!(
                "{} already exists, do you want to override it?",
                path.display()
            ))
            .interact()?
    {
        let contents = toml::to_string_pretty(&settings)
            .with_context(|| "Failed to convert settings to TOML")?;
        println!("Settings:");
        println!("{contents}");
    } else {
        settings.save(path)?;
        println!("{} written!", path.display());
    }

    Ok(())
}
