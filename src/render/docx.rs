//! Word (DOCX) output.
//!
//! The document is assembled with `docx-rs`; Word does the actual layout, so
//! nothing here measures text.
//!
//! Every content line becomes its own paragraph with the configured font, size,
//! line spacing and alignment. Chapter headings use the `Heading1` style so the
//! optional table of contents field can find them; Word fills that field in when
//! the document is opened. With page breaks between chapters every chapter
//! after the first starts on a new page, otherwise chapters follow each other
//! with `chapter_spacing` after the last paragraph of each but the final one.

use crate::chapters::ChapterContent;
use crate::config::presets::{margins_twips, page_size_twips, word_font};
use crate::config::{BatchExportConfig, ContentAlignment, ExportConfig, PageNumberPosition, TitleAlignment};
use crate::render::{content_lines, format_chapter_title, Labels};
use anyhow::{Context, Result};
use docx_rs::{
    AlignmentType, BreakType, Docx, FieldCharType, Footer, InstrPAGE, InstrText, LineSpacing,
    LineSpacingType, PageMargin, Paragraph, Run, RunFonts, Style, StyleType, TableOfContents,
};
use std::io::Cursor;

const HEADING_STYLE: &str = "Heading1";
/// Twentieths of a point per point.
const TWIPS_PER_POINT: u32 = 20;
/// Line spacing unit for the `auto` rule: 240 means single spacing.
const AUTO_LINE: f32 = 240.0;
const HEADER_FOOTER_DISTANCE: i32 = 720;
const TOC_HEADING_HALF_POINTS: usize = 48;
const TOC_HEADING_AFTER: u32 = 600;
const PAGE_NUMBER_HALF_POINTS: usize = 20;
const PAGE_NUMBER_COLOR: &str = "666666";

fn fonts(name: &str) -> RunFonts {
    RunFonts::new().ascii(name).hi_ansi(name).cs(name)
}

/// A run of `text` with tabs turned into real tab characters. Control
/// characters other than tabs can't be carried by the document and are
/// dropped.
fn text_run(run: Run, text: &str) -> Run {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect();
    cleaned
        .split('\t')
        .enumerate()
        .fold(run, |run, (i, piece)| {
            let run = if i > 0 { run.add_tab() } else { run };
            if piece.is_empty() {
                run
            } else {
                run.add_text(piece)
            }
        })
}

fn content_alignment(alignment: ContentAlignment) -> AlignmentType {
    match alignment {
        ContentAlignment::Left => AlignmentType::Left,
        ContentAlignment::Center => AlignmentType::Center,
        ContentAlignment::Right => AlignmentType::Right,
        ContentAlignment::Justify => AlignmentType::Both,
    }
}

/// Paragraph and run formatting derived from a config.
struct Formatting<'c> {
    config: &'c ExportConfig,
    line: i32,
}

impl<'c> Formatting<'c> {
    fn for_config(config: &'c ExportConfig) -> Formatting<'c> {
        Formatting {
            config,
            line: (config.content_line_spacing * AUTO_LINE).round() as i32,
        }
    }

    fn title(&self, text: &str, page_break_before: bool) -> Paragraph {
        let mut run = Run::new()
            .fonts(fonts(word_font(self.config.title_font)))
            .size(self.config.title_size as usize * 2);
        if self.config.title_bold {
            run = run.bold();
        }
        let mut paragraph = Paragraph::new().style(HEADING_STYLE).keep_next(true);
        if page_break_before {
            paragraph = paragraph.page_break_before(true);
        }
        paragraph
            .line_spacing(
                LineSpacing::new()
                    .before(0)
                    .after(self.config.title_spacing * TWIPS_PER_POINT),
            )
            .align(match self.config.title_alignment {
                TitleAlignment::Left => AlignmentType::Left,
                TitleAlignment::Center => AlignmentType::Center,
            })
            .add_run(text_run(run, text))
    }

    fn line(&self, text: &str, after: u32, page_break_before: bool) -> Paragraph {
        let mut paragraph = Paragraph::new();
        if page_break_before {
            paragraph = paragraph.page_break_before(true);
        }
        let paragraph = paragraph.line_spacing(
            LineSpacing::new()
                .before(0)
                .after(after)
                .line(self.line)
                .line_rule(LineSpacingType::Auto),
        );
        // an empty paragraph keeps the line height of the document defaults
        if text.trim().is_empty() {
            return paragraph;
        }
        let run = Run::new()
            .fonts(fonts(word_font(self.config.content_font)))
            .size(self.config.content_size as usize * 2);
        paragraph
            .align(content_alignment(self.config.content_alignment))
            .add_run(text_run(run, text))
    }
}

fn page_number_footer(position: PageNumberPosition) -> Footer {
    let run = || Run::new().size(PAGE_NUMBER_HALF_POINTS).color(PAGE_NUMBER_COLOR);
    let number = Paragraph::new()
        .align(match position {
            PageNumberPosition::Left => AlignmentType::Left,
            PageNumberPosition::Center => AlignmentType::Center,
            PageNumberPosition::Right => AlignmentType::Right,
        })
        .add_run(run().add_field_char(FieldCharType::Begin, false))
        .add_run(run().add_instr_text(InstrText::PAGE(InstrPAGE::new())))
        .add_run(run().add_field_char(FieldCharType::Separate, false))
        .add_run(run().add_text("1"))
        .add_run(run().add_field_char(FieldCharType::End, false));
    Footer::new().add_paragraph(number)
}

fn page_setup(docx: Docx, config: &ExportConfig) -> Docx {
    let size = page_size_twips(config.page_format);
    let margins = margins_twips(config.margins);
    docx.page_size(size.width as u32, size.height as u32)
        .page_margin(
            PageMargin::new()
                .top(margins.top as i32)
                .bottom(margins.bottom as i32)
                .left(margins.left as i32)
                .right(margins.right as i32)
                .header(HEADER_FOOTER_DISTANCE)
                .footer(HEADER_FOOTER_DISTANCE)
                .gutter(0),
        )
        .default_fonts(fonts(word_font(config.content_font)))
        .default_size(config.content_size as usize * 2)
}

fn table_of_contents(docx: Docx, config: &ExportConfig, labels: &Labels) -> Docx {
    let heading = Run::new()
        .fonts(fonts(word_font(config.title_font)))
        .size(TOC_HEADING_HALF_POINTS)
        .bold();
    docx.add_paragraph(
        Paragraph::new()
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(TOC_HEADING_AFTER))
            .add_run(text_run(heading, &labels.table_of_contents)),
    )
    .add_table_of_contents(
        TableOfContents::new()
            .heading_styles_range(1, 3)
            .alias(labels.table_of_contents.as_str()),
    )
    .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
}

/// Build the document tree for `chapters`.
fn document(chapters: &[ChapterContent], config: &BatchExportConfig, labels: &Labels, title: &str) -> Docx {
    let formatting = Formatting::for_config(&config.base);
    let mut docx = page_setup(Docx::new(), &config.base)
        .add_style(Style::new(HEADING_STYLE, StyleType::Paragraph).name("Heading 1"))
        .custom_property("Title", title)
        .created_at(&chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    if config.base.show_page_numbers {
        docx = docx.footer(page_number_footer(config.base.page_number_position));
    }
    if config.include_table_of_contents {
        docx = table_of_contents(docx, &config.base, labels);
    }

    for (i, chapter) in chapters.iter().enumerate() {
        let is_last = i + 1 == chapters.len();
        let mut new_page = i > 0 && config.page_break_between_chapters;
        if config.show_chapter_titles {
            let title = format_chapter_title(config.base.title_format, chapter, labels);
            docx = docx.add_paragraph(formatting.title(&title, new_page));
            new_page = false;
        }

        let lines: Vec<&str> = content_lines(&chapter.content).collect();
        for (j, line) in lines.iter().enumerate() {
            let closes_chapter = j + 1 == lines.len();
            let after = if closes_chapter && !is_last && !config.page_break_between_chapters {
                config.chapter_spacing * TWIPS_PER_POINT
            } else {
                0
            };
            docx = docx.add_paragraph(formatting.line(line, after, new_page));
            new_page = false;
        }
    }
    docx
}

/// Render chapters to a DOCX package.
pub fn render(
    chapters: &[ChapterContent],
    config: &BatchExportConfig,
    labels: &Labels,
    title: &str,
) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    document(chapters, config, labels, title)
        .build()
        .pack(&mut buffer)
        .with_context(|| "Failed to write the document package")?;

    log::debug!("wrote Word document with {} chapter(s)", chapters.len());
    Ok(buffer.into_inner())
}
