//! Pagination.
//!
//! Turns chapters and a config into a list of pages, each a list of positioned
//! text runs in PDF coordinates (origin bottom-left, points). Nothing here
//! touches the PDF writer, so page counts and positions can be checked directly.
//!
//! Text flows top to bottom inside the frame given by the page size and margin
//! preset. The bottom margin is always widened by [`PAGE_NUMBER_BAND`] so body
//! text never collides with the page number, whether or not numbers are shown.
//! A line that doesn't fit moves to a new page; spacing that doesn't fit is
//! dropped at the page end.

use super::metrics::width_of_text;
use crate::chapters::ChapterContent;
use crate::config::presets::{margins_pt, page_size_pt, pdf_font, PdfFont};
use crate::config::{BatchExportConfig, ContentAlignment, ExportConfig, PageNumberPosition, TitleAlignment};
use crate::render::{content_lines, format_chapter_title, Labels};

/// Extra bottom margin reserved for page numbers.
pub const PAGE_NUMBER_BAND: f32 = 30.0;
pub const PAGE_NUMBER_SIZE: f32 = 10.0;
/// Distance from the bottom page edge to the bottom of the page number.
pub const PAGE_NUMBER_OFFSET: f32 = 20.0;
/// #666666
pub const PAGE_NUMBER_GRAY: f32 = 0.4;

pub const TOC_HEADING_SIZE: f32 = 24.0;
pub const TOC_HEADING_SPACING: f32 = 30.0;
pub const TOC_ENTRY_SIZE: f32 = 12.0;
pub const TOC_ENTRY_SPACING: f32 = 10.0;

/// Line height of headings as a multiple of their size.
const HEADING_LEADING: f32 = 1.2;
/// Share of the font size above the baseline.
const ASCENT: f32 = 0.8;
/// Share of the font size below the baseline.
const DESCENT: f32 = 0.2;

/// Page geometry in points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Frame {
    pub fn for_config(config: &ExportConfig) -> Frame {
        let size = page_size_pt(config.page_format);
        let margins = margins_pt(config.margins);
        Frame {
            width: size.width,
            height: size.height,
            left: margins.left,
            right: margins.right,
            top: margins.top,
            bottom: margins.bottom + PAGE_NUMBER_BAND,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.left - self.right
    }

    /// Y of the top edge of the text area.
    fn top_y(&self) -> f32 {
        self.height - self.top
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font: PdfFont,
    pub bold: bool,
    pub size: f32,
    /// Fill colour, 0 black to 1 white
    pub gray: f32,
}

impl TextStyle {
    pub fn new(font: PdfFont, bold: bool, size: f32) -> TextStyle {
        TextStyle {
            font,
            bold,
            size,
            gray: 0.0,
        }
    }

    pub fn width_of(&self, text: &str) -> f32 {
        width_of_text(text, self.font, self.bold, self.size)
    }
}

/// A line of text placed on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
    pub style: TextStyle,
    /// Extra space added to every space character, used for justification
    pub word_spacing: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageLayout {
    pub runs: Vec<TextRun>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl From<ContentAlignment> for Align {
    fn from(alignment: ContentAlignment) -> Self {
        match alignment {
            ContentAlignment::Left => Align::Left,
            ContentAlignment::Center => Align::Center,
            ContentAlignment::Right => Align::Right,
            ContentAlignment::Justify => Align::Justify,
        }
    }
}

impl From<TitleAlignment> for Align {
    fn from(alignment: TitleAlignment) -> Self {
        match alignment {
            TitleAlignment::Left => Align::Left,
            TitleAlignment::Center => Align::Center,
        }
    }
}

/// Break a paragraph into lines no wider than `width`. Whitespace between words
/// collapses to single spaces; a word wider than the line is split between
/// characters.
pub fn wrap(text: &str, style: &TextStyle, width: f32) -> Vec<String> {
    let space = style.width_of(" ");
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = style.width_of(word);
        if !line.is_empty() && line_width + space + word_width <= width {
            line.push(' ');
            line.push_str(word);
            line_width += space + word_width;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }

        if word_width <= width {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        // hard-break words that can't fit on any line
        line_width = 0.0;
        for c in word.chars() {
            let mut buf = [0u8; 4];
            let c_width = style.width_of(c.encode_utf8(&mut buf));
            if !line.is_empty() && line_width + c_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            line.push(c);
            line_width += c_width;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Accumulates pages while text flows down the frame.
pub struct Layout {
    frame: Frame,
    pages: Vec<PageLayout>,
    /// Y of the top of the next line on the current page
    cursor: f32,
}

impl Layout {
    pub fn new(frame: Frame) -> Layout {
        Layout {
            frame,
            pages: vec![PageLayout::default()],
            cursor: frame.top_y(),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Index of the page currently being filled.
    pub fn current_page(&self) -> usize {
        self.pages.len() - 1
    }

    fn page_is_fresh(&self) -> bool {
        self.cursor >= self.frame.top_y()
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.cursor = self.frame.top_y();
    }

    /// Start a new page unless nothing has been placed on the current one yet.
    pub fn page_break(&mut self) {
        if !self.page_is_fresh() {
            self.new_page();
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor - height < self.frame.bottom && !self.page_is_fresh() {
            self.new_page();
        }
    }

    /// Vertical space, clipped at the bottom of the page.
    pub fn gap(&mut self, height: f32) {
        self.cursor = (self.cursor - height).max(self.frame.bottom);
    }

    /// An empty line that still takes up its height.
    pub fn blank_line(&mut self, line_height: f32) {
        self.ensure_room(line_height);
        self.cursor -= line_height;
    }

    fn place(&mut self, text: String, x: f32, style: TextStyle, line_height: f32, word_spacing: f32) {
        let half_leading = (line_height - style.size) / 2.0;
        let baseline = self.cursor - half_leading - style.size * ASCENT;
        let page = self.pages.len() - 1;
        self.pages[page].runs.push(TextRun {
            x,
            baseline,
            text,
            style,
            word_spacing,
        });
        self.cursor -= line_height;
    }

    fn paragraph(&mut self, text: &str, style: TextStyle, align: Align, line_height: f32, space_after: f32) {
        let width = self.frame.content_width();
        let lines = wrap(text, &style, width);
        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            self.ensure_room(line_height);
            let line_width = style.width_of(&line);
            let spaces = line.matches(' ').count();
            let is_last = i + 1 == count;

            let (x, word_spacing) = match align {
                Align::Left => (self.frame.left, 0.0),
                Align::Center => (self.frame.left + (width - line_width) / 2.0, 0.0),
                Align::Right => (self.frame.left + width - line_width, 0.0),
                Align::Justify if !is_last && spaces > 0 => {
                    (self.frame.left, (width - line_width) / spaces as f32)
                }
                Align::Justify => (self.frame.left, 0.0),
            };
            self.place(line, x, style, line_height, word_spacing);
        }
        if count > 0 {
            self.gap(space_after);
        }
    }

    /// A contents line: the entry on the left, its page label flush right. The
    /// entry wraps before `gutter` so the label always fits.
    fn leader_entry(&mut self, entry: &str, label: &str, style: TextStyle, gutter: f32, space_after: f32) {
        let line_height = style.size * HEADING_LEADING;
        let lines = wrap(entry, &style, self.frame.content_width() - gutter);
        let count = lines.len().max(1);
        let label_x = self.frame.width - self.frame.right - style.width_of(label);
        for i in 0..count {
            self.ensure_room(line_height);
            let half_leading = (line_height - style.size) / 2.0;
            let baseline = self.cursor - half_leading - style.size * ASCENT;
            let page = self.pages.len() - 1;
            if let Some(line) = lines.get(i) {
                self.pages[page].runs.push(TextRun {
                    x: self.frame.left,
                    baseline,
                    text: line.clone(),
                    style,
                    word_spacing: 0.0,
                });
            }
            if i + 1 == count {
                self.pages[page].runs.push(TextRun {
                    x: label_x,
                    baseline,
                    text: label.to_string(),
                    style: TextStyle {
                        gray: PAGE_NUMBER_GRAY,
                        ..style
                    },
                    word_spacing: 0.0,
                });
            }
            self.cursor -= line_height;
        }
        self.gap(space_after);
    }

    pub fn finish(self) -> Vec<PageLayout> {
        self.pages
    }
}

/// Styles and spacing derived from a config.
struct Typography {
    title: TextStyle,
    title_align: Align,
    title_spacing: f32,
    content: TextStyle,
    content_align: Align,
    line_height: f32,
}

impl Typography {
    fn for_config(config: &ExportConfig) -> Typography {
        let content_size = config.content_size as f32;
        Typography {
            title: TextStyle::new(
                pdf_font(config.title_font),
                config.title_bold,
                config.title_size as f32,
            ),
            title_align: config.title_alignment.into(),
            title_spacing: config.title_spacing as f32,
            content: TextStyle::new(pdf_font(config.content_font), false, content_size),
            content_align: config.content_alignment.into(),
            line_height: content_size * config.content_line_spacing,
        }
    }
}

/// Lay out chapters into pages, returning them with the page index each chapter
/// starts on.
fn chapter_pages(
    chapters: &[ChapterContent],
    config: &BatchExportConfig,
    labels: &Labels,
    frame: Frame,
) -> (Vec<PageLayout>, Vec<usize>) {
    let typography = Typography::for_config(&config.base);
    let mut layout = Layout::new(frame);
    let mut starts = Vec::with_capacity(chapters.len());

    for (i, chapter) in chapters.iter().enumerate() {
        if i > 0 && config.page_break_between_chapters {
            layout.page_break();
        }
        starts.push(layout.current_page());

        if config.show_chapter_titles {
            let title = format_chapter_title(config.base.title_format, chapter, labels);
            layout.paragraph(
                &title,
                typography.title,
                typography.title_align,
                typography.title.size * HEADING_LEADING,
                typography.title_spacing,
            );
        }

        for line in content_lines(&chapter.content) {
            if line.trim().is_empty() {
                layout.blank_line(typography.line_height);
            } else {
                layout.paragraph(
                    line,
                    typography.content,
                    typography.content_align,
                    typography.line_height,
                    0.0,
                );
            }
        }

        let is_last = i + 1 == chapters.len();
        if !config.page_break_between_chapters && !is_last {
            layout.gap(config.chapter_spacing as f32);
        }
    }

    (layout.finish(), starts)
}

/// Lay out the table of contents. Page labels are numbered as if the contents
/// pages come first, which is where they end up.
fn contents_pages(
    chapters: &[ChapterContent],
    starts: &[usize],
    config: &BatchExportConfig,
    labels: &Labels,
    frame: Frame,
    toc_pages: usize,
) -> Vec<PageLayout> {
    let heading_font = pdf_font(config.base.title_font);
    let entry_font = pdf_font(config.base.content_font);
    let entry_style = TextStyle::new(entry_font, false, TOC_ENTRY_SIZE);
    // page labels are reserved a fixed width so that the number of contents
    // pages doesn't depend on the labels
    let gutter = entry_style.width_of(" 00000");

    let mut layout = Layout::new(frame);
    layout.paragraph(
        &labels.table_of_contents,
        TextStyle::new(heading_font, true, TOC_HEADING_SIZE),
        Align::Center,
        TOC_HEADING_SIZE * HEADING_LEADING,
        TOC_HEADING_SPACING,
    );
    for (chapter, start) in chapters.iter().zip(starts) {
        let entry = format_chapter_title(config.base.title_format, chapter, labels);
        let label = (toc_pages + start + 1).to_string();
        layout.leader_entry(&entry, &label, entry_style, gutter, TOC_ENTRY_SPACING);
    }
    layout.finish()
}

/// Number every page.
fn number_pages(pages: &mut [PageLayout], frame: &Frame, config: &ExportConfig) {
    let style = TextStyle {
        gray: PAGE_NUMBER_GRAY,
        ..TextStyle::new(PdfFont::Helvetica, false, PAGE_NUMBER_SIZE)
    };
    let baseline = PAGE_NUMBER_OFFSET + PAGE_NUMBER_SIZE * DESCENT;
    for (i, page) in pages.iter_mut().enumerate() {
        let text = (i + 1).to_string();
        let width = style.width_of(&text);
        let x = match config.page_number_position {
            PageNumberPosition::Left => frame.left,
            PageNumberPosition::Center => frame.left + (frame.content_width() - width) / 2.0,
            PageNumberPosition::Right => frame.width - frame.right - width,
        };
        page.runs.push(TextRun {
            x,
            baseline,
            text,
            style,
            word_spacing: 0.0,
        });
    }
}

/// Lay out a whole document: contents (when asked for), chapters, page numbers.
pub fn compose(chapters: &[ChapterContent], config: &BatchExportConfig, labels: &Labels) -> Vec<PageLayout> {
    let frame = Frame::for_config(&config.base);
    let (body, starts) = chapter_pages(chapters, config, labels, frame);

    let mut pages = if config.include_table_of_contents {
        // a first pass only to learn how many pages the contents take
        let toc_pages = contents_pages(chapters, &starts, config, labels, frame, 0).len();
        let mut pages = contents_pages(chapters, &starts, config, labels, frame, toc_pages);
        pages.extend(body);
        pages
    } else {
        body
    };

    if config.base.show_page_numbers {
        number_pages(&mut pages, &frame, &config.base);
    }
    pages
}
