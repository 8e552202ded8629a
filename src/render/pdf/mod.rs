//! PDF output.
//!
//! Pages come from [`layout::compose`] as positioned text runs; this module
//! only serialises them. Fonts are the standard Type 1 faces named in
//! [`PdfFont`], referenced but never embedded, so the output stays small and
//! every run is encoded as WinAnsi (see [`metrics::encode_winansi`]).
//!
//! ## Document Metadata
//!
//! The document info dictionary carries the document title, the creator
//! (`grimorium-export` and its version) and the creation date.

pub mod layout;
pub mod metrics;

use crate::chapters::ChapterContent;
use crate::config::presets::PdfFont;
use crate::config::BatchExportConfig;
use crate::render::Labels;
use anyhow::{bail, Result};
use chrono::{Datelike, Timelike};
use layout::PageLayout;
use pdf_writer::{Content, Date, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::BTreeMap;

/// Resource name and object id of every face the pages use.
struct FontTable {
    fonts: BTreeMap<(PdfFont, bool), (String, Ref)>,
}

impl FontTable {
    fn collect(pages: &[PageLayout], next_ref: &mut i32) -> FontTable {
        let mut fonts = BTreeMap::new();
        for run in pages.iter().flat_map(|page| page.runs.iter()) {
            let key = (run.style.font, run.style.bold);
            if !fonts.contains_key(&key) {
                let name = format!("F{}", fonts.len());
                fonts.insert(key, (name, Ref::new(*next_ref)));
                *next_ref += 1;
            }
        }
        FontTable { fonts }
    }

    fn name(&self, font: PdfFont, bold: bool) -> Option<&str> {
        self.fonts.get(&(font, bold)).map(|(name, _)| name.as_str())
    }
}

/// Render chapters to a PDF document.
pub fn render(
    chapters: &[ChapterContent],
    config: &BatchExportConfig,
    labels: &Labels,
    title: &str,
) -> Result<Vec<u8>> {
    let pages = layout::compose(chapters, config, labels);
    let frame = layout::Frame::for_config(&config.base);
    write_pdf(&pages, frame.width, frame.height, title)
}

fn write_pdf(pages: &[PageLayout], width: f32, height: f32, title: &str) -> Result<Vec<u8>> {
    if pages.is_empty() {
        bail!("Document has no pages");
    }

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let mut next_ref = 4;
    let fonts = FontTable::collect(pages, &mut next_ref);

    let page_ids: Vec<(Ref, Ref)> = pages
        .iter()
        .map(|_| {
            let ids = (Ref::new(next_ref), Ref::new(next_ref + 1));
            next_ref += 2;
            ids
        })
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for (&(font, bold), (_, font_id)) in fonts.fonts.iter() {
        pdf.type1_font(*font_id)
            .base_font(Name(font.base_font(bold).as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (page_layout, &(page_id, content_id)) in pages.iter().zip(page_ids.iter()) {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width, height));
        page.parent(page_tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for (name, font_id) in fonts.fonts.values() {
            font_dict.pair(Name(name.as_bytes()), *font_id);
        }
        font_dict.finish();
        resources.finish();
        page.finish();

        let content = page_content(page_layout, &fonts);
        pdf.stream(content_id, &content);
    }

    let now = chrono::Local::now();
    pdf.document_info(info_id)
        .title(TextStr(title))
        .creator(TextStr(concat!("grimorium-export v", env!("CARGO_PKG_VERSION"))))
        .creation_date(
            Date::new(now.year() as u16)
                .month(now.month() as u8)
                .day(now.day() as u8)
                .hour(now.hour() as u8)
                .minute(now.minute() as u8)
                .second(now.second() as u8),
        );

    log::debug!("wrote {} PDF page(s)", pages.len());
    Ok(pdf.finish())
}

fn page_content(page: &PageLayout, fonts: &FontTable) -> Vec<u8> {
    let mut content = Content::new();
    for run in page.runs.iter() {
        let Some(font_name) = fonts.name(run.style.font, run.style.bold) else {
            continue;
        };
        content.begin_text();
        content.set_font(Name(font_name.as_bytes()), run.style.size);
        content.set_fill_gray(run.style.gray);
        content.set_word_spacing(run.word_spacing);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, run.x, run.baseline]);
        content.show(Str(&metrics::encode_winansi(&run.text)));
        content.end_text();
    }
    content.finish()
}
