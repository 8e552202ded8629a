//! Fixed dimensions behind the page format and margin presets.
//!
//! The same preset resolves to different units depending on who consumes it:
//! on-screen preview surfaces work in CSS pixels at 96 DPI, the PDF renderer in
//! points and the Word renderer in twips. The values are not derived from one
//! another; they are the numbers each surface has always used, so a PDF and a
//! DOCX of the same config can differ by a few points of margin.

use super::{FontFamily, MarginPreset, PageFormat};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Page size in pixels at 96 DPI.
pub fn page_size_px(format: PageFormat) -> PageSize {
    match format {
        PageFormat::A4 => PageSize {
            width: 794.0,
            height: 1123.0,
        },
        PageFormat::Letter => PageSize {
            width: 816.0,
            height: 1056.0,
        },
    }
}

/// Page size in PDF points (1/72 in).
pub fn page_size_pt(format: PageFormat) -> PageSize {
    match format {
        PageFormat::A4 => PageSize {
            width: 595.0,
            height: 842.0,
        },
        PageFormat::Letter => PageSize {
            width: 612.0,
            height: 792.0,
        },
    }
}

/// Page size in twips (1/1440 in).
pub fn page_size_twips(format: PageFormat) -> PageSize {
    match format {
        PageFormat::A4 => PageSize {
            width: inches_to_twips(8.27),
            height: inches_to_twips(11.69),
        },
        PageFormat::Letter => PageSize {
            width: inches_to_twips(8.5),
            height: inches_to_twips(11.0),
        },
    }
}

pub fn margins_px(preset: MarginPreset) -> Margins {
    match preset {
        MarginPreset::Editorial => Margins {
            top: 95.0,
            bottom: 76.0,
            left: 113.0,
            right: 113.0,
        },
        MarginPreset::Narrow => Margins::all(48.0),
        MarginPreset::Wide => Margins {
            top: 95.0,
            bottom: 95.0,
            left: 142.0,
            right: 142.0,
        },
    }
}

pub fn margins_pt(preset: MarginPreset) -> Margins {
    match preset {
        MarginPreset::Editorial => Margins {
            top: 71.0,
            bottom: 57.0,
            left: 85.0,
            right: 85.0,
        },
        MarginPreset::Narrow => Margins::all(36.0),
        MarginPreset::Wide => Margins {
            top: 71.0,
            bottom: 71.0,
            left: 106.0,
            right: 106.0,
        },
    }
}

pub fn margins_twips(preset: MarginPreset) -> Margins {
    match preset {
        MarginPreset::Editorial => Margins {
            top: inches_to_twips(1.0),
            bottom: inches_to_twips(0.8),
            left: inches_to_twips(1.2),
            right: inches_to_twips(1.2),
        },
        MarginPreset::Narrow => Margins::all(inches_to_twips(0.5)),
        MarginPreset::Wide => Margins {
            top: inches_to_twips(1.0),
            bottom: inches_to_twips(1.0),
            left: inches_to_twips(1.5),
            right: inches_to_twips(1.5),
        },
    }
}

impl Margins {
    pub fn all(value: f32) -> Margins {
        Margins {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

pub fn inches_to_twips(inches: f32) -> f32 {
    (inches * 1440.0).round()
}

/// The standard PDF font families the PDF renderer can draw without embedding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PdfFont {
    Helvetica,
    Times,
    Courier,
}

impl PdfFont {
    /// PostScript name of the regular or bold face.
    pub fn base_font(&self, bold: bool) -> &'static str {
        match (self, bold) {
            (PdfFont::Helvetica, false) => "Helvetica",
            (PdfFont::Helvetica, true) => "Helvetica-Bold",
            (PdfFont::Times, false) => "Times-Roman",
            (PdfFont::Times, true) => "Times-Bold",
            (PdfFont::Courier, false) => "Courier",
            (PdfFont::Courier, true) => "Courier-Bold",
        }
    }
}

pub fn pdf_font(family: FontFamily) -> PdfFont {
    match family {
        // Inter is not a standard PDF font
        FontFamily::Inter | FontFamily::Arial | FontFamily::SansSerif => PdfFont::Helvetica,
        FontFamily::TimesNewRoman => PdfFont::Times,
        FontFamily::CourierNew => PdfFont::Courier,
    }
}

pub fn word_font(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Inter | FontFamily::SansSerif => "Calibri",
        FontFamily::TimesNewRoman => "Times New Roman",
        FontFamily::CourierNew => "Courier New",
        FontFamily::Arial => "Arial",
    }
}
