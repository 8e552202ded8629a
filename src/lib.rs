//! Chapter export for Grimorium manuscripts.
//!
//! Chapters are read through a [`chapters::ChapterStore`], selected by number
//! ([`selection`]), laid out according to an [`config::ExportConfig`] and
//! rendered to PDF or Word ([`render`]). While an export modal is open a
//! [`preview::PreviewSession`] keeps a debounced PDF preview current, and the
//! [`export`] flow saves the final document through the desktop shell.

pub mod chapters;
pub mod config;
pub mod debounce;
pub mod export;
pub mod modal;
pub mod preview;
pub mod render;
pub mod selection;
pub mod settings;
pub mod shell;
