use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use grimorium_export::config::BatchField;
use grimorium_export::render::DocumentFormat;
use grimorium_export::selection::ChapterRange;
use grimorium_export::settings::SETTINGS_FILE;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates a grimorium-export.toml settings file
    Config,
    /// Lists the manuscript's chapters
    Chapters,
    /// Renders a PDF preview of a chapter or a range of chapters
    Preview {
        #[clap(flatten)]
        selection: Selection,
        /// Where to write the preview
        #[clap(long, default_value = "preview.pdf")]
        out: PathBuf,
        /// Keep running and regenerate the preview whenever the settings or
        /// the manuscript change
        #[clap(long)]
        watch: bool,
    },
    /// Exports a chapter or a range of chapters to PDF or Word
    Export {
        #[clap(flatten)]
        selection: Selection,
        #[clap(long, value_enum, default_value_t = FormatArg::Pdf)]
        format: FormatArg,
        /// Write here instead of asking for a destination
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Selection {
    /// Number of a single chapter
    #[clap(long, conflicts_with_all = ["from", "to"], required_unless_present_all = ["from", "to"])]
    pub chapter: Option<u32>,
    /// First chapter number of a batch
    #[clap(long, requires = "to")]
    pub from: Option<u32>,
    /// Last chapter number of a batch
    #[clap(long, requires = "from")]
    pub to: Option<u32>,
    /// Override an export setting for this run, e.g. `--set content_size=14`
    #[clap(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<BatchField>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Chapter(u32),
    Batch(ChapterRange),
}

impl Selection {
    pub fn target(&self) -> Result<Target> {
        match (self.chapter, self.from, self.to) {
            (Some(number), None, None) => Ok(Target::Chapter(number)),
            (None, Some(from), Some(to)) => Ok(Target::Batch(ChapterRange::new(from, to))),
            _ => Err(anyhow!("Select either --chapter or both --from and --to")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Word,
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Word => DocumentFormat::Word,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// More log output: -v for info, -vv for debug
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Settings file to use
    #[clap(long, global = true, default_value = SETTINGS_FILE, env = "GRIMORIUM_SETTINGS")]
    pub settings: PathBuf,
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;
    use grimorium_export::config::ConfigField;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn can_parse_a_batch_export() {
        let cli = Cli::try_parse_from([
            "grimorium-export",
            "-vv",
            "export",
            "--from",
            "2",
            "--to",
            "5",
            "--format",
            "word",
            "--set",
            "content_size=14",
        ])
        .expect("can parse");
        assert_eq!(cli.verbose, 2);
        let Commands::Export {
            selection, format, ..
        } = cli.command
        else {
            panic!("expected export");
        };
        assert_eq!(format, FormatArg::Word);
        assert_eq!(
            selection.target().expect("has a target"),
            Target::Batch(ChapterRange::new(2, 5))
        );
        assert_eq!(
            selection.overrides,
            vec![BatchField::Base(ConfigField::ContentSize(14))]
        );
    }

    #[test]
    fn chapter_and_range_are_exclusive() {
        assert!(Cli::try_parse_from([
            "grimorium-export",
            "preview",
            "--chapter",
            "1",
            "--from",
            "1",
            "--to",
            "2"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["grimorium-export", "preview", "--from", "1"]).is_err());
        assert!(Cli::try_parse_from(["grimorium-export", "preview"]).is_err());
    }

    #[test]
    fn bad_overrides_are_rejected() {
        assert!(Cli::try_parse_from([
            "grimorium-export",
            "preview",
            "--chapter",
            "1",
            "--set",
            "title_size=big"
        ])
        .is_err());
    }
}
