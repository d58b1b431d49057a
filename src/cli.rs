use clap::{Parser, Subcommand};
use roof_report_common::report::InspectorRole;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roof-report")]
#[command(about = "Roof inspection photo annotation and report generation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a folder of photos into a case file
    Intake {
        /// Photo folder
        #[arg(required = true)]
        folder: PathBuf,

        /// Section the photos belong to (e.g. "Front Slope")
        #[arg(short, long)]
        section: String,

        /// Case file (default: <folder>/case.json)
        #[arg(short, long)]
        case: Option<PathBuf>,

        /// Keep the original images instead of squaring them
        #[arg(long)]
        no_resize: bool,
    },

    /// Review labels and approve photos
    Review {
        #[arg(required = true)]
        case: PathBuf,
    },

    /// Print the questionnaire built from approved photos
    Questionnaire {
        #[arg(required = true)]
        case: PathBuf,
    },

    /// Write a quick HTML preview grouped by umbrella sections
    Preview {
        #[arg(required = true)]
        case: PathBuf,

        /// Output file (default: <case dir>/preview.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the report and export it
    Export {
        /// Case file
        #[arg(required = true)]
        case: PathBuf,

        /// Output format (html/pdf/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Photos per PDF page (2/3)
        #[arg(short, long)]
        photos_per_page: Option<u8>,

        /// Leave annotation overlays out of the report
        #[arg(long)]
        no_annotations: bool,

        /// Override the inspector role
        #[arg(long)]
        role: Option<InspectorRole>,

        /// Open the result with the system viewer
        #[arg(long)]
        open: bool,
    },

    /// Show or edit configuration
    Config {
        #[arg(long)]
        set_inspector: Option<String>,

        #[arg(long)]
        set_role: Option<InspectorRole>,

        #[arg(long)]
        set_disclaimer: Option<String>,

        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Pdf,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn includes_html(&self) -> bool {
        matches!(self, ExportFormat::Html | ExportFormat::Both)
    }

    pub fn includes_pdf(&self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Both)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use html, pdf, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Html => write!(f, "html"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_parse() {
        assert_eq!("PDF".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert_eq!("htm".parse::<ExportFormat>(), Ok(ExportFormat::Html));
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert!(ExportFormat::Both.includes_html() && ExportFormat::Both.includes_pdf());
        assert!(!ExportFormat::Html.includes_pdf());
    }

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::try_parse_from([
            "roof-report", "export", "case.json", "-f", "pdf", "--role", "homeowner", "--open",
        ])
        .unwrap();
        match cli.command {
            Commands::Export { format, role, open, .. } => {
                assert_eq!(format, ExportFormat::Pdf);
                assert_eq!(role, Some(InspectorRole::Homeowner));
                assert!(open);
            }
            _ => panic!("expected export"),
        }
    }
}
