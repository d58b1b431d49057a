use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("No images found in: {0}")]
    NoImagesFound(String),

    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Could not open {0}: {1}")]
    Share(String, String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] roof_report_common::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
