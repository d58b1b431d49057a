pub mod html;
pub mod pdf;

use crate::cli::ExportFormat;
use crate::error::{ReportError, Result};
use roof_report_common::report::Document;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn output_path_for_format(output: &Path, stem: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", stem, extension))
    } else {
        output.with_extension(extension)
    }
}

/// Target files for `format`, HTML first
pub fn output_paths(output: &Path, stem: &str, format: ExportFormat) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if format.includes_html() {
        paths.push(output_path_for_format(output, stem, "html"));
    }
    if format.includes_pdf() {
        paths.push(output_path_for_format(output, stem, "pdf"));
    }
    paths
}

/// Turns an assembled document into files.
///
/// Holds the document and its HTML so a failed export can be attempted again
/// without re-assembly. Nothing is retried automatically.
#[derive(Clone)]
pub struct ExportAdapter {
    document: Arc<Document>,
    html: Arc<String>,
}

impl ExportAdapter {
    pub fn new(document: Document) -> Self {
        let html = document.to_html();
        tracing::info!(
            sections = document.sections.len(),
            photos = document.photo_count(),
            bytes = html.len(),
            "document assembled"
        );
        Self {
            document: Arc::new(document),
            html: Arc::new(html),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Write every file `format` asks for. Returns the written paths.
    pub async fn export(
        &self,
        format: ExportFormat,
        output: &Path,
        stem: &str,
        photos_per_page: u8,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for path in output_paths(output, stem, format) {
            let is_pdf = path.extension().is_some_and(|e| e == "pdf");
            if is_pdf {
                println!("- Generating PDF... ({} photos per page)", photos_per_page);
                self.write_pdf(path.clone(), photos_per_page).await?;
            } else {
                println!("- Writing HTML...");
                self.write_html(path.clone()).await?;
            }
            println!("✔ Exported: {}", path.display());
            tracing::info!(path = %path.display(), "export written");
            written.push(path);
        }
        Ok(written)
    }

    pub async fn write_html(&self, path: PathBuf) -> Result<()> {
        let html = Arc::clone(&self.html);
        tokio::task::spawn_blocking(move || html::write_html(&html, &path))
            .await
            .map_err(|e| ReportError::Export(e.to_string()))?
    }

    pub async fn write_pdf(&self, path: PathBuf, photos_per_page: u8) -> Result<()> {
        let document = Arc::clone(&self.document);
        tokio::task::spawn_blocking(move || pdf::generate_pdf(&document, &path, photos_per_page))
            .await
            .map_err(|e| ReportError::Export(e.to_string()))?
    }
}

/// Hand a file to the platform's default viewer
pub async fn open_file(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        tokio::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        tokio::process::Command::new("xdg-open")
    };

    let status = command
        .arg(path)
        .status()
        .await
        .map_err(|e| ReportError::Share(path.display().to_string(), e.to_string()))?;

    if status.success() {
        Ok(())
    } else {
        Err(ReportError::Share(path.display().to_string(), status.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths_for_directory() {
        let dir = tempfile::tempdir().unwrap();
        let paths = output_paths(dir.path(), "report", ExportFormat::Both);
        assert_eq!(paths, vec![dir.path().join("report.html"), dir.path().join("report.pdf")]);
    }

    #[test]
    fn test_output_paths_for_file() {
        let paths = output_paths(Path::new("out/claim-42.pdf"), "report", ExportFormat::Both);
        assert_eq!(paths, vec![PathBuf::from("out/claim-42.html"), PathBuf::from("out/claim-42.pdf")]);

        let paths = output_paths(Path::new("out/claim-42.pdf"), "report", ExportFormat::Html);
        assert_eq!(paths, vec![PathBuf::from("out/claim-42.html")]);
    }
}
