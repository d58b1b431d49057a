//! Case file loading and saving

use crate::error::{ReportError, Result};
use roof_report_common::types::CaseFile;
use std::path::{Path, PathBuf};

pub fn load(path: &Path) -> Result<CaseFile> {
    if !path.exists() {
        return Err(ReportError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let case = CaseFile::from_json(&content)?;
    tracing::debug!(path = %path.display(), photos = case.photos.len(), "loaded case file");
    Ok(case)
}

/// Load the case, or start an empty one when the file does not exist yet
pub fn load_or_default(path: &Path) -> Result<CaseFile> {
    if path.exists() { load(path) } else { Ok(CaseFile::default()) }
}

pub fn save(case: &CaseFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, case.to_json()?)?;
    tracing::debug!(path = %path.display(), "saved case file");
    Ok(())
}

/// Directory relative image paths are resolved against
pub fn base_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Rewrite relative local image URIs as absolute paths under `base_dir`.
/// URLs and data URIs are left alone.
pub fn resolve_image_paths(case: &mut CaseFile, base_dir: &Path) {
    for photo in &mut case.photos {
        if is_remote_or_inline(&photo.image_uri) || photo.image_uri.is_empty() {
            continue;
        }
        let path = Path::new(&photo.image_uri);
        if path.is_relative() {
            if let Ok(abs_path) = base_dir.join(path).canonicalize() {
                photo.image_uri = abs_path.to_string_lossy().to_string();
            }
        }
    }
}

pub fn is_remote_or_inline(uri: &str) -> bool {
    uri.contains("://") || uri.starts_with("data:")
}
