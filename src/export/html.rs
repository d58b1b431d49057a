use crate::error::Result;
use std::path::Path;

/// Write an assembled HTML document, creating parent folders as needed
pub fn write_html(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}
