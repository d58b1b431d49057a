use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use roof_report_common::types::CaseFile;

pub fn load_case(path: &Path) -> Result<CaseFile> {
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let case = CaseFile::from_json(&content).with_context(|| format!("parse {}", path.display()))?;
    Ok(case)
}

pub fn save_case(path: &Path, case: &CaseFile) -> Result<()> {
    let content = case.to_json()?;
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roof_report_common::annotation::{Annotation, Point};
    use roof_report_common::types::Photo;

    #[test]
    fn test_case_round_trip() {
        let path = std::env::temp_dir().join("roof-report-desktop-io-test.json");
        let mut case = CaseFile::default();
        case.photos.push(
            Photo::captured("1", "a.jpg", "Front Slope")
                .with_annotations(vec![Annotation::arrow(Point::new(1.0, 2.0), Point::new(3.0, 4.0))]),
        );
        save_case(&path, &case).unwrap();
        let loaded = load_case(&path).unwrap();
        assert_eq!(loaded.photos, case.photos);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_has_context() {
        let err = load_case(Path::new("/nonexistent/case.json")).unwrap_err();
        assert!(err.to_string().contains("read /nonexistent/case.json"));
    }
}
