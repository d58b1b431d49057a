//! Error cases

use roof_report::error::ReportError;
use roof_report::{case, intake};
use roof_report_common::Error;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_scan_nonexistent_folder() {
    let result = intake::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(ReportError::FolderNotFound(_))));
}

#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = intake::scan_folder(dir.path()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_load_missing_case() {
    let result = case::load(Path::new("/nonexistent/case.json"));
    assert!(matches!(result, Err(ReportError::FileNotFound(_))));
}

#[test]
fn test_load_invalid_case() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("case.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = case::load(&path);
    assert!(matches!(result, Err(ReportError::Common(Error::Json(_)))));
}

#[test]
fn test_error_display() {
    let errors = vec![
        ReportError::Config("bad value".to_string()),
        ReportError::FileNotFound("case.json".to_string()),
        ReportError::PdfGeneration("font".to_string()),
        ReportError::Share("report.pdf".to_string(), "exit status: 1".to_string()),
        ReportError::Common(Error::PhotoApproved("7".to_string())),
    ];

    for error in errors {
        let message = error.to_string();
        assert!(!message.is_empty(), "empty message for {:?}", error);
    }

    let approved = ReportError::Common(Error::PhotoApproved("7".to_string()));
    assert_eq!(approved.to_string(), "Photo 7 is approved; its label can no longer be edited");
}
