//! Export core modules shared by the CLI and the desktop editor.

pub mod pdf_core;
