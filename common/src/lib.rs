//! Roof Report Common Library
//!
//! Photo model, annotation geometry, grouping, questionnaire and report
//! assembly shared by the CLI and the desktop editor.

pub mod annotation;
pub mod error;
pub mod export;
pub mod layout;
pub mod markup;
pub mod overlay;
pub mod questionnaire;
pub mod report;
pub mod section;
pub mod types;

pub use annotation::{arrowhead, Annotation, FrameSize, Point, Primitive, TextAnchor};
pub use error::{Error, Result};
pub use layout::PdfLayout;
pub use markup::{escape_xml, render_overlay_svg, render_photo};
pub use overlay::{EditorOutcome, OverlayEditor, Tool};
pub use questionnaire::{build_questionnaire, Questionnaire};
pub use report::{assemble, render_preview_html, Document, InspectorRole, ReportMetadata};
pub use section::{group_by_section, group_by_umbrella, SectionGroup};
pub use types::{CaseFile, Photo};
