//! Document assembly
//!
//! Combines grouped photos, the questionnaire, case metadata and an optional
//! signature into one [`Document`], then serialises it to a self-contained
//! HTML string. Image URIs are embedded as-is and never fetched.

use crate::markup::{escape_xml, render_photo};
use crate::questionnaire::{Category, Questionnaire};
use crate::section::{group_by_section, group_by_umbrella};
use crate::types::Photo;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Roof Inspection Report";
pub const DEFAULT_LOGO_URI: &str = "assets/images/report_logo.png";
pub const DEFAULT_DISCLAIMER: &str =
    "This report is for informational purposes only and is not a warranty.";
pub const SUMMARY_PLACEHOLDER: &str = "[Add your final comments here before exporting.]";

const REPORT_STYLE: &str = r#"
        body { font-family: Arial, sans-serif; padding: 20px; }
        h1, h2 { color: #2c3e50; }
        .logo { max-width: 200px; margin-bottom: 20px; }
        .photo-section { margin-bottom: 30px; }
        .photo-grid { display: flex; flex-wrap: wrap; gap: 10px; }
        .photo-item { width: 48%; }
        .photo-item img { border-radius: 6px; border: 1px solid #ccc; }
        .caption { font-size: 14px; margin-top: 4px; }
        .questionnaire { background: #f6f6f6; padding: 10px; margin: 20px 0; border-left: 5px solid #2c3e50; }
        .summary { margin-top: 30px; font-style: italic; }
        footer { text-align: center; margin-top: 40px; font-size: 12px; color: #666; }
"#;

/// Who prepared the report. Passed explicitly into assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorRole {
    #[default]
    Adjuster,
    Contractor,
    Inspector,
    Homeowner,
}

impl InspectorRole {
    pub fn title(&self) -> &'static str {
        match self {
            InspectorRole::Adjuster => "Adjuster",
            InspectorRole::Contractor => "Contractor",
            InspectorRole::Inspector => "Inspector",
            InspectorRole::Homeowner => "Homeowner",
        }
    }

    pub fn prepared_by_label(&self, inspector_name: &str) -> String {
        let name = inspector_name.trim();
        if name.is_empty() {
            format!("Prepared by: {}", self.title())
        } else {
            format!("Prepared by: {} {}", self.title(), name)
        }
    }
}

impl std::str::FromStr for InspectorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adjuster" => Ok(InspectorRole::Adjuster),
            "contractor" => Ok(InspectorRole::Contractor),
            "inspector" => Ok(InspectorRole::Inspector),
            "homeowner" => Ok(InspectorRole::Homeowner),
            _ => Err(format!(
                "Unknown role: {}. Use adjuster, contractor, inspector, or homeowner",
                s
            )),
        }
    }
}

impl std::fmt::Display for InspectorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title().to_lowercase())
    }
}

/// Case metadata. Every text field is optional; empty means omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportMetadata {
    pub client_name: String,
    pub client_address: String,
    pub insurance_carrier: String,
    pub claim_number: String,
    pub peril_type: String,
    pub inspector_name: String,
    pub report_id: String,
    pub weather_notes: String,
    /// Defaults to today's local date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    /// Free-text inspector summary
    pub summary: String,
    pub role: InspectorRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

impl ReportMetadata {
    /// Inspection date, or today's local date as MM/DD/YYYY
    pub fn resolved_date(&self) -> String {
        match non_empty(self.inspection_date.as_deref()) {
            Some(date) => date.to_string(),
            None => today(),
        }
    }

    pub fn resolved_disclaimer(&self) -> &str {
        non_empty(self.disclaimer.as_deref()).unwrap_or(DEFAULT_DISCLAIMER)
    }

    pub fn resolved_summary(&self) -> &str {
        non_empty(Some(self.summary.as_str())).unwrap_or(SUMMARY_PLACEHOLDER)
    }

    pub fn resolved_title(&self) -> &str {
        non_empty(self.report_title.as_deref()).unwrap_or(DEFAULT_TITLE)
    }

    pub fn resolved_logo(&self) -> &str {
        non_empty(self.logo_uri.as_deref()).unwrap_or(DEFAULT_LOGO_URI)
    }

    /// Labelled optional fields that carry a value, in report order
    pub fn present_fields(&self) -> Vec<MetadataField> {
        [
            ("Client", &self.client_name),
            ("Address", &self.client_address),
            ("Insurance Carrier", &self.insurance_carrier),
            ("Claim #", &self.claim_number),
            ("Peril Type", &self.peril_type),
            ("Inspector", &self.inspector_name),
            ("Report ID", &self.report_id),
            ("Weather Notes", &self.weather_notes),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| MetadataField {
            label,
            value: value.clone(),
        })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSection {
    pub name: String,
    pub photos: Vec<Photo>,
}

/// Fully assembled report, prior to file-format conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub logo_uri: String,
    pub inspection_date: String,
    pub fields: Vec<MetadataField>,
    pub prepared_by: String,
    pub sections: Vec<DocumentSection>,
    pub questionnaire: Questionnaire,
    pub summary: String,
    pub signature: Option<String>,
    pub disclaimer: String,
    pub include_annotations: bool,
}

impl Document {
    pub fn build(
        photos: &[Photo],
        questionnaire: &Questionnaire,
        metadata: &ReportMetadata,
        signature: Option<&str>,
        include_annotations: bool,
    ) -> Self {
        let sections = group_by_section(photos)
            .into_iter()
            .map(|group| DocumentSection {
                name: group.name,
                photos: group.photos.into_iter().cloned().collect(),
            })
            .collect();

        Self {
            title: metadata.resolved_title().to_string(),
            logo_uri: metadata.resolved_logo().to_string(),
            inspection_date: metadata.resolved_date(),
            fields: metadata.present_fields(),
            prepared_by: metadata.role.prepared_by_label(&metadata.inspector_name),
            sections,
            questionnaire: questionnaire.clone(),
            summary: metadata.resolved_summary().to_string(),
            signature: non_empty(signature).map(str::to_string),
            disclaimer: metadata.resolved_disclaimer().to_string(),
            include_annotations,
        }
    }

    pub fn photo_count(&self) -> usize {
        self.sections.iter().map(|s| s.photos.len()).sum()
    }

    /// Serialise to a standalone HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\" />\n");
        html.push_str(&format!("    <title>{}</title>\n", escape_xml(&self.title)));
        html.push_str(&format!("    <style>{}    </style>\n", REPORT_STYLE));
        html.push_str("  </head>\n  <body>\n");

        // Header
        html.push_str(&format!(
            "    <img class=\"logo\" src=\"{}\" alt=\"Logo\" />\n",
            escape_xml(&self.logo_uri)
        ));
        html.push_str(&format!("    <h1>{}</h1>\n", escape_xml(&self.title)));

        // Metadata
        html.push_str("    <div class=\"metadata\">\n");
        html.push_str(&field_html("Date", &self.inspection_date));
        for field in &self.fields {
            html.push_str(&field_html(field.label, &field.value));
        }
        html.push_str(&format!(
            "      <p class=\"prepared-by\">{}</p>\n",
            escape_xml(&self.prepared_by)
        ));
        html.push_str("    </div>\n");

        // Photos
        html.push_str("    <h2>Photos</h2>\n");
        for section in &self.sections {
            html.push_str("    <div class=\"photo-section\">\n");
            html.push_str(&format!("      <h3>{}</h3>\n", escape_xml(&section.name)));
            html.push_str("      <div class=\"photo-grid\">\n");
            for photo in &section.photos {
                html.push_str(&format!(
                    "        <div class=\"photo-item\">{}<div class=\"caption\">{}</div></div>\n",
                    render_photo(photo, self.include_annotations),
                    escape_xml(photo.user_label()),
                ));
            }
            html.push_str("      </div>\n    </div>\n");
        }

        // Questionnaire
        html.push_str("    <h2>Roof Questionnaire Summary</h2>\n");
        html.push_str("    <div class=\"questionnaire\">\n");
        html.push_str(&questionnaire_html(&self.questionnaire, "      "));
        html.push_str("    </div>\n");

        // Summary
        html.push_str("    <div class=\"summary\">\n      <h2>Inspector Summary</h2>\n");
        html.push_str(&format!("      <p>{}</p>\n    </div>\n", escape_xml(&self.summary)));

        // Signature
        if let Some(signature) = &self.signature {
            html.push_str("    <div class=\"signature\" style=\"margin-top: 30px;\">\n");
            html.push_str("      <h3>Inspector Signature:</h3>\n");
            html.push_str(&format!(
                "      <img src=\"{}\" alt=\"Signature\" style=\"width: 300px; border: 1px solid #ccc;\" />\n",
                escape_xml(signature)
            ));
            html.push_str("    </div>\n");
        }

        html.push_str(&format!("    <footer>{}</footer>\n", escape_xml(&self.disclaimer)));
        html.push_str("  </body>\n</html>\n");
        html
    }
}

/// Build the document and serialise it to HTML
pub fn assemble(
    photos: &[Photo],
    questionnaire: &Questionnaire,
    metadata: &ReportMetadata,
    signature: Option<&str>,
    include_annotations: bool,
) -> String {
    Document::build(photos, questionnaire, metadata, signature, include_annotations).to_html()
}

/// Lightweight preview grouped by umbrella labels
pub fn render_preview_html(
    photos: &[Photo],
    questionnaire: &Questionnaire,
    notes: &str,
    date: &str,
) -> String {
    let mut html = String::new();
    html.push_str("<html>\n  <body style=\"font-family: Arial, sans-serif; padding:16px\">\n");
    html.push_str("    <h2>Inspection Report</h2>\n");
    html.push_str(&format!("    <div>Date: {}</div>\n", escape_xml(date)));

    for group in group_by_umbrella(photos) {
        html.push_str(&format!("    <h3>{}</h3>\n", escape_xml(&group.name)));
        for photo in group.photos {
            html.push_str(&format!(
                "    <div style=\"margin-bottom:12px\"><img src=\"{}\" style=\"width:100%;height:auto\" /><div>Label: {}</div></div>\n",
                escape_xml(&photo.image_uri),
                escape_xml(photo.user_label()),
            ));
        }
    }

    html.push_str("    <h3>Roof Questionnaire Summary</h3>\n");
    html.push_str(&questionnaire_html(questionnaire, "    "));
    html.push_str("    <h3>Inspector Summary</h3>\n");
    html.push_str(&format!("    <div>{}</div>\n", escape_xml(notes)));
    html.push_str("  </body>\n</html>\n");
    html
}

/// Upper-cased category headings; keyed categories as `key: a, b`
fn questionnaire_html(questionnaire: &Questionnaire, indent: &str) -> String {
    let mut html = String::new();
    for (name, category) in questionnaire.categories() {
        html.push_str(&format!("{indent}<h4>{}</h4>\n", name.to_uppercase()));
        match category {
            Category::Keyed(sides) => {
                for (key, values) in sides.entries() {
                    html.push_str(&format!(
                        "{indent}<p><strong>{}:</strong> {}</p>\n",
                        key,
                        escape_xml(&values.join(", "))
                    ));
                }
            }
            Category::List(values) => {
                html.push_str(&format!("{indent}<p>{}</p>\n", escape_xml(&values.join(", "))));
            }
        }
    }
    html
}

fn field_html(label: &str, value: &str) -> String {
    format!(
        "      <p><strong>{}:</strong> {}</p>\n",
        escape_xml(label),
        escape_xml(value)
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn today() -> String {
    chrono::Local::now().format("%m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, Point};
    use crate::questionnaire::build_questionnaire;

    fn sample_photos() -> Vec<Photo> {
        vec![
            Photo::captured("1", "file:///p1.jpg", "Front Slope")
                .with_label("Front Slope – Shingle Crease – Wind Lift")
                .with_annotations(vec![Annotation::arrow(Point::new(20.0, 20.0), Point::new(80.0, 80.0))])
                .approved(),
            Photo::captured("2", "file:///p2.jpg", "Address")
                .with_label("Address Confirmed – 123 Main St")
                .approved(),
            Photo::captured("3", "file:///p3.jpg", "Shed").with_label("Shed – Rotting Fascia"),
        ]
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            client_name: "Jordan Smith".to_string(),
            inspection_date: Some("05/01/2025".to_string()),
            ..Default::default()
        }
    }

    fn position(html: &str, needle: &str) -> usize {
        html.find(needle).unwrap_or_else(|| panic!("missing {needle}"))
    }

    #[test]
    fn test_sections_follow_grouping_order() {
        let photos = sample_photos();
        let doc = Document::build(&photos, &Questionnaire::default(), &metadata(), None, true);
        let names: Vec<_> = doc.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Address", "Front Slope", "Shed"]);
        assert_eq!(doc.photo_count(), 3);

        let html = doc.to_html();
        assert!(position(&html, "<h3>Address</h3>") < position(&html, "<h3>Front Slope</h3>"));
        assert!(position(&html, "<h3>Front Slope</h3>") < position(&html, "<h3>Shed</h3>"));
    }

    #[test]
    fn test_fixed_block_order() {
        let photos = sample_photos();
        let q = build_questionnaire(&photos);
        let html = assemble(&photos, &q, &metadata(), Some("data:image/png;base64,AAAA"), true);

        let logo = position(&html, "class=\"logo\"");
        let meta = position(&html, "class=\"metadata\"");
        let photos_at = position(&html, "<h2>Photos</h2>");
        let questionnaire = position(&html, "<h2>Roof Questionnaire Summary</h2>");
        let summary = position(&html, "<h2>Inspector Summary</h2>");
        let signature = position(&html, "Inspector Signature:");
        let footer = position(&html, "<footer>");
        assert!(logo < meta && meta < photos_at && photos_at < questionnaire);
        assert!(questionnaire < summary && summary < signature && signature < footer);
    }

    #[test]
    fn test_no_signature_omits_block() {
        let html = assemble(&sample_photos(), &Questionnaire::default(), &metadata(), None, true);
        assert!(!html.contains("Signature"));
        assert!(!html.contains("class=\"signature\""));

        let html = assemble(&sample_photos(), &Questionnaire::default(), &metadata(), Some(""), true);
        assert!(!html.contains("Signature"));
    }

    #[test]
    fn test_only_present_metadata_rendered() {
        let html = assemble(&[], &Questionnaire::default(), &metadata(), None, false);
        assert!(html.contains("<p><strong>Date:</strong> 05/01/2025</p>"));
        assert!(html.contains("<p><strong>Client:</strong> Jordan Smith</p>"));
        assert!(!html.contains("Insurance Carrier"));
        assert!(!html.contains("Claim #"));
        assert!(!html.contains("Weather Notes"));
    }

    #[test]
    fn test_fallbacks() {
        let doc = Document::build(&[], &Questionnaire::default(), &ReportMetadata::default(), None, false);
        assert!(!doc.inspection_date.is_empty());
        let html = doc.to_html();
        assert!(html.contains(SUMMARY_PLACEHOLDER));
        assert!(html.contains(&format!("<footer>{}</footer>", DEFAULT_DISCLAIMER)));
        assert!(html.contains(DEFAULT_TITLE));
        assert!(html.contains(&format!("<p><strong>Date:</strong> {}</p>", doc.inspection_date)));
    }

    #[test]
    fn test_custom_disclaimer_and_summary() {
        let meta = ReportMetadata {
            summary: "Roof replacement recommended.".to_string(),
            disclaimer: Some("Custom terms.".to_string()),
            ..metadata()
        };
        let html = assemble(&[], &Questionnaire::default(), &meta, None, false);
        assert!(html.contains("<p>Roof replacement recommended.</p>"));
        assert!(html.contains("<footer>Custom terms.</footer>"));
        assert!(!html.contains(SUMMARY_PLACEHOLDER));
    }

    #[test]
    fn test_include_annotations_flag() {
        let photos = sample_photos();
        let with = assemble(&photos, &Questionnaire::default(), &metadata(), None, true);
        let without = assemble(&photos, &Questionnaire::default(), &metadata(), None, false);
        assert_eq!(with.matches("<svg").count(), 1);
        assert!(!without.contains("<svg"));
    }

    #[test]
    fn test_questionnaire_rendering() {
        let q = build_questionnaire(&sample_photos());
        let html = assemble(&[], &q, &metadata(), None, false);
        assert!(html.contains("<h4>ELEVATIONS</h4>"));
        assert!(html.contains("<h4>GENERALCONDITIONS</h4>"));
        assert!(html.contains("<p><strong>front:</strong> front slope – shingle crease – wind lift</p>"));
        assert!(html.contains("<p>address confirmed – 123 main st</p>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let photos = vec![Photo::captured("1", "a.jpg\" onerror=\"x", "<b>Shed</b>").with_label("<i>x</i>")];
        let meta = ReportMetadata {
            client_name: "<script>".to_string(),
            ..metadata()
        };
        let html = assemble(&photos, &Questionnaire::default(), &meta, None, true);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Shed</b>"));
        assert!(!html.contains("<i>x</i>"));
        assert!(html.contains("a.jpg&quot; onerror=&quot;x"));
    }

    #[test]
    fn test_role_is_explicit_input() {
        let adjuster = assemble(&[], &Questionnaire::default(), &metadata(), None, false);
        assert!(adjuster.contains("Prepared by: Adjuster"));

        let meta = ReportMetadata {
            role: InspectorRole::Contractor,
            inspector_name: "Sam Lee".to_string(),
            ..metadata()
        };
        let contractor = assemble(&[], &Questionnaire::default(), &meta, None, false);
        assert!(contractor.contains("Prepared by: Contractor Sam Lee"));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Contractor".parse::<InspectorRole>(), Ok(InspectorRole::Contractor));
        assert!("pilot".parse::<InspectorRole>().is_err());
        assert_eq!(InspectorRole::Homeowner.to_string(), "homeowner");
    }

    #[test]
    fn test_document_retains_assembly_inputs() {
        let html_a = assemble(&sample_photos(), &Questionnaire::default(), &metadata(), None, true);
        let html_b = assemble(&sample_photos(), &Questionnaire::default(), &metadata(), None, true);
        assert_eq!(html_a, html_b);
    }

    #[test]
    fn test_preview_uses_umbrella_groups() {
        let photos = vec![
            Photo::captured("1", "a.jpg", "Front Elevation"),
            Photo::captured("2", "b.jpg", "Front Slope"),
        ];
        let html = render_preview_html(&photos, &Questionnaire::default(), "notes here", "05/01/2025");
        assert_eq!(html.matches("<h3>Front</h3>").count(), 1);
        assert_eq!(html.matches("Label: ").count(), 2);
        assert!(html.contains("Date: 05/01/2025"));
        assert!(html.contains("<div>notes here</div>"));
    }
}
