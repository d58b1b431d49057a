//! Static markup renderer
//!
//! Turns a photo and its annotations into HTML/SVG for the exported report.
//! Geometry comes from [`Annotation::primitives`], the same source the
//! interactive editor paints from.

use crate::annotation::{
    Annotation, FrameSize, Primitive, TextAnchor, ANNOTATION_COLOR, STROKE_WIDTH, TEXT_SIZE,
};
use crate::types::Photo;

/// Escape text for XML/HTML content and attribute values
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Compact decimal for markup attributes (at most 3 fraction digits)
pub fn svg_number(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// One SVG element per primitive
pub fn primitive_svg(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Segment { from, to } => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" />"#,
            svg_number(from.x),
            svg_number(from.y),
            svg_number(to.x),
            svg_number(to.y),
            ANNOTATION_COLOR,
            svg_number(STROKE_WIDTH),
        ),
        Primitive::Circle { center, radius } => format!(
            r#"<circle cx="{}" cy="{}" r="{}" stroke="{}" stroke-width="{}" fill="none" />"#,
            svg_number(center.x),
            svg_number(center.y),
            svg_number(*radius),
            ANNOTATION_COLOR,
            svg_number(STROKE_WIDTH),
        ),
        Primitive::Text { at, text, anchor } => {
            let anchor_attr = match anchor {
                TextAnchor::Start => "",
                TextAnchor::Middle => r#" text-anchor="middle""#,
            };
            format!(
                r#"<text x="{}" y="{}" fill="{}" font-size="{}"{}>{}</text>"#,
                svg_number(at.x),
                svg_number(at.y),
                ANNOTATION_COLOR,
                svg_number(TEXT_SIZE),
                anchor_attr,
                escape_xml(text),
            )
        }
    }
}

/// SVG overlay for an annotation list. Empty list → empty string.
///
/// The viewBox is the authoring frame and `preserveAspectRatio="none"`
/// stretches it over the image box, so coordinates follow the image to any
/// export size.
pub fn render_overlay_svg(annotations: &[Annotation], frame: FrameSize) -> String {
    if annotations.is_empty() {
        return String::new();
    }

    let mut svg = format!(
        r#"<svg class="annotation-overlay" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" preserveAspectRatio="none" style="position:absolute;top:0;left:0;width:100%;height:100%;">"#,
        svg_number(frame.width),
        svg_number(frame.height),
    );
    for annotation in annotations {
        svg.push_str(&format!(r#"<g class="annotation-{}">"#, annotation.type_name()));
        for primitive in annotation.primitives() {
            svg.push_str(&primitive_svg(&primitive));
        }
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

/// Image markup for one photo: annotated when requested and the photo has
/// at least one annotation, plain otherwise.
pub fn render_photo(photo: &Photo, include_annotations: bool) -> String {
    let frame = photo.frame_size();
    let ratio = format!("{} / {}", svg_number(frame.width), svg_number(frame.height));
    let src = escape_xml(&photo.image_uri);

    if include_annotations && !photo.annotations().is_empty() {
        format!(
            r#"<div class="annotated-photo" style="position:relative;width:100%;aspect-ratio:{ratio};"><img src="{src}" alt="Photo" style="position:absolute;top:0;left:0;width:100%;height:100%;object-fit:fill;" />{}</div>"#,
            render_overlay_svg(photo.annotations(), frame),
        )
    } else {
        format!(
            r#"<img src="{src}" alt="Photo" style="width:100%;aspect-ratio:{ratio};object-fit:cover;" />"#
        )
    }
}
