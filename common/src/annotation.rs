//! Annotation model
//!
//! Vector marks drawn over a photo. Coordinates live in the photo's
//! authoring frame (see [`FrameSize`]); every renderer reads the same
//! [`Primitive`] list produced by [`Annotation::primitives`], so the
//! interactive editor and the exported report draw identical geometry.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Arrowhead stroke length (frame units)
pub const ARROW_HEAD_LENGTH: f64 = 10.0;
/// Arrowhead half-angle (±30°)
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;
/// Stroke width used by every renderer
pub const STROKE_WIDTH: f64 = 2.0;
/// Font size for labels and measurements
pub const TEXT_SIZE: f64 = 16.0;
/// Measurement text sits this far above a shaft midpoint
pub const MEASUREMENT_LIFT: f64 = 4.0;
/// Annotation colour (CSS)
pub const ANNOTATION_COLOR: &str = "red";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Display frame in which a photo's annotations were authored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    /// Square frame produced by photo intake
    pub const SQUARE: FrameSize = FrameSize { width: 1024.0, height: 1024.0 };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// width / height, falling back to 1.0 for an empty frame
    pub fn aspect_ratio(&self) -> f64 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::SQUARE
    }
}

/// A drawable mark over a photo.
///
/// Zero-length arrows/lines and zero-radius circles are accepted and render
/// as degenerate shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    #[serde(rename_all = "camelCase")]
    Arrow {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        measurement: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Circle {
        x: f64,
        y: f64,
        r: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        measurement: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Label { x: f64, y: f64, text: String },
    #[serde(rename_all = "camelCase")]
    Line {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        measurement: Option<String>,
    },
}

/// Text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

/// Renderer-independent drawing instruction in frame units
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Segment { from: Point, to: Point },
    Circle { center: Point, radius: f64 },
    Text { at: Point, text: String, anchor: TextAnchor },
}

impl Annotation {
    pub fn arrow(start: Point, end: Point) -> Self {
        Annotation::Arrow {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            measurement: None,
        }
    }

    pub fn line(start: Point, end: Point) -> Self {
        Annotation::Line {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            measurement: None,
        }
    }

    /// Negative radii are clamped to zero
    pub fn circle(center: Point, r: f64) -> Self {
        Annotation::Circle {
            x: center.x,
            y: center.y,
            r: r.max(0.0),
            measurement: None,
        }
    }

    pub fn label(at: Point, text: impl Into<String>) -> Self {
        Annotation::Label {
            x: at.x,
            y: at.y,
            text: text.into(),
        }
    }

    /// Attach a measurement caption. Labels carry no measurement and are
    /// returned unchanged.
    pub fn with_measurement(self, value: Option<String>) -> Self {
        let value = value.filter(|v| !v.is_empty());
        match self {
            Annotation::Arrow { start_x, start_y, end_x, end_y, .. } => Annotation::Arrow {
                start_x,
                start_y,
                end_x,
                end_y,
                measurement: value,
            },
            Annotation::Circle { x, y, r, .. } => Annotation::Circle { x, y, r, measurement: value },
            Annotation::Line { start_x, start_y, end_x, end_y, .. } => Annotation::Line {
                start_x,
                start_y,
                end_x,
                end_y,
                measurement: value,
            },
            label @ Annotation::Label { .. } => label,
        }
    }

    pub fn measurement(&self) -> Option<&str> {
        match self {
            Annotation::Arrow { measurement, .. }
            | Annotation::Circle { measurement, .. }
            | Annotation::Line { measurement, .. } => measurement.as_deref(),
            Annotation::Label { .. } => None,
        }
    }

    /// Lowercase tag used in JSON and markup
    pub fn type_name(&self) -> &'static str {
        match self {
            Annotation::Arrow { .. } => "arrow",
            Annotation::Circle { .. } => "circle",
            Annotation::Label { .. } => "label",
            Annotation::Line { .. } => "line",
        }
    }

    /// Drawing instructions for this annotation
    pub fn primitives(&self) -> Vec<Primitive> {
        match self {
            Annotation::Arrow { start_x, start_y, end_x, end_y, measurement } => {
                let start = Point::new(*start_x, *start_y);
                let end = Point::new(*end_x, *end_y);
                let [left, right] = arrowhead(start, end);
                let mut out = vec![
                    Primitive::Segment { from: start, to: end },
                    Primitive::Segment { from: end, to: left },
                    Primitive::Segment { from: end, to: right },
                ];
                out.extend(shaft_measurement(start, end, measurement.as_deref()));
                out
            }
            Annotation::Circle { x, y, r, measurement } => {
                let radius = r.max(0.0);
                let mut out = vec![Primitive::Circle { center: Point::new(*x, *y), radius }];
                if let Some(text) = measurement.as_deref().filter(|t| !t.is_empty()) {
                    out.push(Primitive::Text {
                        at: Point::new(*x, y + radius + TEXT_SIZE),
                        text: text.to_string(),
                        anchor: TextAnchor::Middle,
                    });
                }
                out
            }
            Annotation::Label { x, y, text } => vec![Primitive::Text {
                at: Point::new(*x, *y),
                text: text.clone(),
                anchor: TextAnchor::Start,
            }],
            Annotation::Line { start_x, start_y, end_x, end_y, measurement } => {
                let start = Point::new(*start_x, *start_y);
                let end = Point::new(*end_x, *end_y);
                let mut out = vec![Primitive::Segment { from: start, to: end }];
                out.extend(shaft_measurement(start, end, measurement.as_deref()));
                out
            }
        }
    }
}

/// Arrowhead stroke tips for a shaft from `start` to `end`.
///
/// With θ = atan2(end.y − start.y, end.x − start.x) the tips are
/// `end − h·(cos(θ ∓ π/6), sin(θ ∓ π/6))`.
pub fn arrowhead(start: Point, end: Point) -> [Point; 2] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let tip = |offset: f64| {
        Point::new(
            end.x - ARROW_HEAD_LENGTH * (angle + offset).cos(),
            end.y - ARROW_HEAD_LENGTH * (angle + offset).sin(),
        )
    };
    [tip(-ARROW_HEAD_ANGLE), tip(ARROW_HEAD_ANGLE)]
}

fn shaft_measurement(start: Point, end: Point, measurement: Option<&str>) -> Option<Primitive> {
    let text = measurement.filter(|t| !t.is_empty())?;
    let mid = start.midpoint(end);
    Some(Primitive::Text {
        at: Point::new(mid.x, mid.y - MEASUREMENT_LIFT),
        text: text.to_string(),
        anchor: TextAnchor::Middle,
    })
}
