//! PDF export geometry.
//!
//! Everything here is pure layout math in mm (origin bottom-left, y up), so
//! it can be tested without producing a document.

use crate::annotation::{FrameSize, Point, Primitive, TextAnchor, TEXT_SIZE};
use crate::layout::{mm_to_pt, text_width_mm, PdfLayout};
use crate::report::DocumentSection;
use crate::types::Photo;

/// Vertices used to approximate a circle
pub const CIRCLE_SEGMENTS: usize = 48;

/// Rectangle in page mm; `y` is the bottom edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Largest rect with the frame's aspect ratio, centred in `self`
    pub fn fit_frame(&self, frame: FrameSize) -> Rect {
        if frame.width <= 0.0 || frame.height <= 0.0 || self.height <= 0.0 {
            return *self;
        }
        let aspect = frame.aspect_ratio() as f32;
        let (width, height) = if self.width / self.height > aspect {
            (self.height * aspect, self.height)
        } else {
            (self.width, self.width / aspect)
        };
        Rect {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// Slot positions for one layout
#[derive(Debug, Clone)]
pub struct PdfLayoutCore {
    pub layout: PdfLayout,
    pub photos_per_page: usize,
}

impl PdfLayoutCore {
    pub fn from_layout(layout: &PdfLayout) -> Self {
        Self {
            layout: layout.clone(),
            photos_per_page: layout.photos_per_page.max(1) as usize,
        }
    }

    /// Baseline of the section heading on a photo page
    pub fn heading_y_mm(&self) -> f32 {
        self.layout.content_top_mm() - self.layout.header_height_mm * 0.6
    }

    /// Photo box for a slot, counted from the top of the page
    pub fn photo_rect(&self, slot: usize) -> Rect {
        let top = self.layout.content_top_mm()
            - self.layout.header_height_mm
            - slot as f32 * self.layout.block_height_mm();
        Rect {
            x: self.layout.margin_mm,
            y: top - self.layout.photo_height_mm,
            width: self.layout.photo_width_mm,
            height: self.layout.photo_height_mm,
        }
    }

    /// Left edge of the caption column
    pub fn info_x_mm(&self) -> f32 {
        self.layout.margin_mm + self.layout.photo_width_mm + self.layout.gap_mm
    }
}

/// A drawable in page mm
#[derive(Debug, Clone, PartialEq)]
pub enum PdfShape {
    Polyline { points: Vec<(f32, f32)>, closed: bool },
    Text { x: f32, y: f32, text: String, size_pt: f32 },
}

/// Maps authoring-frame coordinates onto a photo box. Axes scale
/// independently; callers pass a box from [`Rect::fit_frame`] so both
/// scales agree.
#[derive(Debug, Clone, Copy)]
pub struct FrameProjection {
    rect: Rect,
    sx: f32,
    sy: f32,
}

impl FrameProjection {
    pub fn new(frame: FrameSize, rect: Rect) -> Self {
        let scale = |extent: f64, available: f32| {
            if extent > 0.0 { available / extent as f32 } else { 0.0 }
        };
        Self {
            rect,
            sx: scale(frame.width, rect.width),
            sy: scale(frame.height, rect.height),
        }
    }

    pub fn project(&self, point: Point) -> (f32, f32) {
        (
            self.rect.x + point.x as f32 * self.sx,
            self.rect.top() - point.y as f32 * self.sy,
        )
    }

    pub fn shape(&self, primitive: &Primitive) -> PdfShape {
        match primitive {
            Primitive::Segment { from, to } => PdfShape::Polyline {
                points: vec![self.project(*from), self.project(*to)],
                closed: false,
            },
            Primitive::Circle { center, radius } => {
                let points = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = i as f64 / CIRCLE_SEGMENTS as f64 * std::f64::consts::TAU;
                        self.project(Point::new(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        ))
                    })
                    .collect();
                PdfShape::Polyline { points, closed: true }
            }
            Primitive::Text { at, text, anchor } => {
                let size_pt = mm_to_pt(TEXT_SIZE as f32 * self.sy);
                let (mut x, y) = self.project(*at);
                if *anchor == TextAnchor::Middle {
                    x -= text_width_mm(text, size_pt) / 2.0;
                }
                PdfShape::Text {
                    x,
                    y,
                    text: text.clone(),
                    size_pt,
                }
            }
        }
    }

    /// All annotation shapes for a photo
    pub fn photo_shapes(&self, photo: &Photo) -> Vec<PdfShape> {
        photo
            .annotations()
            .iter()
            .flat_map(|a| a.primitives())
            .map(|p| self.shape(&p))
            .collect()
    }
}

/// One page of photos from a single section
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPage<'a> {
    pub section: &'a str,
    pub photos: &'a [Photo],
    pub continued: bool,
}

/// Split sections into pages; a section never shares a page with another
pub fn paginate(sections: &[DocumentSection], photos_per_page: usize) -> Vec<PhotoPage<'_>> {
    let per_page = photos_per_page.max(1);
    sections
        .iter()
        .flat_map(|section| {
            section
                .photos
                .chunks(per_page)
                .enumerate()
                .map(move |(i, photos)| PhotoPage {
                    section: section.name.as_str(),
                    photos,
                    continued: i > 0,
                })
        })
        .collect()
}

/// A caption row beside a photo
#[derive(Debug, Clone, PartialEq)]
pub struct PdfInfoField {
    pub label: &'static str,
    pub value: String,
}

pub fn build_pdf_info_fields(photo: &Photo) -> Vec<PdfInfoField> {
    let or_dash = |value: &str| {
        if value.trim().is_empty() { "-".to_string() } else { value.to_string() }
    };
    vec![
        PdfInfoField { label: "Section", value: or_dash(&photo.section_prefix) },
        PdfInfoField { label: "Label", value: or_dash(photo.user_label()) },
        PdfInfoField {
            label: "Status",
            value: if photo.is_approved() { "Approved" } else { "Pending review" }.to_string(),
        },
        PdfInfoField {
            label: "Annotations",
            value: photo.annotations().len().to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;

    fn rect() -> Rect {
        Rect { x: 10.0, y: 20.0, width: 100.0, height: 50.0 }
    }

    #[test]
    fn test_layout_core_positions() {
        let core = PdfLayoutCore::from_layout(&PdfLayout::three_up());
        assert_eq!(core.photos_per_page, 3);
        let first = core.photo_rect(0);
        let second = core.photo_rect(1);
        assert!(first.y > second.y);
        assert!(core.heading_y_mm() > first.top());
        assert!(core.photo_rect(2).y >= core.layout.margin_mm - 0.01);
        assert!(core.info_x_mm() > first.x + first.width);
    }

    #[test]
    fn test_projection_flips_y_and_scales_axes_independently() {
        let projection = FrameProjection::new(FrameSize::new(200.0, 100.0), rect());
        assert_eq!(projection.project(Point::new(0.0, 0.0)), (10.0, 70.0));
        assert_eq!(projection.project(Point::new(200.0, 100.0)), (110.0, 20.0));
        assert_eq!(projection.project(Point::new(100.0, 50.0)), (60.0, 45.0));
    }

    #[test]
    fn test_zero_frame_does_not_divide() {
        let projection = FrameProjection::new(FrameSize::new(0.0, 0.0), rect());
        assert_eq!(projection.project(Point::new(5.0, 5.0)), (10.0, 70.0));
    }

    #[test]
    fn test_circle_becomes_closed_polygon() {
        let projection = FrameProjection::new(FrameSize::new(100.0, 100.0), rect());
        let shape = projection.shape(&Primitive::Circle { center: Point::new(50.0, 50.0), radius: 10.0 });
        match shape {
            PdfShape::Polyline { points, closed } => {
                assert!(closed);
                assert_eq!(points.len(), CIRCLE_SEGMENTS);
                // x scale 1.0, so the rightmost vertex sits 10mm from the centre
                assert!((points[0].0 - 70.0).abs() < 0.001);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_fit_frame_letterboxes() {
        let slot = rect();
        let square = slot.fit_frame(FrameSize::SQUARE);
        assert_eq!(square, Rect { x: 35.0, y: 20.0, width: 50.0, height: 50.0 });

        let wide = slot.fit_frame(FrameSize::new(400.0, 100.0));
        assert_eq!(wide, Rect { x: 10.0, y: 32.5, width: 100.0, height: 25.0 });

        assert_eq!(slot.fit_frame(FrameSize::new(0.0, 10.0)), slot);
    }

    #[test]
    fn test_circle_stays_round_in_photo_slot() {
        let core = PdfLayoutCore::from_layout(&PdfLayout::three_up());
        for frame in [FrameSize::SQUARE, FrameSize::new(400.0, 300.0), FrameSize::new(300.0, 800.0)] {
            let rect = core.photo_rect(0).fit_frame(frame);
            let projection = FrameProjection::new(frame, rect);
            let center = Point::new(frame.width / 2.0, frame.height / 2.0);
            let shape = projection.shape(&Primitive::Circle { center, radius: frame.height / 5.0 });
            let PdfShape::Polyline { points, .. } = shape else {
                panic!("circle should project to a polyline");
            };
            let xs = points.iter().map(|p| p.0);
            let ys = points.iter().map(|p| p.1);
            let rx = (xs.clone().fold(f32::MIN, f32::max) - xs.fold(f32::MAX, f32::min)) / 2.0;
            let ry = (ys.clone().fold(f32::MIN, f32::max) - ys.fold(f32::MAX, f32::min)) / 2.0;
            assert!((rx - ry).abs() < 0.01, "{frame:?}: rx={rx} ry={ry}");
        }
    }

    #[test]
    fn test_photo_shapes_follow_primitives() {
        let photo = Photo::captured("1", "a.jpg", "Address").with_annotations(vec![
            Annotation::arrow(Point::new(0.0, 0.0), Point::new(100.0, 100.0)),
            Annotation::label(Point::new(5.0, 5.0), "Hail"),
        ]);
        let projection = FrameProjection::new(photo.frame_size(), rect());
        let shapes = projection.photo_shapes(&photo);
        assert_eq!(shapes.len(), 4);
        assert!(matches!(&shapes[3], PdfShape::Text { text, .. } if text == "Hail"));
    }

    #[test]
    fn test_paginate_keeps_sections_apart() {
        let section = |name: &str, n: usize| DocumentSection {
            name: name.to_string(),
            photos: (0..n).map(|i| Photo::captured(i.to_string(), "a.jpg", name)).collect(),
        };
        let sections = vec![section("Address", 1), section("Front Slope", 4)];
        let pages = paginate(&sections, 3);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].section, "Address");
        assert_eq!(pages[1].photos.len(), 3);
        assert!(pages[2].continued);
        assert_eq!(pages[2].photos.len(), 1);
    }

    #[test]
    fn test_info_fields_defaults() {
        let photo = Photo::captured("1", "a.jpg", "Shed").with_label("");
        let fields = build_pdf_info_fields(&photo);
        assert_eq!(fields[0].value, "Shed");
        assert_eq!(fields[1].value, "-");
        assert_eq!(fields[2].value, "Pending review");
        assert_eq!(fields[3].value, "0");
    }
}
