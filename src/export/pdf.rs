//! PDF rendering of an assembled [`Document`] with `printpdf`.

use crate::case::is_remote_or_inline;
use crate::error::{ReportError, Result};
use base64::Engine;
use printpdf::image_crate::{self, DynamicImage};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use roof_report_common::export::pdf_core::{
    build_pdf_info_fields, paginate, FrameProjection, PdfLayoutCore, PdfShape, Rect,
};
use roof_report_common::layout::{
    wrap_text, PdfLayout, BODY_FONT_SIZE, FOOTER_FONT_SIZE, HEADING_FONT_SIZE, LINE_HEIGHT_MM,
    TITLE_FONT_SIZE,
};
use roof_report_common::questionnaire::Category;
use roof_report_common::report::Document;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const IMAGE_DPI: f32 = 300.0;
const MAX_IMAGE_PX: u32 = 1400;
const SIGNATURE_WIDTH_MM: f32 = 70.0;
const ANNOTATION_THICKNESS_PT: f32 = 1.5;

/// Render `document` to an A4 PDF at `output_path`
pub fn generate_pdf(document: &Document, output_path: &Path, photos_per_page: u8) -> Result<()> {
    let layout = PdfLayout::for_photos_per_page(photos_per_page);
    let core = PdfLayoutCore::from_layout(&layout);

    let (doc, page1, layer1) = PdfDocument::new(
        &document.title,
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::PdfGeneration(format!("font: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::PdfGeneration(format!("font: {:?}", e)))?;

    let layer = doc.get_page(page1).get_layer(layer1);
    let mut writer = PageWriter {
        doc: &doc,
        layout: &layout,
        font,
        bold,
        y: layout.content_top_mm(),
        layer,
    };

    writer.cover(document);

    for page in paginate(&document.sections, core.photos_per_page) {
        writer.new_page();
        let heading = if page.continued {
            format!("{} (cont.)", page.section)
        } else {
            page.section.to_string()
        };
        writer.text_at(&heading, HEADING_FONT_SIZE, layout.margin_mm, core.heading_y_mm(), true);

        for (slot, photo) in page.photos.iter().enumerate() {
            let slot_rect = core.photo_rect(slot);
            let rect = slot_rect.fit_frame(photo.frame_size());
            match load_image(&photo.image_uri) {
                Some(img) => writer.image(&img, rect),
                None => writer.placeholder(slot_rect, &photo.image_uri),
            }

            if document.include_annotations {
                let projection = FrameProjection::new(photo.frame_size(), rect);
                writer.shapes(&projection.photo_shapes(photo));
            }

            let mut y = slot_rect.top() - LINE_HEIGHT_MM;
            for field in build_pdf_info_fields(photo) {
                writer.text_at(field.label, BODY_FONT_SIZE, core.info_x_mm(), y, true);
                y -= LINE_HEIGHT_MM;
                for line in wrap_text(&field.value, BODY_FONT_SIZE, layout.info_width_mm) {
                    writer.text_at(&line, BODY_FONT_SIZE, core.info_x_mm(), y, false);
                    y -= LINE_HEIGHT_MM;
                }
            }
        }
    }

    writer.closing(document);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReportError::PdfGeneration(format!("save: {:?}", e)))?;

    tracing::debug!(path = %output_path.display(), photos = document.photo_count(), "pdf written");
    Ok(())
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layout: &'a PdfLayout,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    /// Flow cursor (mm from the page bottom)
    y: f32,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.layout.page_width_mm),
            Mm(self.layout.page_height_mm),
            "Layer 1",
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = self.layout.content_top_mm();
    }

    fn text_at(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        self.layer.set_fill_color(black());
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(pdf_text(text), size, Mm(x), Mm(y), font);
    }

    /// Next flowing line, breaking the page when the bottom margin is reached
    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let step = LINE_HEIGHT_MM * (size / BODY_FONT_SIZE).max(1.0);
        if self.y - step < self.layout.margin_mm + LINE_HEIGHT_MM {
            self.new_page();
        }
        self.y -= step;
        self.text_at(text, size, self.layout.margin_mm, self.y, bold);
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, BODY_FONT_SIZE, self.layout.usable_width_mm()) {
            self.line(&line, BODY_FONT_SIZE, false);
        }
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT_MM;
    }

    fn cover(&mut self, document: &Document) {
        if let Some(logo) = load_image(&document.logo_uri) {
            let width = 40.0;
            let height = width * logo.height() as f32 / logo.width().max(1) as f32;
            let rect = Rect {
                x: self.layout.page_width_mm - self.layout.margin_mm - width,
                y: self.layout.content_top_mm() - height,
                width,
                height,
            };
            self.image(&logo, rect);
        }

        self.line(&document.title, TITLE_FONT_SIZE, true);
        self.gap();
        self.line(&format!("Date: {}", document.inspection_date), BODY_FONT_SIZE, false);
        for field in &document.fields {
            self.paragraph(&format!("{}: {}", field.label, field.value));
        }
        self.line(&document.prepared_by, BODY_FONT_SIZE, false);
        self.gap();
        self.line(&format!("Photos: {}", document.photo_count()), BODY_FONT_SIZE, false);
    }

    fn closing(&mut self, document: &Document) {
        self.new_page();
        self.line("Roof Questionnaire Summary", HEADING_FONT_SIZE, true);
        for (name, category) in document.questionnaire.categories() {
            self.gap();
            self.line(&name.to_uppercase(), BODY_FONT_SIZE, true);
            match category {
                Category::Keyed(sides) => {
                    for (key, values) in sides.entries() {
                        self.paragraph(&format!("{}: {}", key, values.join(", ")));
                    }
                }
                Category::List(values) => self.paragraph(&values.join(", ")),
            }
        }

        self.gap();
        self.line("Inspector Summary", HEADING_FONT_SIZE, true);
        self.paragraph(&document.summary);

        if let Some(signature) = document.signature.as_deref() {
            self.gap();
            self.line("Inspector Signature:", BODY_FONT_SIZE, true);
            match load_image(signature) {
                Some(img) => {
                    let height = SIGNATURE_WIDTH_MM * img.height() as f32 / img.width().max(1) as f32;
                    if self.y - height < self.layout.margin_mm + LINE_HEIGHT_MM * 2.0 {
                        self.new_page();
                    }
                    self.y -= height + 2.0;
                    let rect = Rect { x: self.layout.margin_mm, y: self.y, width: SIGNATURE_WIDTH_MM, height };
                    self.image(&img, rect);
                }
                None => self.line("[signature could not be decoded]", BODY_FONT_SIZE, false),
            }
        }

        self.gap();
        for line in wrap_text(&document.disclaimer, FOOTER_FONT_SIZE, self.layout.usable_width_mm()) {
            self.line(&line, FOOTER_FONT_SIZE, false);
        }
    }

    /// Draw `img` over `rect`, which already carries the photo's aspect
    fn image(&self, img: &DynamicImage, rect: Rect) {
        let native_w_mm = img.width().max(1) as f32 / IMAGE_DPI * 25.4;
        let native_h_mm = img.height().max(1) as f32 / IMAGE_DPI * 25.4;
        let image = printpdf::Image::from_dynamic_image(img);
        image.add_to_layer(
            self.layer.clone(),
            printpdf::ImageTransform {
                translate_x: Some(Mm(rect.x)),
                translate_y: Some(Mm(rect.y)),
                scale_x: Some(rect.width / native_w_mm),
                scale_y: Some(rect.height / native_h_mm),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
    }

    fn placeholder(&self, rect: Rect, uri: &str) {
        self.layer.set_outline_color(gray());
        self.layer.set_outline_thickness(0.8);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(rect.x), Mm(rect.y)), false),
                (Point::new(Mm(rect.x + rect.width), Mm(rect.y)), false),
                (Point::new(Mm(rect.x + rect.width), Mm(rect.top())), false),
                (Point::new(Mm(rect.x), Mm(rect.top())), false),
            ],
            is_closed: true,
        });

        let inner = rect.width - 8.0;
        let mut y = rect.y + rect.height / 2.0;
        self.text_at("Image unavailable", BODY_FONT_SIZE, rect.x + 4.0, y, true);
        for line in wrap_text(uri, FOOTER_FONT_SIZE, inner).into_iter().take(3) {
            y -= LINE_HEIGHT_MM;
            self.text_at(&line, FOOTER_FONT_SIZE, rect.x + 4.0, y, false);
        }
    }

    fn shapes(&self, shapes: &[PdfShape]) {
        self.layer.set_outline_color(red());
        self.layer.set_outline_thickness(ANNOTATION_THICKNESS_PT);
        for shape in shapes {
            match shape {
                PdfShape::Polyline { points, closed } => {
                    self.layer.add_line(Line {
                        points: points
                            .iter()
                            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
                            .collect(),
                        is_closed: *closed,
                    });
                }
                PdfShape::Text { x, y, text, size_pt } => {
                    self.layer.set_fill_color(red());
                    self.layer.use_text(pdf_text(text), *size_pt, Mm(*x), Mm(*y), &self.font);
                }
            }
        }
    }
}

/// Decode a local path, `file://` URI or base64 data URI. Remote URLs and
/// undecodable sources yield `None`.
pub fn load_image(uri: &str) -> Option<DynamicImage> {
    let decoded = if let Some(rest) = uri.strip_prefix("data:") {
        let payload = rest.split_once(',').map(|(_, data)| data)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim()).ok()?;
        image_crate::load_from_memory(&bytes).ok()
    } else if let Some(path) = uri.strip_prefix("file://") {
        image_crate::open(path).ok()
    } else if uri.is_empty() || is_remote_or_inline(uri) {
        None
    } else {
        image_crate::open(uri).ok()
    };

    if decoded.is_none() && !uri.is_empty() {
        tracing::warn!(uri = %truncate(uri, 80), "image not embeddable, drawing placeholder");
    }

    decoded.map(|img| {
        let img = if img.width() > MAX_IMAGE_PX || img.height() > MAX_IMAGE_PX {
            img.thumbnail(MAX_IMAGE_PX, MAX_IMAGE_PX)
        } else {
            img
        };
        DynamicImage::ImageRgb8(img.to_rgb8())
    })
}

/// Builtin fonts only cover Latin-1
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '–' | '—' => '-',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}…", text.chars().take(max).collect::<String>())
    }
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn gray() -> Color {
    Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None))
}

fn red() -> Color {
    Color::Rgb(Rgb::new(1.0, 0.0, 0.0, None))
}
