//! Report page layout
//!
//! Millimetre-based layout for the PDF report. Every pt value is derived
//! from the mm constants.

// ============================================
// mm layout
// ============================================

/// A4 (mm)
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

pub const MARGIN_MM: f32 = 15.0;
pub const PHOTO_GAP_MM: f32 = 8.0;

/// Space reserved at the top of each photo page for the section heading
pub const HEADER_HEIGHT_MM: f32 = 12.0;

/// Photo/caption split of the usable width
pub const IMAGE_RATIO: f32 = 0.62;
pub const INFO_RATIO: f32 = 0.38;

pub const USABLE_WIDTH_MM: f32 = A4_WIDTH_MM - MARGIN_MM * 2.0; // 180mm
pub const PHOTO_WIDTH_MM: f32 = USABLE_WIDTH_MM * IMAGE_RATIO - PHOTO_GAP_MM / 2.0;
pub const INFO_WIDTH_MM: f32 = USABLE_WIDTH_MM * INFO_RATIO - PHOTO_GAP_MM / 2.0;

const PHOTO_AREA_MM: f32 = A4_HEIGHT_MM - MARGIN_MM * 2.0 - HEADER_HEIGHT_MM;
pub const PHOTO_HEIGHT_MM_3UP: f32 = (PHOTO_AREA_MM - PHOTO_GAP_MM * 2.0) / 3.0;
pub const PHOTO_HEIGHT_MM_2UP: f32 = (PHOTO_AREA_MM - PHOTO_GAP_MM) / 2.0;

// ============================================
// Text
// ============================================

pub const TITLE_FONT_SIZE: f32 = 20.0;
pub const HEADING_FONT_SIZE: f32 = 14.0;
pub const BODY_FONT_SIZE: f32 = 10.0;
pub const FOOTER_FONT_SIZE: f32 = 8.0;

/// Baseline-to-baseline distance for body text (mm)
pub const LINE_HEIGHT_MM: f32 = 5.5;

/// Rough Helvetica advance per character, as a fraction of font size
pub const CHAR_WIDTH_EM: f32 = 0.5;

// ============================================
// Conversion
// ============================================

/// 1mm = 72/25.4 pt
pub const MM_TO_PT: f32 = 72.0 / 25.4;

pub const PAGE_WIDTH_PT: f32 = A4_WIDTH_MM * MM_TO_PT;
pub const PAGE_HEIGHT_PT: f32 = A4_HEIGHT_MM * MM_TO_PT;

#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub gap_mm: f32,
    pub header_height_mm: f32,
    pub photo_width_mm: f32,
    pub photo_height_mm: f32,
    pub info_width_mm: f32,
    pub photos_per_page: u8,
}

impl PdfLayout {
    pub fn three_up() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm: MARGIN_MM,
            gap_mm: PHOTO_GAP_MM,
            header_height_mm: HEADER_HEIGHT_MM,
            photo_width_mm: PHOTO_WIDTH_MM,
            photo_height_mm: PHOTO_HEIGHT_MM_3UP,
            info_width_mm: INFO_WIDTH_MM,
            photos_per_page: 3,
        }
    }

    pub fn two_up() -> Self {
        Self {
            photo_height_mm: PHOTO_HEIGHT_MM_2UP,
            photos_per_page: 2,
            ..Self::three_up()
        }
    }

    /// 2 → two-up, anything else → three-up
    pub fn for_photos_per_page(n: u8) -> Self {
        match n {
            2 => Self::two_up(),
            _ => Self::three_up(),
        }
    }

    /// Photo plus gap (mm)
    pub fn block_height_mm(&self) -> f32 {
        self.photo_height_mm + self.gap_mm
    }

    pub fn usable_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm * 2.0
    }

    /// Top of the content area (mm from the page bottom)
    pub fn content_top_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm
    }
}

#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// Approximate rendered width of `text` in mm
pub fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    pt_to_mm(text.chars().count() as f32 * font_size_pt * CHAR_WIDTH_EM)
}

/// Greedy word wrap to a width in mm
pub fn wrap_text(text: &str, font_size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if !line.is_empty() && text_width_mm(&candidate, font_size_pt) > max_width_mm {
                lines.push(std::mem::take(&mut line));
                line = word.to_string();
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}
