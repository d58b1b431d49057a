use std::path::{Path, PathBuf};

use eframe::egui::{pos2, vec2, Pos2, Rect};
use roof_report_common::annotation::{FrameSize, Point};
use roof_report_common::overlay::{OverlayEditor, Tool};
use roof_report_common::types::CaseFile;

#[derive(Debug, Default)]
pub struct AppState {
    pub case: CaseFile,
    pub selected_index: Option<usize>,
    pub source_path: Option<PathBuf>,
    pub session: Option<EditorSession>,
    pub dirty: bool,
}

impl AppState {
    /// Directory relative image paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Annotation session for one photo
#[derive(Debug)]
pub struct EditorSession {
    pub photo_id: String,
    pub editor: OverlayEditor,
    pub frame: FrameSize,
}

/// Toolbar text for the annotate session. Label text and measurement are
/// kept apart so switching tools never hides one behind the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolDrafts {
    pub label_text: String,
    pub measurement: String,
}

impl ToolDrafts {
    /// The draft the toolbar field edits while `tool` is active
    pub fn field_mut(&mut self, tool: Tool) -> &mut String {
        match tool {
            Tool::Label => &mut self.label_text,
            Tool::Arrow | Tool::Circle | Tool::Line => &mut self.measurement,
        }
    }

    /// Push both drafts into the editor
    pub fn apply(&self, editor: &mut OverlayEditor) {
        editor.set_label_text(self.label_text.clone());
        editor.set_measurement(Some(self.measurement.clone()));
    }

    /// Clear the draft consumed by a shape committed with `tool`
    pub fn committed(&mut self, tool: Tool, editor: &mut OverlayEditor) {
        self.field_mut(tool).clear();
        self.apply(editor);
    }
}

/// Maps between screen positions and the photo's annotation frame. The
/// canvas keeps the frame's aspect ratio, so one scale serves both axes.
#[derive(Debug, Clone, Copy)]
pub struct CanvasMapping {
    pub rect: Rect,
    pub scale: f32,
}

impl CanvasMapping {
    /// Largest rect with the frame's aspect ratio centred in `available`
    pub fn fit(available: Rect, frame: FrameSize) -> Self {
        let fw = frame.width.max(1.0) as f32;
        let fh = frame.height.max(1.0) as f32;
        let scale = (available.width() / fw).min(available.height() / fh).max(0.0);
        let size = vec2(fw * scale, fh * scale);
        let rect = Rect::from_center_size(available.center(), size);
        Self { rect, scale }
    }

    pub fn to_frame(&self, pos: Pos2) -> Point {
        if self.scale <= 0.0 {
            return Point::new(0.0, 0.0);
        }
        Point::new(
            ((pos.x - self.rect.min.x) / self.scale) as f64,
            ((pos.y - self.rect.min.y) / self.scale) as f64,
        )
    }

    pub fn to_screen(&self, point: Point) -> Pos2 {
        pos2(
            self.rect.min.x + point.x as f32 * self.scale,
            self.rect.min.y + point.y as f32 * self.scale,
        )
    }
}

/// Local file for an image URI; `None` for URLs and data URIs
pub fn resolve_image_path(base_dir: &Path, uri: &str) -> Option<PathBuf> {
    if uri.is_empty() || uri.starts_with("data:") {
        return None;
    }
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if uri.contains("://") {
        return None;
    }
    let path = Path::new(uri);
    Some(if path.is_relative() { base_dir.join(path) } else { path.to_path_buf() })
}
