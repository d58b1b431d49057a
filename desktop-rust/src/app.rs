use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::Result;
use eframe::egui::{self, Align2, Color32, FontId, RichText, Stroke};
use image::ImageReader;

use crate::io::{load_case, save_case};
use crate::model::{resolve_image_path, AppState, CanvasMapping, EditorSession, ToolDrafts};
use roof_report_common::annotation::{Primitive, TextAnchor, STROKE_WIDTH, TEXT_SIZE};
use roof_report_common::overlay::{EditorOutcome, OverlayEditor, Tool};
use roof_report_common::types::Photo;

const TEXTURE_MAX_PX: u32 = 1024;
const ANNOTATION_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

pub struct DesktopApp {
    state: AppState,
    status: String,
    export_status: String,
    export_format: ExportFormat,
    export_rx: Option<Receiver<UiMessage>>,
    exporting: bool,
    label_draft: String,
    tool_drafts: ToolDrafts,
    textures: HashMap<String, egui::TextureHandle>,
    texture_rx: Receiver<TextureData>,
    texture_tx: mpsc::Sender<TextureData>,
    texture_inflight: HashSet<String>,
    texture_failed: HashSet<String>,
    pending_textures: Vec<TextureData>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ExportFormat {
    Html,
    Pdf,
    #[default]
    Both,
}

enum UiMessage {
    ExportDone { message: String },
}

struct TextureData {
    path: String,
    size: [usize; 2],
    pixels: Vec<u8>,
}

impl DesktopApp {
    fn open_case(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Case JSON", &["json"])
            .pick_file()
        {
            match self.load_from_path(&path) {
                Ok(_) => self.status = format!("Loaded {}", path.display()),
                Err(err) => self.status = format!("Load failed: {err}"),
            }
        }
    }

    fn reload_case(&mut self) {
        let Some(path) = self.state.source_path.clone() else {
            self.status = "No case file loaded".to_string();
            return;
        };
        match self.load_from_path(&path) {
            Ok(_) => self.status = format!("Reloaded {}", path.display()),
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn load_from_path(&mut self, path: &Path) -> Result<()> {
        let case = load_case(path)?;
        self.state.selected_index = if case.photos.is_empty() { None } else { Some(0) };
        self.state.case = case;
        self.state.source_path = Some(path.to_path_buf());
        self.state.session = None;
        self.state.dirty = false;
        self.textures.clear();
        self.texture_inflight.clear();
        self.texture_failed.clear();
        self.pending_textures.clear();
        self.sync_label_draft();
        Ok(())
    }

    fn save_case(&mut self) {
        let Some(path) = self.state.source_path.clone() else {
            self.status = "No case file loaded".to_string();
            return;
        };
        match save_case(&path, &self.state.case) {
            Ok(_) => {
                self.status = format!("Saved {}", path.display());
                self.state.dirty = false;
            }
            Err(err) => self.status = format!("Save failed: {err}"),
        }
    }

    fn selected_photo(&self) -> Option<&Photo> {
        self.state.selected_index.and_then(|i| self.state.case.photos.get(i))
    }

    fn select(&mut self, index: usize) {
        if self.state.selected_index == Some(index) {
            return;
        }
        // Leaving a photo abandons its unsaved session
        if let Some(mut session) = self.state.session.take() {
            session.editor.close();
        }
        self.state.selected_index = Some(index);
        self.sync_label_draft();
    }

    fn sync_label_draft(&mut self) {
        self.label_draft = self
            .selected_photo()
            .map(|p| p.user_label().to_string())
            .unwrap_or_default();
    }

    fn start_session(&mut self) {
        let Some(photo) = self.selected_photo() else { return };
        self.state.session = Some(EditorSession {
            photo_id: photo.id.clone(),
            editor: OverlayEditor::new(photo.annotations()),
            frame: photo.frame_size(),
        });
        self.tool_drafts = ToolDrafts::default();
    }

    fn finish_session(&mut self, save: bool) {
        let Some(mut session) = self.state.session.take() else { return };
        let outcome = if save { session.editor.save() } else { session.editor.close() };
        match outcome {
            EditorOutcome::Saved(annotations) => {
                let count = annotations.len();
                match self.state.case.find_mut(&session.photo_id) {
                    Ok(photo) => {
                        photo.replace_annotations(annotations);
                        self.state.dirty = true;
                        self.status = format!("{count} annotations kept");
                    }
                    Err(err) => self.status = format!("Save failed: {err}"),
                }
            }
            EditorOutcome::Cancelled => self.status = "Annotation changes discarded".to_string(),
        }
    }

    fn apply_label(&mut self) {
        let Some(index) = self.state.selected_index else { return };
        let Some(photo) = self.state.case.photos.get_mut(index) else { return };
        match photo.set_user_label(self.label_draft.trim()) {
            Ok(_) => {
                self.state.dirty = true;
                self.status = "Label updated".to_string();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn approve_selected(&mut self) {
        let Some(index) = self.state.selected_index else { return };
        if let Some(photo) = self.state.case.photos.get_mut(index) {
            photo.approve();
            self.state.dirty = true;
        }
    }

    fn remove_selected(&mut self) {
        let Some(id) = self.selected_photo().map(|p| p.id.clone()) else { return };
        if self.state.case.remove(&id).is_ok() {
            self.state.session = None;
            self.state.dirty = true;
            let len = self.state.case.photos.len();
            self.state.selected_index = if len == 0 { None } else { self.state.selected_index.map(|i| i.min(len - 1)) };
            self.sync_label_draft();
        }
    }

    fn request_texture(&mut self, path: &Path) {
        let key = path.to_string_lossy().to_string();
        if self.textures.contains_key(&key)
            || self.texture_inflight.contains(&key)
            || self.texture_failed.contains(&key)
        {
            return;
        }
        self.texture_inflight.insert(key.clone());
        let sender = self.texture_tx.clone();

        std::thread::spawn(move || {
            let image = ImageReader::open(&key).ok().and_then(|r| r.decode().ok());
            let data = match image {
                Some(image) => {
                    let image = image.thumbnail(TEXTURE_MAX_PX, TEXTURE_MAX_PX);
                    TextureData {
                        size: [image.width() as usize, image.height() as usize],
                        pixels: image.to_rgba8().into_raw(),
                        path: key,
                    }
                }
                None => TextureData { path: key, size: [0, 0], pixels: Vec::new() },
            };
            let _ = sender.send(data);
        });
    }

    fn process_pending_textures(&mut self, ctx: &egui::Context) {
        for msg in std::mem::take(&mut self.pending_textures) {
            if msg.size[0] == 0 || msg.size[1] == 0 {
                self.texture_failed.insert(msg.path);
                continue;
            }
            let color_image = egui::ColorImage::from_rgba_unmultiplied(msg.size, &msg.pixels);
            let texture = ctx.load_texture(&msg.path, color_image, egui::TextureOptions::default());
            self.textures.insert(msg.path, texture);
        }
    }

    fn texture_for(&mut self, photo_uri: &str) -> Option<egui::TextureHandle> {
        let path = resolve_image_path(&self.state.base_dir(), photo_uri)?;
        let key = path.to_string_lossy().to_string();
        if let Some(texture) = self.textures.get(&key) {
            return Some(texture.clone());
        }
        self.request_texture(&path);
        None
    }

    fn render_list(&mut self, ui: &mut egui::Ui) {
        let rows: Vec<(usize, String, String, bool, usize)> = self
            .state
            .case
            .photos
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.section_prefix.clone(), p.user_label().to_string(), p.is_approved(), p.annotations().len()))
            .collect();

        for (index, section, label, approved, count) in rows {
            let selected = self.state.selected_index == Some(index);
            let frame = egui::Frame::none()
                .fill(if selected { Color32::from_rgb(31, 35, 48) } else { Color32::from_rgb(24, 28, 40) })
                .stroke(Stroke::new(1.0, if selected { Color32::from_rgb(246, 196, 69) } else { Color32::from_gray(40) }))
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(8.0));

            let inner = frame.show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(&section).strong());
                ui.label(RichText::new(if label.is_empty() { "-" } else { label.as_str() }).size(12.0));
                ui.horizontal(|ui| {
                    if approved {
                        ui.label(RichText::new("Approved").color(Color32::from_rgb(120, 200, 120)).size(11.0));
                    }
                    if count > 0 {
                        ui.label(RichText::new(format!("{count} marks")).color(Color32::from_gray(170)).size(11.0));
                    }
                });
            });

            if inner.response.interact(egui::Sense::click()).clicked() {
                self.select(index);
            }
            ui.add_space(6.0);
        }
    }

    fn render_photo_details(&mut self, ui: &mut egui::Ui) {
        let Some(photo) = self.selected_photo().cloned() else {
            ui.label("Select a photo.");
            return;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new(&photo.section_prefix).heading());
            if photo.is_approved() {
                ui.label(RichText::new("Approved").color(Color32::from_rgb(120, 200, 120)));
            }
        });

        let mut removed = false;
        ui.horizontal(|ui| {
            ui.label("Label");
            let editable = !photo.is_approved();
            ui.add_enabled(editable, egui::TextEdit::singleline(&mut self.label_draft).desired_width(360.0));
            if ui.add_enabled(editable, egui::Button::new("Apply")).clicked() {
                self.apply_label();
            }
            if !photo.ai_suggested_label.is_empty()
                && ui.add_enabled(editable, egui::Button::new("Use suggestion")).clicked()
            {
                self.label_draft = photo.ai_suggested_label.clone();
                self.apply_label();
            }
            if ui.add_enabled(editable, egui::Button::new("Approve")).clicked() {
                self.approve_selected();
            }
            if ui.button("Remove").clicked() {
                self.remove_selected();
                removed = true;
            }
        });
        if removed {
            return;
        }
        if !photo.ai_suggested_label.is_empty() {
            ui.label(RichText::new(format!("Suggestion: {}", photo.ai_suggested_label)).color(Color32::from_gray(170)));
        }
        ui.separator();

        self.render_editor_toolbar(ui);
        self.render_canvas(ui, &photo);
    }

    fn render_editor_toolbar(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.state.session.as_mut() else {
            if ui.button("Annotate").clicked() {
                self.start_session();
            }
            return;
        };

        let mut finish = None;
        ui.horizontal(|ui| {
            let mut tool = session.editor.tool();
            for candidate in Tool::ALL {
                ui.radio_value(&mut tool, candidate, candidate.name());
            }
            session.editor.set_tool(tool);

            ui.separator();
            if ui.add_enabled(!session.editor.annotations().is_empty(), egui::Button::new("Undo")).clicked() {
                session.editor.undo();
            }
            if ui.button("Save").clicked() {
                finish = Some(true);
            }
            if ui.button("Close").clicked() {
                finish = Some(false);
            }
        });

        ui.horizontal(|ui| {
            let tool = session.editor.tool();
            ui.label(if tool == Tool::Label { "Text" } else { "Measurement" });
            ui.text_edit_singleline(self.tool_drafts.field_mut(tool));
        });
        self.tool_drafts.apply(&mut session.editor);

        if let Some(save) = finish {
            self.finish_session(save);
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, photo: &Photo) {
        let texture = self.texture_for(&photo.image_uri);
        let frame = self
            .state
            .session
            .as_ref()
            .map(|s| s.frame)
            .unwrap_or_else(|| photo.frame_size());

        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, egui::Sense::click_and_drag());
        let mapping = CanvasMapping::fit(response.rect, frame);

        match &texture {
            Some(texture) => {
                painter.image(
                    texture.id(),
                    mapping.rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                painter.rect_stroke(mapping.rect, 0.0, Stroke::new(1.0, Color32::from_gray(90)));
                painter.text(
                    mapping.rect.center(),
                    Align2::CENTER_CENTER,
                    "Image unavailable",
                    FontId::proportional(14.0),
                    Color32::from_gray(150),
                );
            }
        }

        let primitives = match self.state.session.as_mut() {
            Some(session) => {
                if let Some(pos) = response.interact_pointer_pos() {
                    let point = mapping.to_frame(pos);
                    if response.drag_started() {
                        session.editor.begin_stroke(point);
                    } else if response.dragged() {
                        session.editor.update_stroke(point);
                    }
                    if response.clicked() && session.editor.tap(point).is_some() {
                        self.tool_drafts.committed(Tool::Label, &mut session.editor);
                    }
                }
                if response.drag_stopped() && session.editor.end_stroke().is_some() {
                    let tool = session.editor.tool();
                    self.tool_drafts.committed(tool, &mut session.editor);
                }
                session.editor.primitives()
            }
            None => photo.annotations().iter().flat_map(|a| a.primitives()).collect(),
        };

        paint_primitives(&painter, &mapping, &primitives);
    }

    fn run_export(&mut self, format: ExportFormat) {
        if self.state.dirty {
            self.save_case();
        }
        let Some(source) = self.state.source_path.clone() else {
            self.export_status = "No case file loaded".to_string();
            return;
        };

        let format_arg = match format {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Both => "both",
        };

        let cli = resolve_cli_binary();
        let (tx, rx) = mpsc::channel();
        self.export_rx = Some(rx);
        self.exporting = true;
        self.export_status = "Export running...".to_string();

        std::thread::spawn(move || {
            let result = std::process::Command::new(cli)
                .args(["export", source.to_string_lossy().as_ref(), "--format", format_arg])
                .output();

            let message = match result {
                Ok(out) if out.status.success() => "Export complete".to_string(),
                Ok(out) => {
                    let stderr = String::from_utf8_lossy(&out.stderr);
                    format!("Export failed: {}", stderr.trim())
                }
                Err(err) => format!("Export failed: {err}"),
            };
            let _ = tx.send(UiMessage::ExportDone { message });
        });
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.texture_rx.try_recv() {
            self.texture_inflight.remove(&msg.path);
            self.pending_textures.push(msg);
        }

        if let Some(rx) = &self.export_rx {
            if let Ok(UiMessage::ExportDone { message }) = rx.try_recv() {
                self.export_status = message;
                self.exporting = false;
                self.export_rx = None;
            }
        }
    }
}

fn paint_primitives(painter: &egui::Painter, mapping: &CanvasMapping, primitives: &[Primitive]) {
    let stroke = Stroke::new(STROKE_WIDTH as f32 * mapping.scale.max(0.5), ANNOTATION_COLOR);
    for primitive in primitives {
        match primitive {
            Primitive::Segment { from, to } => {
                painter.line_segment([mapping.to_screen(*from), mapping.to_screen(*to)], stroke);
            }
            Primitive::Circle { center, radius } => {
                painter.circle_stroke(mapping.to_screen(*center), *radius as f32 * mapping.scale, stroke);
            }
            Primitive::Text { at, text, anchor } => {
                let align = match anchor {
                    TextAnchor::Start => Align2::LEFT_BOTTOM,
                    TextAnchor::Middle => Align2::CENTER_BOTTOM,
                };
                painter.text(
                    mapping.to_screen(*at),
                    align,
                    text,
                    FontId::proportional(TEXT_SIZE as f32 * mapping.scale),
                    ANNOTATION_COLOR,
                );
            }
        }
    }
}

impl Default for DesktopApp {
    fn default() -> Self {
        let (texture_tx, texture_rx) = mpsc::channel();
        Self {
            state: AppState::default(),
            status: String::new(),
            export_status: String::new(),
            export_format: ExportFormat::default(),
            export_rx: None,
            exporting: false,
            label_draft: String::new(),
            tool_drafts: ToolDrafts::default(),
            textures: HashMap::new(),
            texture_rx,
            texture_tx,
            texture_inflight: HashSet::new(),
            texture_failed: HashSet::new(),
            pending_textures: Vec::new(),
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.exporting || !self.texture_inflight.is_empty() || !self.pending_textures.is_empty() {
            ctx.request_repaint();
        }
        self.poll_messages();
        self.process_pending_textures(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Case").clicked() {
                        self.open_case();
                        ui.close_menu();
                    }
                    if ui.button("Reload Case").clicked() {
                        self.reload_case();
                        ui.close_menu();
                    }
                    let loaded = self.state.source_path.is_some();
                    if ui.add_enabled(loaded && self.state.dirty, egui::Button::new("Save Case")).clicked() {
                        self.save_case();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Export", |ui| {
                    ui.radio_value(&mut self.export_format, ExportFormat::Html, "HTML");
                    ui.radio_value(&mut self.export_format, ExportFormat::Pdf, "PDF");
                    ui.radio_value(&mut self.export_format, ExportFormat::Both, "Both");
                    let enabled = !self.state.case.photos.is_empty() && !self.exporting;
                    if ui.add_enabled(enabled, egui::Button::new("Run Export")).clicked() {
                        self.run_export(self.export_format);
                        ui.close_menu();
                    }
                });

                ui.separator();
                if self.state.dirty {
                    ui.label(RichText::new("Unsaved changes").color(Color32::from_rgb(246, 196, 69)));
                }
                if !self.export_status.is_empty() {
                    ui.label(RichText::new(&self.export_status).color(Color32::from_rgb(246, 196, 69)));
                }
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::SidePanel::left("list").resizable(true).show(ctx, |ui| {
            ui.heading("Photos");
            ui.label(format!("{} photos", self.state.case.photos.len()));
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.render_list(ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_photo_details(ui);
        });
    }
}

fn resolve_cli_binary() -> PathBuf {
    let name = if cfg!(windows) { "roof-report.exe" } else { "roof-report" };
    let exe = std::env::current_exe().ok();
    if let Some(base_dir) = exe.as_ref().and_then(|p| p.parent()) {
        let local = base_dir.join(name);
        if local.exists() {
            return local;
        }
        if let Some(target_dir) = base_dir.parent() {
            for profile in ["debug", "release"] {
                let sibling = target_dir.join(profile).join(name);
                if sibling.exists() {
                    return sibling;
                }
            }
        }
    }
    PathBuf::from(name)
}
