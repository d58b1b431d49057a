//! Interactive overlay editor
//!
//! Pointer-driven state machine behind the annotation screen. It owns a
//! working copy of a photo's annotations; nothing is written back until the
//! caller receives [`EditorOutcome::Saved`] and persists it.

use crate::annotation::{Annotation, Point, Primitive};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Arrow,
    Circle,
    Label,
    Line,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Arrow, Tool::Circle, Tool::Label, Tool::Line];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Arrow => "arrow",
            Tool::Circle => "circle",
            Tool::Label => "label",
            Tool::Line => "line",
        }
    }

    /// Drag tools build a shape from a press/move/release gesture
    pub fn uses_drag(&self) -> bool {
        !matches!(self, Tool::Label)
    }
}

/// How an editing session ended
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Saved(Vec<Annotation>),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Stroke {
    start: Point,
    current: Point,
}

#[derive(Debug, Clone)]
pub struct OverlayEditor {
    annotations: Vec<Annotation>,
    tool: Tool,
    stroke: Option<Stroke>,
    label_text: String,
    measurement: Option<String>,
    finished: bool,
}

impl OverlayEditor {
    /// Start a session from a snapshot of the photo's annotations
    pub fn new(annotations: &[Annotation]) -> Self {
        Self {
            annotations: annotations.to_vec(),
            tool: Tool::default(),
            stroke: None,
            label_text: String::new(),
            measurement: None,
            finished: false,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    /// Switching tools drops any stroke in progress
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            self.stroke = None;
        }
        self.tool = tool;
    }

    pub fn set_label_text(&mut self, text: impl Into<String>) {
        self.label_text = text.into();
    }

    /// Measurement caption for the next committed arrow, circle or line
    pub fn set_measurement(&mut self, measurement: Option<String>) {
        self.measurement = measurement.filter(|m| !m.is_empty());
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.finished || !self.tool.uses_drag() {
            return;
        }
        self.stroke = Some(Stroke { start: point, current: point });
    }

    pub fn update_stroke(&mut self, point: Point) {
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.current = point;
        }
    }

    /// Commit the stroke in progress. Returns the appended annotation.
    pub fn end_stroke(&mut self) -> Option<&Annotation> {
        let stroke = self.stroke.take()?;
        let annotation = self
            .shape_for(stroke)?
            .with_measurement(self.measurement.take());
        self.annotations.push(annotation);
        self.annotations.last()
    }

    /// Place a label at a single tap point using the current label text
    pub fn tap(&mut self, point: Point) -> Option<&Annotation> {
        if self.finished || self.tool != Tool::Label || self.label_text.is_empty() {
            return None;
        }
        self.annotations.push(Annotation::label(point, self.label_text.clone()));
        self.annotations.last()
    }

    /// Remove the most recent annotation regardless of type. No-op when empty.
    pub fn undo(&mut self) -> Option<Annotation> {
        if self.finished {
            return None;
        }
        self.annotations.pop()
    }

    /// Transient shape for the stroke in progress
    pub fn preview(&self) -> Option<Annotation> {
        self.stroke.and_then(|stroke| self.shape_for(stroke))
    }

    /// Committed annotations followed by the transient preview
    pub fn primitives(&self) -> Vec<Primitive> {
        self.annotations
            .iter()
            .chain(self.preview().as_ref())
            .flat_map(Annotation::primitives)
            .collect()
    }

    pub fn save(&mut self) -> EditorOutcome {
        self.stroke = None;
        self.finished = true;
        EditorOutcome::Saved(self.annotations.clone())
    }

    pub fn close(&mut self) -> EditorOutcome {
        self.stroke = None;
        self.finished = true;
        EditorOutcome::Cancelled
    }

    fn shape_for(&self, stroke: Stroke) -> Option<Annotation> {
        match self.tool {
            Tool::Arrow => Some(Annotation::arrow(stroke.start, stroke.current)),
            Tool::Line => Some(Annotation::line(stroke.start, stroke.current)),
            Tool::Circle => Some(Annotation::circle(
                stroke.start,
                stroke.start.distance_to(stroke.current),
            )),
            Tool::Label => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drag(editor: &mut OverlayEditor, from: (f64, f64), to: (f64, f64)) {
        editor.begin_stroke(Point::new(from.0, from.1));
        editor.update_stroke(Point::new((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
        editor.update_stroke(Point::new(to.0, to.1));
        editor.end_stroke();
    }

    #[test]
    fn test_arrow_commit_uses_start_and_end() {
        let mut editor = OverlayEditor::new(&[]);
        drag(&mut editor, (10.0, 10.0), (60.0, 30.0));
        assert_eq!(
            editor.annotations(),
            &[Annotation::arrow(Point::new(10.0, 10.0), Point::new(60.0, 30.0))]
        );
    }

    #[test]
    fn test_circle_radius_is_euclidean_distance() {
        let mut editor = OverlayEditor::new(&[]);
        editor.set_tool(Tool::Circle);
        drag(&mut editor, (0.0, 0.0), (3.0, 4.0));
        assert_eq!(editor.annotations(), &[Annotation::circle(Point::new(0.0, 0.0), 5.0)]);
    }

    #[test]
    fn test_line_tool() {
        let mut editor = OverlayEditor::new(&[]);
        editor.set_tool(Tool::Line);
        drag(&mut editor, (1.0, 2.0), (3.0, 4.0));
        assert_eq!(editor.annotations()[0].type_name(), "line");
    }

    #[test]
    fn test_zero_length_drag_commits_degenerate_shape() {
        let mut editor = OverlayEditor::new(&[]);
        editor.begin_stroke(Point::new(5.0, 5.0));
        assert!(editor.end_stroke().is_some());
        editor.set_tool(Tool::Circle);
        editor.begin_stroke(Point::new(5.0, 5.0));
        editor.end_stroke();
        assert_eq!(editor.annotations()[1], Annotation::circle(Point::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_preview_tracks_gesture() {
        let mut editor = OverlayEditor::new(&[]);
        assert!(editor.preview().is_none());
        editor.begin_stroke(Point::new(0.0, 0.0));
        editor.update_stroke(Point::new(10.0, 0.0));
        assert_eq!(
            editor.preview(),
            Some(Annotation::arrow(Point::new(0.0, 0.0), Point::new(10.0, 0.0)))
        );
        assert_eq!(editor.primitives().len(), 3);
        assert!(editor.annotations().is_empty());
    }

    #[test]
    fn test_label_tool_ignores_drag_and_commits_on_tap() {
        let mut editor = OverlayEditor::new(&[]);
        editor.set_tool(Tool::Label);
        drag(&mut editor, (0.0, 0.0), (10.0, 10.0));
        assert!(editor.annotations().is_empty());

        assert!(editor.tap(Point::new(4.0, 4.0)).is_none(), "empty label text");
        editor.set_label_text("Soft spot");
        editor.tap(Point::new(4.0, 4.0));
        assert_eq!(editor.annotations(), &[Annotation::label(Point::new(4.0, 4.0), "Soft spot")]);
    }

    #[test]
    fn test_tap_ignored_for_drag_tools() {
        let mut editor = OverlayEditor::new(&[]);
        editor.set_label_text("x");
        assert!(editor.tap(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_measurement_applies_to_next_shape_only() {
        let mut editor = OverlayEditor::new(&[]);
        editor.set_measurement(Some("4 ft".to_string()));
        drag(&mut editor, (0.0, 0.0), (10.0, 0.0));
        drag(&mut editor, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(editor.annotations()[0].measurement(), Some("4 ft"));
        assert_eq!(editor.annotations()[1].measurement(), None);
    }

    #[test]
    fn test_switching_tool_discards_stroke() {
        let mut editor = OverlayEditor::new(&[]);
        editor.begin_stroke(Point::new(0.0, 0.0));
        editor.set_tool(Tool::Circle);
        assert!(!editor.is_drawing());
        assert!(editor.end_stroke().is_none());
    }

    #[test]
    fn test_undo_is_lifo_across_types() {
        let existing = vec![Annotation::label(Point::new(0.0, 0.0), "old")];
        let mut editor = OverlayEditor::new(&existing);
        editor.set_tool(Tool::Circle);
        drag(&mut editor, (0.0, 0.0), (1.0, 0.0));
        assert_eq!(editor.undo().map(|a| a.type_name()), Some("circle"));
        assert_eq!(editor.undo().map(|a| a.type_name()), Some("label"));
        assert!(editor.undo().is_none());
        assert!(editor.undo().is_none());
        assert!(editor.annotations().is_empty());
    }

    #[test]
    fn test_save_emits_list_and_ends_session() {
        let mut editor = OverlayEditor::new(&[]);
        drag(&mut editor, (0.0, 0.0), (1.0, 1.0));
        editor.begin_stroke(Point::new(2.0, 2.0));
        let outcome = editor.save();
        assert_eq!(outcome, EditorOutcome::Saved(vec![Annotation::arrow(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0)
        )]));
        assert!(editor.is_finished());
        editor.begin_stroke(Point::new(0.0, 0.0));
        assert!(!editor.is_drawing());
    }

    #[test]
    fn test_close_leaves_snapshot_untouched() {
        let original = vec![Annotation::circle(Point::new(1.0, 1.0), 1.0)];
        let mut editor = OverlayEditor::new(&original);
        drag(&mut editor, (0.0, 0.0), (9.0, 9.0));
        assert_eq!(editor.close(), EditorOutcome::Cancelled);
        assert_eq!(original.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_undo_never_underflows(ops in proptest::collection::vec(0u8..3, 0..40)) {
            let mut editor = OverlayEditor::new(&[]);
            let mut expected = 0usize;
            for op in ops {
                match op {
                    0 => {
                        drag(&mut editor, (0.0, 0.0), (1.0, 1.0));
                        expected += 1;
                    }
                    _ => {
                        editor.undo();
                        expected = expected.saturating_sub(1);
                    }
                }
                prop_assert_eq!(editor.annotations().len(), expected);
            }
        }
    }
}
