//! Photo and case file types
//!
//! - Photo: one captured image with its label, annotations and approval state
//! - CaseFile: the persisted inspection (photos + metadata + signature)

use crate::annotation::{Annotation, FrameSize};
use crate::error::{Error, Result};
use crate::report::ReportMetadata;
use serde::{Deserialize, Serialize};

/// One captured inspection photo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Stable for the photo's lifetime
    pub id: String,

    /// Local path, remote URL or data URI
    pub image_uri: String,

    /// Inspection section this photo was taken for
    #[serde(default)]
    pub section_prefix: String,

    #[serde(default)]
    user_label: String,

    /// Advisory only
    #[serde(default)]
    pub ai_suggested_label: String,

    #[serde(default)]
    annotations: Vec<Annotation>,

    #[serde(default)]
    approved: bool,

    /// Authoring frame of the annotations; `None` means [`FrameSize::SQUARE`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameSize>,
}

impl Photo {
    /// A freshly captured photo: no annotations, not approved, labelled
    /// with its section.
    pub fn captured(
        id: impl Into<String>,
        image_uri: impl Into<String>,
        section_prefix: impl Into<String>,
    ) -> Self {
        let section_prefix = section_prefix.into();
        Self {
            id: id.into(),
            image_uri: image_uri.into(),
            user_label: section_prefix.clone(),
            section_prefix,
            ..Default::default()
        }
    }

    pub fn user_label(&self) -> &str {
        &self.user_label
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame.unwrap_or_default()
    }

    pub fn set_user_label(&mut self, label: impl Into<String>) -> Result<()> {
        if self.approved {
            return Err(Error::PhotoApproved(self.id.clone()));
        }
        self.user_label = label.into();
        Ok(())
    }

    /// Copy the AI suggestion into the user label. Empty suggestions are
    /// ignored.
    pub fn accept_suggestion(&mut self) -> Result<()> {
        if self.ai_suggested_label.is_empty() {
            return Ok(());
        }
        let suggestion = self.ai_suggested_label.clone();
        self.set_user_label(suggestion)
    }

    pub fn approve(&mut self) {
        self.approved = true;
    }

    pub fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Remove the most recent annotation; `None` when there is nothing to undo
    pub fn undo_annotation(&mut self) -> Option<Annotation> {
        self.annotations.pop()
    }

    pub fn replace_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.user_label = label.into();
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_frame(mut self, frame: FrameSize) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }
}

/// Persisted inspection case
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseFile {
    pub photos: Vec<Photo>,
    pub metadata: ReportMetadata,
    /// Encoded signature image (usually a base64 data URI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl CaseFile {
    pub fn find(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Result<&mut Photo> {
        self.photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PhotoNotFound(id.to_string()))
    }

    /// Explicit removal; the only way a photo leaves the case
    pub fn remove(&mut self, id: &str) -> Result<Photo> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::PhotoNotFound(id.to_string()))?;
        Ok(self.photos.remove(index))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
