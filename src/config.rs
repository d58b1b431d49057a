use crate::error::{ReportError, Result};
use roof_report_common::report::{InspectorRole, ReportMetadata};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the configured inspector name
pub const INSPECTOR_ENV: &str = "ROOF_REPORT_INSPECTOR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub inspector_name: Option<String>,
    pub role: InspectorRole,
    pub disclaimer: Option<String>,
    pub logo_uri: Option<String>,
    pub report_title: Option<String>,
    pub photos_per_page: u8,
    pub include_annotations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inspector_name: None,
            role: InspectorRole::default(),
            disclaimer: None,
            logo_uri: None,
            report_title: None,
            photos_per_page: 3,
            include_annotations: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("Home directory not found".into()))?;
        Ok(home.join(".config").join("roof-report").join("config.json"))
    }

    /// Environment variable first, then the stored name
    pub fn inspector_name(&self) -> Option<String> {
        if let Ok(name) = std::env::var(INSPECTOR_ENV) {
            if !name.trim().is_empty() {
                return Some(name);
            }
        }
        self.inspector_name.clone()
    }

    /// Fill metadata gaps from config. Case values win.
    pub fn apply_defaults(&self, metadata: &mut ReportMetadata) {
        if metadata.inspector_name.trim().is_empty() {
            if let Some(name) = self.inspector_name() {
                metadata.inspector_name = name;
            }
        }
        if metadata.role == InspectorRole::default() {
            metadata.role = self.role;
        }
        fill(&mut metadata.disclaimer, &self.disclaimer);
        fill(&mut metadata.logo_uri, &self.logo_uri);
        fill(&mut metadata.report_title, &self.report_title);
    }
}

fn fill(target: &mut Option<String>, fallback: &Option<String>) {
    let missing = target.as_deref().map_or(true, |v| v.trim().is_empty());
    if missing && fallback.is_some() {
        *target = fallback.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_metadata_wins() {
        let config = Config {
            inspector_name: Some("Config Name".into()),
            disclaimer: Some("Config disclaimer".into()),
            report_title: Some("Config Title".into()),
            role: InspectorRole::Contractor,
            ..Default::default()
        };
        let mut metadata = ReportMetadata {
            inspector_name: "Case Name".into(),
            report_title: Some("Case Title".into()),
            ..Default::default()
        };
        config.apply_defaults(&mut metadata);
        assert_eq!(metadata.inspector_name, "Case Name");
        assert_eq!(metadata.report_title.as_deref(), Some("Case Title"));
        assert_eq!(metadata.disclaimer.as_deref(), Some("Config disclaimer"));
        assert_eq!(metadata.role, InspectorRole::Contractor);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/roof-report/config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.photos_per_page, 3);
        assert!(config.include_annotations);
    }
}
