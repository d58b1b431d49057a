//! Roof questionnaire aggregation
//!
//! Pre-fills the questionnaire from approved, labelled photos. Classification
//! rules are independent: one photo can feed several buckets.

use crate::types::Photo;
use serde::{Deserialize, Serialize};

const DAMAGE_KEYWORDS: &[&str] = &["damage", "crack", "missing", "lift"];
const ACCESSORY_KEYWORDS: &[&str] = &["satellite", "skylight"];
const GENERAL_PREFIXES: &[&str] = &["rear yard", "address"];

/// Per-side buckets (elevations and slopes)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sides {
    pub front: Vec<String>,
    pub right: Vec<String>,
    pub back: Vec<String>,
    pub left: Vec<String>,
}

impl Sides {
    /// (sub-key, values) in fixed order
    pub fn entries(&self) -> [(&'static str, &[String]); 4] {
        [
            ("front", &self.front),
            ("right", &self.right),
            ("back", &self.back),
            ("left", &self.left),
        ]
    }

    /// First side named in `prefix` (front, right, back, left)
    fn bucket_mut(&mut self, prefix: &str) -> Option<&mut Vec<String>> {
        if prefix.contains("front") {
            Some(&mut self.front)
        } else if prefix.contains("right") {
            Some(&mut self.right)
        } else if prefix.contains("back") {
            Some(&mut self.back)
        } else if prefix.contains("left") {
            Some(&mut self.left)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, values)| values.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Questionnaire {
    pub elevations: Sides,
    pub slopes: Sides,
    pub accessories: Vec<String>,
    pub general_conditions: Vec<String>,
    pub damage_summary: Vec<String>,
}

/// A top-level category's content
#[derive(Debug, Clone, Copy)]
pub enum Category<'a> {
    Keyed(&'a Sides),
    List(&'a [String]),
}

impl Questionnaire {
    /// Categories in report order, keyed by their serialized names
    pub fn categories(&self) -> [(&'static str, Category<'_>); 5] {
        [
            ("elevations", Category::Keyed(&self.elevations)),
            ("slopes", Category::Keyed(&self.slopes)),
            ("accessories", Category::List(&self.accessories)),
            ("generalConditions", Category::List(&self.general_conditions)),
            ("damageSummary", Category::List(&self.damage_summary)),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, category)| match category {
            Category::Keyed(sides) => sides.is_empty(),
            Category::List(values) => values.is_empty(),
        })
    }
}

/// Build the questionnaire from approved photos with a non-empty label.
/// Labels are stored lower-cased.
pub fn build_questionnaire(photos: &[Photo]) -> Questionnaire {
    let mut questionnaire = Questionnaire::default();

    for photo in photos.iter().filter(|p| contributes(p)) {
        let label = photo.user_label().to_lowercase();
        let prefix = photo.section_prefix.to_lowercase();

        if prefix.contains("elevation") {
            if let Some(bucket) = questionnaire.elevations.bucket_mut(&prefix) {
                bucket.push(label.clone());
            }
        }

        if prefix.contains("slope") {
            if let Some(bucket) = questionnaire.slopes.bucket_mut(&prefix) {
                bucket.push(label.clone());
            }
        }

        if prefix.contains("accessories") || contains_any(&label, ACCESSORY_KEYWORDS) {
            questionnaire.accessories.push(label.clone());
        }

        if contains_any(&prefix, GENERAL_PREFIXES) {
            questionnaire.general_conditions.push(label.clone());
        }

        if contains_any(&label, DAMAGE_KEYWORDS) {
            questionnaire.damage_summary.push(label);
        }
    }

    questionnaire
}

/// Only approved photos with a label feed the questionnaire
pub fn contributes(photo: &Photo) -> bool {
    photo.is_approved() && !photo.user_label().is_empty()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approved(id: &str, section: &str, label: &str) -> Photo {
        Photo::captured(id, "x.jpg", section).with_label(label).approved()
    }

    #[test]
    fn test_empty_input_returns_full_skeleton() {
        let q = build_questionnaire(&[]);
        assert!(q.is_empty());
        let json = serde_json::to_value(&q).unwrap();
        for side in ["front", "right", "back", "left"] {
            assert!(json["elevations"][side].as_array().unwrap().is_empty());
            assert!(json["slopes"][side].as_array().unwrap().is_empty());
        }
        assert!(json["accessories"].as_array().unwrap().is_empty());
        assert!(json["generalConditions"].as_array().unwrap().is_empty());
        assert!(json["damageSummary"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_front_slope_goes_to_slope_and_damage() {
        let q = build_questionnaire(&[approved(
            "2",
            "Front Slope",
            "Front Slope – Shingle Crease – Wind Lift",
        )]);
        let expected = "front slope – shingle crease – wind lift".to_string();
        assert_eq!(q.slopes.front, vec![expected.clone()]);
        assert_eq!(q.damage_summary, vec![expected]);
        assert!(q.elevations.front.is_empty());
    }

    #[test]
    fn test_satellite_label_feeds_accessories() {
        let q = build_questionnaire(&[approved(
            "3",
            "Roof Edge",
            "Satellite Dish – Improper Mount",
        )]);
        assert_eq!(q.accessories, vec!["satellite dish – improper mount".to_string()]);

        let q = build_questionnaire(&[approved("4", "Roof Conditions", "Skylight – Cracked Lens")]);
        assert_eq!(q.accessories.len(), 1);
        assert_eq!(q.damage_summary.len(), 1);
    }

    #[test]
    fn test_elevation_side_detection() {
        let q = build_questionnaire(&[
            approved("1", "Front Elevation", "Front Elevation – Downspout – Possible Hail Damage"),
            approved("2", "Right Elevation", "Right Elevation – Fascia – Peeling Paint"),
            approved("3", "Back Elevation", "Back Elevation – Window Trim – Wood Rot"),
            approved("4", "Left Elevation", "Left Elevation – Foundation Crack"),
            approved("5", "Elevation", "no side"),
        ]);
        assert_eq!(q.elevations.front.len(), 1);
        assert_eq!(q.elevations.right.len(), 1);
        assert_eq!(q.elevations.back.len(), 1);
        assert_eq!(q.elevations.left.len(), 1);
        assert_eq!(q.damage_summary.len(), 2);
    }

    #[test]
    fn test_general_conditions() {
        let q = build_questionnaire(&[
            approved("1", "Address", "Address Confirmed – 123 Main St"),
            approved("2", "Rear Yard", "Fence leaning"),
        ]);
        assert_eq!(q.general_conditions.len(), 2);
    }

    #[test]
    fn test_unapproved_and_unlabelled_are_skipped() {
        let unapproved = Photo::captured("1", "x.jpg", "Front Slope").with_label("Missing shingles");
        let unlabelled = Photo::captured("2", "x.jpg", "Front Slope").with_label("").approved();
        let q = build_questionnaire(&[unapproved, unlabelled]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_serialized_keys() {
        let q = build_questionnaire(&[approved("1", "Address", "Address – missing numbers")]);
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"generalConditions\":[\"address – missing numbers\"]"));
        assert!(json.contains("\"damageSummary\":[\"address – missing numbers\"]"));
    }

    #[test]
    fn test_categories_order() {
        let q = Questionnaire::default();
        let names: Vec<_> = q.categories().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["elevations", "slopes", "accessories", "generalConditions", "damageSummary"]
        );
    }

    proptest! {
        #[test]
        fn prop_unapproved_never_contribute(
            entries in proptest::collection::vec(
                ("[a-zA-Z ]{0,20}", "[a-zA-Z ]{1,30}", any::<bool>()),
                0..20,
            )
        ) {
            let photos: Vec<Photo> = entries
                .iter()
                .enumerate()
                .map(|(i, (section, label, ok))| {
                    let label = if *ok { format!("ok {label}") } else { format!("zz{i}zz {label}") };
                    let photo = Photo::captured(i.to_string(), "x.jpg", section.clone()).with_label(label);
                    if *ok { photo.approved() } else { photo }
                })
                .collect();

            let json = serde_json::to_string(&build_questionnaire(&photos)).unwrap();
            for (i, (_, _, ok)) in entries.iter().enumerate() {
                if !ok {
                    let marker = format!("zz{i}zz");
                    prop_assert!(!json.contains(&marker));
                }
            }
        }
    }
}
