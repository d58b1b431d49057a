//! Section grouping
//!
//! Two distinct strategies that give different groupings over the same data:
//! - [`group_by_section`]: exact section name, canonical order first (report)
//! - [`group_by_umbrella`]: case-insensitive substring of umbrella labels (preview)

use crate::types::Photo;

/// Canonical section order of the report
pub const CANONICAL_SECTIONS: &[&str] = &[
    "Address",
    "Front Elevation",
    "Right Elevation",
    "Back Elevation",
    "Left Elevation",
    "Roof Edge",
    "Front Slope",
    "Right Slope",
    "Back Slope",
    "Left Slope",
    "Roof Accessories",
    "Roof Conditions",
];

/// Umbrella labels used by the export preview
pub const UMBRELLA_SECTIONS: &[&str] = &[
    "Address",
    "Front",
    "Right",
    "Back",
    "Left",
    "Roof Edge",
    "Slopes",
    "Accessories",
    "Rear Yard",
];

/// Photos of one section, in encounter order
#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    pub name: String,
    pub photos: Vec<&'a Photo>,
}

/// Group photos by exact `section_prefix`.
///
/// Canonical sections come first (only those with photos), followed by any
/// other section in first-encounter order. Every photo lands in exactly one
/// group.
pub fn group_by_section(photos: &[Photo]) -> Vec<SectionGroup<'_>> {
    let mut groups: Vec<SectionGroup<'_>> = CANONICAL_SECTIONS
        .iter()
        .filter_map(|&section| {
            let matched: Vec<&Photo> = photos.iter().filter(|p| p.section_prefix == section).collect();
            (!matched.is_empty()).then(|| SectionGroup {
                name: section.to_string(),
                photos: matched,
            })
        })
        .collect();

    for photo in photos {
        if CANONICAL_SECTIONS.contains(&photo.section_prefix.as_str()) {
            continue;
        }
        match groups.iter_mut().find(|g| g.name == photo.section_prefix) {
            Some(group) => group.photos.push(photo),
            None => groups.push(SectionGroup {
                name: photo.section_prefix.clone(),
                photos: vec![photo],
            }),
        }
    }

    groups
}

/// Group photos under umbrella labels by case-insensitive substring match.
///
/// A photo may appear under several umbrellas (or none). Empty umbrellas are
/// omitted.
pub fn group_by_umbrella(photos: &[Photo]) -> Vec<SectionGroup<'_>> {
    UMBRELLA_SECTIONS
        .iter()
        .filter_map(|&umbrella| {
            let needle = umbrella.to_lowercase();
            let matched: Vec<&Photo> = photos
                .iter()
                .filter(|p| p.section_prefix.to_lowercase().contains(&needle))
                .collect();
            (!matched.is_empty()).then(|| SectionGroup {
                name: umbrella.to_string(),
                photos: matched,
            })
        })
        .collect()
}

/// Photos in group order
pub fn flatten(groups: &[SectionGroup<'_>]) -> Vec<Photo> {
    groups
        .iter()
        .flat_map(|g| g.photos.iter().map(|&p| p.clone()))
        .collect()
}
