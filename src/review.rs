//! Interactive label review and approval

use crate::error::{ReportError, Result};
use dialoguer::{Input, Select};
use roof_report_common::types::CaseFile;

/// One review decision for a photo
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    /// Leave as is
    Skip,
    AcceptSuggestion,
    EditLabel(String),
    Approve,
    Remove,
    /// Save and stop
    Quit,
}

/// Ids of photos still awaiting approval, in case order
pub fn pending_ids(case: &CaseFile) -> Vec<String> {
    case.photos
        .iter()
        .filter(|p| !p.is_approved())
        .map(|p| p.id.clone())
        .collect()
}

/// Apply one decision. Returns false when the review should stop.
pub fn apply_action(case: &mut CaseFile, id: &str, action: ReviewAction) -> Result<bool> {
    match action {
        ReviewAction::Skip => {}
        ReviewAction::AcceptSuggestion => case.find_mut(id)?.accept_suggestion()?,
        ReviewAction::EditLabel(label) => case.find_mut(id)?.set_user_label(label)?,
        ReviewAction::Approve => case.find_mut(id)?.approve(),
        ReviewAction::Remove => {
            case.remove(id)?;
        }
        ReviewAction::Quit => return Ok(false),
    }
    Ok(true)
}

/// Walk every unapproved photo. Returns the number of photos approved.
pub fn run_interactive_review(case: &mut CaseFile) -> Result<usize> {
    let pending = pending_ids(case);
    if pending.is_empty() {
        println!("✔ All photos are approved");
        return Ok(0);
    }

    println!("Photos awaiting review: {}", pending.len());
    println!("---\n");

    let mut approved = 0;
    for (count, id) in pending.iter().enumerate() {
        loop {
            let Some(photo) = case.find(id) else { break };
            println!("[{}/{}] {} ({})", count + 1, pending.len(), photo.image_uri, photo.section_prefix);
            println!("  Label: {}", photo.user_label());
            if !photo.ai_suggested_label.is_empty() {
                println!("  Suggestion: {}", photo.ai_suggested_label);
            }

            let action = prompt_action(!photo.ai_suggested_label.is_empty())?;
            let finished_photo = matches!(
                action,
                ReviewAction::Skip | ReviewAction::Approve | ReviewAction::Remove
            );
            if action == ReviewAction::Approve {
                approved += 1;
            }
            if !apply_action(case, id, action)? {
                println!("Saving and exiting...");
                return Ok(approved);
            }
            if finished_photo {
                println!();
                break;
            }
        }
    }

    Ok(approved)
}

fn prompt_action(has_suggestion: bool) -> Result<ReviewAction> {
    let mut items = vec!["Skip", "Edit label", "Approve", "Remove photo", "Quit"];
    if has_suggestion {
        items.insert(1, "Accept suggestion");
    }

    let choice = Select::new()
        .with_prompt("Action")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| ReportError::Prompt(e.to_string()))?;

    Ok(match items[choice] {
        "Accept suggestion" => ReviewAction::AcceptSuggestion,
        "Edit label" => {
            let label: String = Input::new()
                .with_prompt("New label")
                .interact_text()
                .map_err(|e| ReportError::Prompt(e.to_string()))?;
            ReviewAction::EditLabel(label.trim().to_string())
        }
        "Approve" => ReviewAction::Approve,
        "Remove photo" => ReviewAction::Remove,
        "Quit" => ReviewAction::Quit,
        _ => ReviewAction::Skip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roof_report_common::types::Photo;
    use roof_report_common::Error;

    fn case() -> CaseFile {
        let mut suggested = Photo::captured("2", "b.jpg", "Back Slope");
        suggested.ai_suggested_label = "Back Slope – Missing Shingles".into();
        CaseFile {
            photos: vec![
                Photo::captured("1", "a.jpg", "Address").approved(),
                suggested,
                Photo::captured("3", "c.jpg", "Shed"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_pending_ids_skip_approved() {
        assert_eq!(pending_ids(&case()), ["2", "3"]);
    }

    #[test]
    fn test_actions() {
        let mut case = case();
        assert!(apply_action(&mut case, "2", ReviewAction::AcceptSuggestion).unwrap());
        assert_eq!(case.find("2").unwrap().user_label(), "Back Slope – Missing Shingles");

        apply_action(&mut case, "3", ReviewAction::EditLabel("Shed – Rotting Fascia".into())).unwrap();
        apply_action(&mut case, "3", ReviewAction::Approve).unwrap();
        assert!(case.find("3").unwrap().is_approved());

        apply_action(&mut case, "2", ReviewAction::Remove).unwrap();
        assert!(case.find("2").is_none());
        assert!(!apply_action(&mut case, "1", ReviewAction::Quit).unwrap());
    }

    #[test]
    fn test_approved_label_is_locked() {
        let mut case = case();
        let err = apply_action(&mut case, "1", ReviewAction::EditLabel("x".into())).unwrap_err();
        assert!(matches!(err, ReportError::Common(Error::PhotoApproved(_))));
    }

    #[test]
    fn test_unknown_photo() {
        let mut case = case();
        let err = apply_action(&mut case, "99", ReviewAction::Approve).unwrap_err();
        assert!(matches!(err, ReportError::Common(Error::PhotoNotFound(_))));
    }
}
