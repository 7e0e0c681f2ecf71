//! Guide section index
//!
//! Maps the fixed ordered vocabulary of wanted topic labels onto a
//! provider's volatile section listing by case-insensitive label match.

use std::collections::HashMap;

use crate::models::GuideSectionRef;

use super::wikivoyage::RawSection;

/// Resolve the wanted topic labels against a section listing.
///
/// Emits one ref per vocabulary entry that has a matching section,
/// preserving vocabulary order and skipping entries with no match. An
/// empty result means "guide unavailable" to callers, not an error.
#[must_use]
pub fn resolve_section_refs(wanted: &[String], sections: &[RawSection]) -> Vec<GuideSectionRef> {
    let mut by_label: HashMap<String, i64> = HashMap::new();
    for section in sections {
        let Some(line) = section.line.as_deref() else {
            continue;
        };
        let Some(id) = section.section_id() else {
            continue;
        };
        // First occurrence wins on duplicate headings
        by_label.entry(line.trim().to_lowercase()).or_insert(id);
    }

    wanted
        .iter()
        .filter_map(|label| {
            by_label
                .get(&label.trim().to_lowercase())
                .map(|&section_id| GuideSectionRef {
                    label: label.clone(),
                    section_id,
                })
        })
        .collect()
}
