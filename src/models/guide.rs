//! Guide and summary models

use serde::{Deserialize, Serialize};

/// Resolved mapping from a stable topic label to a provider section id
///
/// The id is only meaningful for the `(title, provider)` pair it was
/// resolved against and must never be reused across titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideSectionRef {
    /// Canonical topic label, e.g. "Get in" or "Stay safe"
    pub label: String,
    /// Provider-specific numeric section id
    pub section_id: i64,
}

/// Which provider a summary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummarySource {
    /// Structured travel guide (primary tier)
    PrimaryGuide,
    /// Encyclopedia (fallback tier)
    Encyclopedia,
}

impl SummarySource {
    /// Human-readable attribution label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            SummarySource::PrimaryGuide => "Wikivoyage",
            SummarySource::Encyclopedia => "Wikipedia",
        }
    }
}

/// Short descriptive summary of a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Introductory extract text
    pub text: String,
    /// Canonical page URL for attribution
    pub url: String,
    /// Provider the summary originates from
    pub source: SummarySource,
}
