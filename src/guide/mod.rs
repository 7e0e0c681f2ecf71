//! Travel guide subsystem
//!
//! Retrieves structured guide content for a destination title: the
//! section outline, per-section markup (sanitized and cached with
//! single-flight semantics), and the two-tier destination summary.

pub mod cache;
pub mod sanitize;
pub mod sections;
pub mod summary;
pub mod wikivoyage;

pub use cache::{SECTION_UNAVAILABLE, SectionCache, SectionKey};
pub use sanitize::sanitize_section;
pub use sections::resolve_section_refs;
pub use summary::SummaryResolver;
pub use wikivoyage::{RawSection, WikivoyageClient};
