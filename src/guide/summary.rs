//! Destination summary resolution
//!
//! Sequential two-tier fallback: the structured travel guide's intro
//! extract first, the encyclopedia's summary endpoint second. Both tiers
//! empty or failed means no summary; absence is representable, not an
//! error.

use serde_json::Value;
use tracing::debug;

use crate::fetch::Fetch;
use crate::models::{Summary, SummarySource};

use super::wikivoyage::WikivoyageClient;

/// Resolves summaries across the guide and encyclopedia providers
pub struct SummaryResolver {
    encyclopedia_base_url: String,
}

impl SummaryResolver {
    #[must_use]
    pub fn new(encyclopedia_base_url: String) -> Self {
        Self {
            encyclopedia_base_url,
        }
    }

    /// Resolve a summary for a destination title.
    ///
    /// The guide tier wins whenever it has a non-empty extract; the
    /// encyclopedia is only consulted after the guide tier comes up
    /// empty, never concurrently.
    pub async fn resolve(
        &self,
        guide: &WikivoyageClient,
        fetcher: &dyn Fetch,
        title: &str,
    ) -> Option<Summary> {
        match guide.summary(fetcher, title).await {
            Ok(Some((text, url))) => {
                return Some(Summary {
                    text,
                    url,
                    source: SummarySource::PrimaryGuide,
                });
            }
            Ok(None) => debug!("Guide has no summary for '{title}', trying encyclopedia"),
            Err(e) => debug!("Guide summary for '{title}' failed: {e:#}"),
        }

        self.encyclopedia_summary(fetcher, title).await
    }

    /// Encyclopedia fallback: summary lookup by title
    async fn encyclopedia_summary(&self, fetcher: &dyn Fetch, title: &str) -> Option<Summary> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.encyclopedia_base_url,
            urlencoding::encode(title)
        );

        let raw = match fetcher.get_json(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Encyclopedia summary for '{title}' failed: {e:#}");
                return None;
            }
        };

        let text = raw
            .get("extract")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())?;
        let page_url = raw
            .pointer("/content_urls/desktop/page")
            .and_then(Value::as_str)?;

        Some(Summary {
            text: text.to_string(),
            url: page_url.to_string(),
            source: SummarySource::Encyclopedia,
        })
    }
}
