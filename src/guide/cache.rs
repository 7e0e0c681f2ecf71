//! Guide section cache
//!
//! Per `(title, section id)` memoization of sanitized section markup with
//! single-flight semantics: concurrent requesters for one key share a
//! single upstream fetch and observe the same resolved value. Entries
//! never expire within a process run; guide content for a fixed title and
//! section is treated as stable for session lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::fetch::Fetch;
use crate::models::GuideSectionRef;

use super::sanitize::sanitize_section;
use super::wikivoyage::WikivoyageClient;

/// Sentinel returned (and possibly cached) for a failed section fetch
pub const SECTION_UNAVAILABLE: &str = "Section unavailable.";

/// Cache key: section ids are only meaningful per title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub title: String,
    pub section_id: i64,
}

/// Process-wide cache of sanitized guide sections
pub struct SectionCache {
    entries: Mutex<HashMap<SectionKey, Arc<OnceCell<String>>>>,
    /// Whether failed fetches are cached as the unavailable sentinel
    /// (stable for the session) or left uncached (retry on demand)
    cache_failures: bool,
}

impl SectionCache {
    #[must_use]
    pub fn new(cache_failures: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            cache_failures,
        }
    }

    /// Get the sanitized markup for one section, fetching at most once.
    ///
    /// A cached key is served without any network call. Otherwise the
    /// section is fetched, sanitized against the title and stored; a
    /// fetch failure yields the [`SECTION_UNAVAILABLE`] sentinel, cached
    /// or not per the configured failure policy.
    pub async fn get(
        &self,
        client: &WikivoyageClient,
        fetcher: &dyn Fetch,
        title: &str,
        section_id: i64,
    ) -> String {
        let key = SectionKey {
            title: title.to_string(),
            section_id,
        };

        // One OnceCell per key carries the single-flight guarantee; the
        // map lock is only held long enough to hand the cell out.
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        if self.cache_failures {
            return cell
                .get_or_init(|| async {
                    match client.section_html(fetcher, title, section_id).await {
                        Ok(raw) => sanitize_section(&raw, title, client.home_url()),
                        Err(e) => {
                            warn!("Section {section_id} of '{title}' unavailable: {e:#}");
                            SECTION_UNAVAILABLE.to_string()
                        }
                    }
                })
                .await
                .clone();
        }

        let result = cell
            .get_or_try_init(|| async {
                let raw = client.section_html(fetcher, title, section_id).await?;
                anyhow::Ok(sanitize_section(&raw, title, client.home_url()))
            })
            .await;

        match result {
            Ok(html) => html.clone(),
            Err(e) => {
                warn!("Section {section_id} of '{title}' unavailable: {e:#}");
                // Drop the slot so a later request may retry
                self.entries.lock().await.remove(&key);
                SECTION_UNAVAILABLE.to_string()
            }
        }
    }

    /// Prefetch every resolved section concurrently and return the first
    /// ref's content for immediate display.
    ///
    /// All fetches run with no ordering guarantee among them; the initial
    /// view is only produced once the entire batch has completed, at
    /// which point every other section is served from cache with zero
    /// additional latency.
    pub async fn prefetch_all(
        &self,
        client: &WikivoyageClient,
        fetcher: &dyn Fetch,
        title: &str,
        refs: &[GuideSectionRef],
    ) -> Option<String> {
        if refs.is_empty() {
            return None;
        }

        debug!("Prefetching {} guide sections for '{title}'", refs.len());
        let fetches = refs
            .iter()
            .map(|section| self.get(client, fetcher, title, section.section_id));
        let mut contents = join_all(fetches).await;
        Some(contents.swap_remove(0))
    }
}
