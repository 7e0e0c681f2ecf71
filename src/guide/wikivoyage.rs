//! Structured-guide provider client (Wikivoyage MediaWiki API)
//!
//! Three modes: summary (intro extract + canonical URL), outline (section
//! listing for a title) and section (rendered markup for one section id).

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::fetch::Fetch;

/// One entry of a guide's section listing
///
/// The API reports the section index as a string; transcluded sections
/// carry non-numeric indices and are unusable for section fetches.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSection {
    /// Human-readable heading
    #[serde(default)]
    pub line: Option<String>,
    /// Section index as reported by the provider
    #[serde(default)]
    pub index: String,
}

impl RawSection {
    /// Numeric section id, if the index is usable
    #[must_use]
    pub fn section_id(&self) -> Option<i64> {
        self.index.parse().ok()
    }
}

/// Client for the structured-guide provider
pub struct WikivoyageClient {
    base_url: String,
}

impl WikivoyageClient {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// Home domain of the provider, used to absolutize relative links
    #[must_use]
    pub fn home_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, query: &str) -> String {
        format!("{}/w/api.php?origin=*&format=json&{query}", self.base_url)
    }

    /// Canonical page URL for a title
    #[must_use]
    pub fn page_url(&self, title: &str) -> String {
        format!("{}/wiki/{}", self.base_url, urlencoding::encode(title))
    }

    /// Fetch the full section listing for a title (outline mode)
    pub async fn outline(&self, fetcher: &dyn Fetch, title: &str) -> Result<Vec<RawSection>> {
        let url = self.api_url(&format!(
            "action=parse&page={}&prop=sections",
            urlencoding::encode(title)
        ));
        let raw = fetcher.get_json(&url).await?;

        let sections = raw
            .pointer("/parse/sections")
            .cloned()
            .ok_or_else(|| anyhow!("Outline response has no section listing"))?;
        let sections: Vec<RawSection> = serde_json::from_value(sections)?;
        debug!("Outline for '{title}' lists {} sections", sections.len());
        Ok(sections)
    }

    /// Fetch the rendered markup for one numeric section id (section mode)
    pub async fn section_html(
        &self,
        fetcher: &dyn Fetch,
        title: &str,
        section_id: i64,
    ) -> Result<String> {
        let url = self.api_url(&format!(
            "action=parse&page={}&section={section_id}&prop=text",
            urlencoding::encode(title)
        ));
        let raw = fetcher.get_json(&url).await?;

        raw.pointer("/parse/text/*")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| anyhow!("Section response has no rendered text"))
    }

    /// Fetch the introductory extract and canonical URL for a title
    /// (summary mode). Returns `None` when the page exists but has no
    /// usable extract.
    pub async fn summary(
        &self,
        fetcher: &dyn Fetch,
        title: &str,
    ) -> Result<Option<(String, String)>> {
        let url = self.api_url(&format!(
            "action=query&prop=extracts%7Cinfo&inprop=url&exintro=1&explaintext=1&titles={}",
            urlencoding::encode(title)
        ));
        let raw = fetcher.get_json(&url).await?;

        let Some(pages) = raw.pointer("/query/pages").and_then(Value::as_object) else {
            return Ok(None);
        };
        let Some(first) = pages.values().next() else {
            return Ok(None);
        };

        let extract = first
            .get("extract")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let Some(extract) = extract else {
            return Ok(None);
        };

        let url = first
            .get("fullurl")
            .and_then(Value::as_str)
            .map_or_else(|| self.page_url(title), String::from);
        Ok(Some((extract.to_string(), url)))
    }
}
