//! HTTP fetch seam and the tiered fallback resolver
//!
//! Every provider adapter goes through the [`Fetch`] trait so tests can
//! substitute canned responses and count upstream calls. The resolver
//! implements the "try candidates in order, stop at the first usable
//! result" policy shared by the place adapter and reusable for any
//! provider with ordered fallback queries.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::PlaceScoutError;

/// Minimal JSON-over-HTTP fetch interface
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform a GET request and parse the body as JSON.
    ///
    /// Non-2xx statuses are errors; callers decide how to degrade.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Production fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured timeout and user agent
    pub fn new(config: &HttpConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PlaceScoutError::provider(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| "Request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Upstream returned {status}"));
        }

        let body = response
            .json()
            .await
            .with_context(|| "Failed to parse response body as JSON")?;
        Ok(body)
    }
}

/// One concrete parameterization of an upstream request, part of an
/// ordered fallback sequence
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Short label for logging
    pub label: &'static str,
    /// Fully built request URL
    pub url: String,
}

impl Candidate {
    #[must_use]
    pub fn new(label: &'static str, url: String) -> Self {
        Self { label, url }
    }
}

/// Try candidates strictly in order and return the first accepted result.
///
/// For each candidate the response is fetched and normalized; a transport
/// failure, non-success status or unaccepted normalization advances to the
/// next candidate instead of raising. Order encodes a quality preference,
/// so candidate `k + 1` is never started before candidate `k`'s outcome is
/// known. If every candidate fails the scan returns an empty vec: absence
/// of data is an expected, representable outcome, not an error.
pub async fn first_acceptable<T>(
    fetcher: &dyn Fetch,
    candidates: &[Candidate],
    normalize: impl Fn(&Value) -> Vec<T>,
    accept: impl Fn(&[T]) -> bool,
) -> Vec<T> {
    for candidate in candidates {
        let raw = match fetcher.get_json(&candidate.url).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Candidate '{}' failed: {e:#}", candidate.label);
                continue;
            }
        };

        let normalized = normalize(&raw);
        if accept(&normalized) {
            debug!(
                "Candidate '{}' accepted with {} items",
                candidate.label,
                normalized.len()
            );
            return normalized;
        }
        debug!("Candidate '{}' yielded no usable data", candidate.label);
    }
    Vec::new()
}

/// Default acceptance: any non-empty normalized result
#[must_use]
pub fn non_empty<T>(items: &[T]) -> bool {
    !items.is_empty()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test fetcher replaying canned results in order and recording calls
    pub(crate) struct ScriptedFetch {
        responses: Mutex<Vec<Result<Value>>>,
        pub calls: AtomicUsize,
        pub urls: Mutex<Vec<String>>,
    }

    impl ScriptedFetch {
        pub fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetch {
        async fn get_json(&self, url: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(anyhow!("no scripted response left"));
            }
            responses.remove(0)
        }
    }

    fn numbers(raw: &Value) -> Vec<i64> {
        raw.as_array()
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new("tier", format!("https://example.test/q{i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let fetcher = ScriptedFetch::new(vec![Ok(json!([1, 2, 3])), Ok(json!([9]))]);
        let result = first_acceptable(&fetcher, &candidates(3), numbers, non_empty).await;

        assert_eq!(result, vec![1, 2, 3]);
        // Candidate 2 and 3 must never have been started
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_advances_to_next_candidate() {
        let fetcher = ScriptedFetch::new(vec![Err(anyhow!("connection refused")), Ok(json!([7]))]);
        let result = first_acceptable(&fetcher, &candidates(2), numbers, non_empty).await;

        assert_eq!(result, vec![7]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_normalization_advances() {
        let fetcher = ScriptedFetch::new(vec![Ok(json!([])), Ok(json!("not a list")), Ok(json!([4]))]);
        let result = first_acceptable(&fetcher, &candidates(3), numbers, non_empty).await;

        assert_eq!(result, vec![4]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_empty_not_error() {
        let fetcher = ScriptedFetch::new(vec![Err(anyhow!("down")), Ok(json!([])), Err(anyhow!("down"))]);
        let result = first_acceptable(&fetcher, &candidates(3), numbers, non_empty).await;

        assert!(result.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_candidates_tried_in_order() {
        let fetcher = ScriptedFetch::new(vec![Ok(json!([])), Ok(json!([])), Ok(json!([1]))]);
        let _ = first_acceptable(&fetcher, &candidates(3), numbers, non_empty).await;

        let urls = fetcher.urls.lock().unwrap();
        assert_eq!(
            *urls,
            vec![
                "https://example.test/q0",
                "https://example.test/q1",
                "https://example.test/q2"
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_acceptance_predicate() {
        // Require at least two items; the first candidate's single item
        // is not good enough.
        let fetcher = ScriptedFetch::new(vec![Ok(json!([1])), Ok(json!([1, 2]))]);
        let result =
            first_acceptable(&fetcher, &candidates(2), numbers, |items: &[i64]| items.len() >= 2)
                .await;

        assert_eq!(result, vec![1, 2]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
