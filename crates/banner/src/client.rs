//! Two-round-trip query client against the registration platform.
//!
//! Every call opens a fresh cookie-bearing session: a form POST binds the
//! session to the requested term, then a GET against the search endpoint
//! returns matching sections. Sessions are deliberately not reused across
//! calls; independent polls stay isolated from each other.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use seatwatch_core::config::BannerConfig;

use crate::records::{SearchResponse, SectionRecord};

/// Errors from one section query. Always recoverable: the scheduler
/// absorbs them per item per cycle and the next cycle retries naturally.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("term select returned {0}")]
    TermSelect(reqwest::StatusCode),

    #[error("query deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// Source of live section data for a (term, subject, course number) triple.
///
/// Implemented by [`BannerClient`]; the poller depends on this trait so
/// tests can script responses.
#[async_trait]
pub trait SectionSource: Send + Sync {
    /// Fetch all sections matching the triple. Platform-reported failure
    /// and "no match" both yield an empty vec; only transport problems,
    /// non-2xx term selection, or the deadline produce an error.
    async fn fetch_sections(
        &self,
        term: &str,
        subject: &str,
        course_number: &str,
    ) -> Result<Vec<SectionRecord>, QueryError>;
}

/// Query client for a Student Registration SSB deployment.
#[derive(Debug, Clone)]
pub struct BannerClient {
    base_url: String,
    timeout: Duration,
}

impl BannerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BannerConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Run the two-round-trip exchange on a fresh session.
    async fn fetch_inner(
        &self,
        term: &str,
        subject: &str,
        course_number: &str,
    ) -> Result<Vec<SectionRecord>, QueryError> {
        // Fresh client per call: the cookie store scopes the session to
        // this exchange and nothing else.
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        // Round trip 1: bind the session to the term. The platform ignores
        // the placeholder fields but requires them on the form.
        let term_url = format!("{}/term/search?mode=search", self.base_url);
        let form = [
            ("term", term),
            ("studyPath", ""),
            ("studyPathText", ""),
            ("startDatepicker", ""),
            ("endDatepicker", ""),
        ];
        let response = client.post(&term_url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, term, "term select returned non-2xx");
            return Err(QueryError::TermSelect(status));
        }

        // Round trip 2: section search on the now term-bound session.
        let search_url = format!("{}/searchResults/searchResults", self.base_url);
        let envelope: SearchResponse = client
            .get(&search_url)
            .query(&[
                ("txt_subject", subject),
                ("txt_courseNumber", course_number),
                ("txt_term", term),
                ("pageOffset", "0"),
                ("pageMaxSize", "50"),
                ("sortColumn", "subjectDescription"),
                ("sortDirection", "asc"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !envelope.success {
            // Platform-reported failure is indistinguishable from "no
            // match" for callers; both are empty results.
            debug!(term, subject, course_number, "search reported success=false");
            return Ok(Vec::new());
        }

        let records = envelope.data.unwrap_or_default();
        debug!(term, subject, course_number, count = records.len(), "sections fetched");
        Ok(records)
    }
}

#[async_trait]
impl SectionSource for BannerClient {
    async fn fetch_sections(
        &self,
        term: &str,
        subject: &str,
        course_number: &str,
    ) -> Result<Vec<SectionRecord>, QueryError> {
        // One deadline bounds the whole exchange, not each round trip.
        match tokio::time::timeout(self.timeout, self.fetch_inner(term, subject, course_number))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(QueryError::DeadlineExceeded(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_takes_base_url_and_timeout() {
        let cfg = BannerConfig {
            base_url: "https://reg.test.edu/StudentRegistrationSsb/ssb".into(),
            timeout_secs: 15,
        };
        let client = BannerClient::from_config(&cfg);
        assert_eq!(client.base_url, cfg.base_url);
        assert_eq!(client.timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn deadline_exceeded_maps_to_query_error() {
        // Unroutable address (RFC 5737 TEST-NET) with a tiny deadline.
        let client = BannerClient::new("http://192.0.2.1", Duration::from_millis(50));
        let err = client
            .fetch_sections("252", "ENGL", "214")
            .await
            .unwrap_err();
        match err {
            QueryError::DeadlineExceeded(_) | QueryError::Http(_) => {}
            other => panic!("expected transport-level error, got: {other:?}"),
        }
    }
}
