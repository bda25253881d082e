//! Record source: one blocking HTTP GET against a JSON API.
//!
//! [`HttpSource`] never fails past its [`RecordSource::fetch`] boundary. Any
//! network error, timeout, non-success status or unexpected body is logged
//! and reported as "no records". Use [`HttpSource::try_fetch`] to see the
//! underlying [`FetchError`].

use crate::table::Record;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameter carrying the optional filter id.
pub const FILTER_PARAM: &str = "userId";

/// Anything that can yield one batch of raw records.
pub trait RecordSource {
    /// Fetch all records. An empty result means "no data", whatever the cause.
    fn fetch(&self) -> Vec<Record>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no base URL configured")]
    MissingBaseUrl,
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response body from {url}: {reason}")]
    UnexpectedShape { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    filter_id: Option<String>,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, filter_id: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            filter_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query parameters for the request; the filter is only sent when non-empty.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self.filter_id.as_deref() {
            Some(id) if !id.trim().is_empty() => vec![(FILTER_PARAM, id.to_string())],
            _ => Vec::new(),
        }
    }

    /// Perform the request and parse the body as a JSON array of objects.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] for a missing URL, any transport or status
    /// failure, or a body that is not an array of objects.
    pub fn try_fetch(&self) -> Result<Vec<Record>, FetchError> {
        if self.base_url.trim().is_empty() {
            return Err(FetchError::MissingBaseUrl);
        }
        let url = self.base_url.clone();
        let request_err = |source| FetchError::Request {
            url: url.clone(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(request_err)?;
        let body: Value = client
            .get(&self.base_url)
            .query(&self.query_params())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json)
            .map_err(request_err)?;

        into_records(body).map_err(|reason| FetchError::UnexpectedShape { url, reason })
    }
}

impl RecordSource for HttpSource {
    fn fetch(&self) -> Vec<Record> {
        match self.try_fetch() {
            Ok(records) => {
                info!(
                    "Fetched {} records from {} with params {:?}",
                    records.len(),
                    self.base_url,
                    self.query_params()
                );
                records
            }
            Err(e) => {
                error!("Failed to fetch records: {e}");
                Vec::new()
            }
        }
    }
}

fn into_records(body: Value) -> Result<Vec<Record>, String> {
    let Value::Array(items) = body else {
        return Err("expected a JSON array".to_string());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(format!("element #{i} is not an object: {other}")),
        })
        .collect()
}
