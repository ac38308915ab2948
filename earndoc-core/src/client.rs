//! Summary fetching over HTTP.
//!
//! One authenticated GET per (symbol, quarter) against the earnings proxy,
//! retried with exponential backoff. Every non-200 status, network fault,
//! and undecodable 200 body is retried identically up to the budget; only
//! then does the failure escalate. The wire exchange sits behind
//! [`SummaryTransport`] so the retry loop can be tested against scripted
//! response sequences.

use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;
use crate::targets::Target;

/// Header carrying the shared-secret auth key.
pub const ACTION_KEY_HEADER: &str = "x-action-key";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Retry budget and backoff schedule for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt, so `max_retries + 1` attempts total.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each retry after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff after failed attempt `attempt` (0-indexed): `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Source of summary payloads, abstracted so the run loop can be driven
/// without a live endpoint.
pub trait SummaryProvider {
    /// Fetch the payload for one target, retrying transient failures
    /// internally. An error means the retry budget is already spent.
    fn fetch(&self, target: &Target) -> Result<Value, FetchError>;
}

/// Raw status and body from a single HTTP exchange.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

/// A single exchange with the endpoint. The retry loop sits above this seam.
pub trait SummaryTransport {
    fn get(
        &self,
        base_url: &str,
        action_key: &str,
        symbol: &str,
        quarter: &str,
    ) -> Result<WireResponse, FetchError>;
}

/// Production transport: blocking reqwest with a fixed timeout.
pub struct ReqwestTransport {
    http: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }
}

impl SummaryTransport for ReqwestTransport {
    fn get(
        &self,
        base_url: &str,
        action_key: &str,
        symbol: &str,
        quarter: &str,
    ) -> Result<WireResponse, FetchError> {
        let url = format!("{base_url}/summary");
        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", symbol), ("quarter", quarter)])
            .header(ACTION_KEY_HEADER, action_key)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(WireResponse { status, body })
    }
}

/// Client for the earnings proxy: a transport plus the retry loop.
pub struct ProxyClient {
    transport: Box<dyn SummaryTransport>,
    base_url: String,
    action_key: String,
    retry: RetryPolicy,
}

impl ProxyClient {
    pub fn new(
        base_url: &str,
        action_key: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self::with_transport(
            Box::new(ReqwestTransport::new(timeout)),
            base_url,
            action_key,
            retry,
        )
    }

    /// Client over a custom transport; tests use this to script responses.
    pub fn with_transport(
        transport: Box<dyn SummaryTransport>,
        base_url: &str,
        action_key: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            action_key: action_key.into(),
            retry,
        }
    }

    /// One attempt: wire exchange, status check, JSON decode.
    fn attempt(&self, symbol: &str, quarter: &str) -> Result<Value, FetchError> {
        let wire = self
            .transport
            .get(&self.base_url, &self.action_key, symbol, quarter)?;
        if wire.status != 200 {
            return Err(FetchError::Status {
                status: wire.status,
                body: wire.body,
            });
        }
        serde_json::from_str(&wire.body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn fetch_with_retry(&self, symbol: &str, quarter: &str) -> Result<Value, FetchError> {
        let mut last_error = None;
        for attempt in 0..=self.retry.max_retries {
            match self.attempt(symbol, quarter) {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    if attempt < self.retry.max_retries {
                        let delay = self.retry.backoff(attempt);
                        println!("Retrying {symbol} {quarter} in {}s: {e}", delay.as_secs());
                        thread::sleep(delay);
                    }
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| FetchError::Network("retry budget exhausted".to_string())))
    }
}

impl SummaryProvider for ProxyClient {
    fn fetch(&self, target: &Target) -> Result<Value, FetchError> {
        self.fetch_with_retry(&target.symbol, &target.quarter)
    }
}
