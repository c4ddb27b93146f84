//! Upstream HTTP client.
//!
//! # Responsibilities
//! - One client abstraction for all upstream transfers
//! - Enforce the transfer timeout and the redirect-follow cap
//! - Send raw bodies untouched
//!
//! # Design Decisions
//! - The timeout bounds the whole transfer, independent of the server's
//!   own request timeout layer
//! - No automatic User-Agent or proxying; the header policy decides what
//!   crosses

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

/// HTTP client for forwarding requests to route origins.
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Build a client with the given transfer timeout and redirect cap.
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    /// Perform one upstream transfer.
    ///
    /// The body, when present, is forwarded byte for byte; no transcoding
    /// or re-encoding happens here.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(bytes) = body {
            request = request.body(bytes);
        }
        request.send().await
    }
}
