//! HTTP client bound to one downstream base URL.
//!
//! The base URL is fixed at construction; every request builds its own URL
//! from path segments, so concurrent calls never share mutable request
//! state.

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use crate::error::DownstreamError;

/// A long-lived `reqwest` client for one downstream tier.
#[derive(Debug, Clone)]
pub struct DownstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DownstreamClient {
    /// Build a client for `base_url` whose requests time out after
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DownstreamError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL that can carry a path, or
    /// [`DownstreamError::Transport`] if the TLS backend cannot start.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DownstreamError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| DownstreamError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(DownstreamError::InvalidBaseUrl(base_url.to_owned()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// The downstream base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL extended with percent-encoded path `segments`.
    ///
    /// # Errors
    ///
    /// Returns [`DownstreamError::InvalidBaseUrl`] if the base cannot carry
    /// path segments.
    pub fn url(&self, segments: &[&str]) -> Result<Url, DownstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DownstreamError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and decode a JSON response.
    ///
    /// Any status outside 200-299 is an error, whatever its body.
    ///
    /// # Errors
    ///
    /// Returns [`DownstreamError`] on transport failure, non-success
    /// status, or an undecodable body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> Result<T, DownstreamError> {
        let mut request = self.http.request(method, self.url(segments)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownstreamError::Status { status });
        }
        response.json::<T>().await.map_err(DownstreamError::Decode)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> DownstreamClient {
        DownstreamClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn segments_are_appended_and_encoded() {
        let url = client("http://127.0.0.1:5008").url(&["Weapon", "type", "Two Handed"]);
        assert_eq!(
            url.unwrap().as_str(),
            "http://127.0.0.1:5008/Weapon/type/Two%20Handed"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let url = client("http://db.internal/catalog/").url(&["Effect", "7"]);
        assert_eq!(url.unwrap().as_str(), "http://db.internal/catalog/Effect/7");
    }

    #[test]
    fn relative_or_opaque_bases_are_rejected() {
        for base in ["localhost:5008/", "mailto:db@example.com", ""] {
            let result = DownstreamClient::new(base, Duration::from_secs(1));
            assert!(
                matches!(result, Err(DownstreamError::InvalidBaseUrl(_))),
                "{base} accepted"
            );
        }
    }
}
