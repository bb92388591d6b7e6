//! HTTP GET against the project site.

use std::time::Duration;

use ddev_e2e_common::error::{E2eError, Result};

/// Fetches a response body from a URL.
pub trait HttpProbe: Send + Sync {
    /// Issues an unauthenticated GET and returns the body.
    ///
    /// The status code is not inspected.
    ///
    /// # Errors
    ///
    /// Returns an error if no response body could be read.
    fn get(&self, url: &str) -> Result<String>;
}

impl<T: HttpProbe + ?Sized> HttpProbe for std::sync::Arc<T> {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

/// Probe backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::blocking::Client,
}

impl ReqwestProbe {
    /// Creates a probe with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| E2eError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Creates a probe around a preconfigured client.
    #[must_use]
    pub const fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpProbe for ReqwestProbe {
    fn get(&self, url: &str) -> Result<String> {
        tracing::info!(url, "probing site");
        let response = self.client.get(url).send().map_err(|e| E2eError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().map_err(|e| E2eError::Http {
            url: url.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;
        tracing::debug!(url, %status, bytes = body.len(), "site responded");
        Ok(body)
    }
}
