//! Low-level transport to the mail provider.
//!
//! A [`MailTransport`] performs exactly one request against the provider's
//! single endpoint and returns the decoded JSON payload. It knows nothing
//! about sessions or inboxes; that is [`MailSessionClient`]'s job.
//!
//! [`MailSessionClient`]: crate::client::MailSessionClient

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use maila_types::config::MailConfig;

use crate::error::{MailError, Result};

/// HTTP verb for a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Parameters go in the query string.
    Get,
    /// Parameters go in a form-encoded body.
    Post,
}

/// One provider call: the function name plus its parameters.
///
/// Parameters are an ordered list rather than a map because `del_email`
/// repeats the `email_ids[]` key once per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub function: String,
    pub method: HttpMethod,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    /// A GET call with no parameters yet.
    pub fn get(function: &str) -> Self {
        Self {
            function: function.to_string(),
            method: HttpMethod::Get,
            params: Vec::new(),
        }
    }

    /// A POST call with no parameters yet.
    pub fn post(function: &str) -> Self {
        Self {
            function: function.to_string(),
            method: HttpMethod::Post,
            params: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    /// First value for `key`, if any.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The full parameter list as sent on the wire, `f` first.
    pub fn wire_params(&self) -> Vec<(&str, &str)> {
        std::iter::once(("f", self.function.as_str()))
            .chain(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect()
    }
}

/// Performs provider calls.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Execute one call and return the decoded JSON body.
    ///
    /// # Errors
    ///
    /// [`MailError::Transport`] when the provider is unreachable,
    /// [`MailError::Protocol`] for non-2xx statuses or undecodable bodies.
    async fn call(&self, request: &ApiRequest) -> Result<Value>;
}

/// Transport for the Guerrilla Mail `ajax.php` endpoint.
pub struct GuerrillaTransport {
    api_url: String,
    http: reqwest::Client,
}

impl GuerrillaTransport {
    /// Build a transport with the configured endpoint and timeout.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            api_url: config.api_url.clone(),
            http,
        })
    }

    /// The endpoint this transport talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl std::fmt::Debug for GuerrillaTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuerrillaTransport")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MailTransport for GuerrillaTransport {
    async fn call(&self, request: &ApiRequest) -> Result<Value> {
        let params = request.wire_params();

        debug!(
            function = %request.function,
            method = ?request.method,
            params = params.len(),
            "calling mail provider"
        );

        let builder = match request.method {
            HttpMethod::Get => self.http.get(&self.api_url).query(&params),
            HttpMethod::Post => self.http.post(&self.api_url).form(&params),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(function = %request.function, %status, "mail provider returned error status");
            return Err(MailError::Protocol(format!("HTTP {status}: {body}")));
        }

        // The provider often labels JSON as text/html, so decode by hand.
        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            warn!(function = %request.function, error = %e, "undecodable provider response");
            MailError::Protocol(format!("failed to decode API response: {e}"))
        })?;

        debug!(function = %request.function, "mail provider response received");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_params_put_function_first() {
        let req = ApiRequest::post("del_email")
            .param("sid_token", "tok")
            .param("email_ids[]", "1")
            .param("email_ids[]", "2");
        assert_eq!(
            req.wire_params(),
            vec![
                ("f", "del_email"),
                ("sid_token", "tok"),
                ("email_ids[]", "1"),
                ("email_ids[]", "2"),
            ]
        );
    }

    #[test]
    fn value_returns_first_match() {
        let req = ApiRequest::get("get_email_list").param("offset", "0");
        assert_eq!(req.value("offset"), Some("0"));
        assert_eq!(req.value("sid_token"), None);
    }

    #[test]
    fn debug_shows_endpoint() {
        let transport = GuerrillaTransport::new(&MailConfig::default()).unwrap();
        let dbg = format!("{transport:?}");
        assert!(dbg.contains("api.guerrillamail.com"));
    }
}
