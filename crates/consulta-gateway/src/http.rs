//! HTTP implementation of the lookup gateway.

use crate::error::{GatewayError, Result};
use crate::gateway::LookupGateway;
use crate::response::LookupResponse;
use async_trait::async_trait;
use consulta_core::{Cpf, GatewayConfig};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Gateway that POSTs `{ "cpf": "<digits>" }` to the lookup webhook.
///
/// Every call is bounded by the configured timeout, so a hung webhook cannot
/// stall the consultation queue indefinitely.
pub struct HttpLookupGateway {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpLookupGateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Self::with_url(&config.url, config.timeout(), &config.user_agent)
    }

    /// Create a gateway for an explicit URL and timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_url(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_send_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            GatewayError::Network(err)
        }
    }
}

#[async_trait]
impl LookupGateway for HttpLookupGateway {
    async fn lookup(&self, cpf: &Cpf) -> Result<LookupResponse> {
        tracing::debug!("POST {} for CPF {}", self.url, cpf);

        let response = self
            .client
            .post(&self.url)
            .json(&LookupRequest { cpf: cpf.as_str() })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let raw = serde_json::from_str(&body).map_err(|e| GatewayError::ParseError {
            message: format!("response is not JSON: {e}"),
        })?;

        Ok(LookupResponse::new(raw))
    }

    fn gateway_id(&self) -> &str {
        "http"
    }
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    cpf: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_from_config() {
        let config = GatewayConfig::default();
        let gateway = HttpLookupGateway::new(&config).expect("create gateway");
        assert_eq!(gateway.url(), consulta_core::config::DEFAULT_GATEWAY_URL);
        assert_eq!(gateway.timeout, Duration::from_secs(30));
        assert_eq!(gateway.gateway_id(), "http");
    }

    #[test]
    fn test_request_body_shape() {
        let cpf = Cpf::parse("123.456.789-09").expect("valid CPF");
        let body = serde_json::to_value(LookupRequest { cpf: cpf.as_str() }).expect("serialize");
        assert_eq!(body, serde_json::json!({ "cpf": "12345678909" }));
    }
}
