use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::{ClientError, Result};
use tiledoc_core::Config;

pub use reqwest::Method;

/// Outcome of a single request that reached the store.
///
/// Transport failures (DNS, TLS, connection reset) never get this far and
/// are reported as [`ClientError::Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportResponse {
    Ok { status: u16, body: String },
    Failed { status: u16, reason: String },
}

impl TransportResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, TransportResponse::Ok { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            TransportResponse::Ok { status, .. } | TransportResponse::Failed { status, .. } => {
                *status
            }
        }
    }

    /// Body of a successful response, or the error built by `on_failure`
    pub fn into_body<F>(self, on_failure: F) -> Result<String>
    where
        F: FnOnce(u16, String) -> ClientError,
    {
        match self {
            TransportResponse::Ok { body, .. } => Ok(body),
            TransportResponse::Failed { status, reason } => Err(on_failure(status, reason)),
        }
    }
}

/// Basic-auth HTTP transport shared by every client operation
pub struct Transport {
    http: HttpClient,
    user: String,
    password: String,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if config.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            http: builder.build()?,
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Send one request and classify the answer.
    ///
    /// Any 2xx status counts as success, except for DELETE which must be
    /// exactly 200.
    pub async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .basic_auth(&self.user, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, url = %url, status = status.as_u16(), "SODA request");

        if is_success(&method, status) {
            Ok(TransportResponse::Ok {
                status: status.as_u16(),
                body: response.text().await?,
            })
        } else {
            Ok(TransportResponse::Failed {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            })
        }
    }
}

fn is_success(method: &Method, status: StatusCode) -> bool {
    if *method == Method::DELETE {
        status == StatusCode::OK
    } else {
        status.is_success()
    }
}
