//! Shared JSON-over-HTTP plumbing for the service adapters
//!
//! One place owns the timeout, the retry budget and the interpretation of
//! `{success, ...}` replies, so the typed clients only name paths.

use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{HedgeError, Result};
use crate::gateway::ServiceReply;

#[derive(Clone)]
pub struct ServiceTransport {
    http: Client,
    base_url: String,
    policy: HttpConfig,
}

impl ServiceTransport {
    pub fn new(base_url: &str, policy: HttpConfig, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(policy.timeout())
            .build()
            .map_err(|e| HedgeError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    /// Send a request, retrying transport failures within the budget.
    ///
    /// Non-idempotent methods are only replayed when the failure shows the
    /// service never processed the request. `fallback` is the message used
    /// when the service rejects the request without an `error` text.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
        fallback: &str,
    ) -> Result<T> {
        let mut attempt: u32 = 0;
        let idempotent = is_idempotent(&method);

        loop {
            match self.send_once(&method, path, query, body, fallback).await {
                Ok(value) => return Ok(value),
                Err(e)
                    if e.is_retryable()
                        && (idempotent || e.is_unprocessed())
                        && attempt < u32::from(self.policy.max_retries) =>
                {
                    attempt += 1;
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        %method,
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "request failed, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(HedgeError::Network(format!(
                        "{} {} failed after {} attempts: {}",
                        method,
                        path,
                        attempt + 1,
                        e
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
        fallback: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();

        let mut req = self.http.request(method.clone(), &url);
        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").json(body);
        }

        let resp = req.send().await.map_err(|e| transport_error(e, started))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error(e, started))?;
        debug!(
            %method,
            path,
            %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        let value = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };

        // A tagged reply is authoritative at any status
        if let Some(value) = value.clone() {
            if let Some(reply) = ServiceReply::<T>::from_value(value)? {
                return reply.into_result(fallback);
            }
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(HedgeError::Unavailable {
                status: status.as_u16(),
                message: format!("{} {} returned {}", method, path, status),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(HedgeError::NotFound(format!("{} {}", method, path)));
        }

        if !status.is_success() {
            return Err(HedgeError::InvalidResponse(format!(
                "{} {} failed: status={} body={}",
                method, path, status, text
            )));
        }

        let value = value.unwrap_or_else(|| Value::Object(Default::default()));
        serde_json::from_value(value)
            .map_err(|e| HedgeError::InvalidResponse(format!("unexpected payload shape: {}", e)))
    }
}

/// PATCH here sets an absolute status, so replaying it is harmless
fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS | Method::PATCH
    )
}

fn transport_error(e: reqwest::Error, started: Instant) -> HedgeError {
    if e.is_timeout() {
        HedgeError::Timeout {
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    } else {
        HedgeError::Http(e)
    }
}
