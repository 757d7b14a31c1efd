//! HTTP exchange with the pump.
//!
//! The client talks to the pump through the [`Transport`] trait so that
//! tests can substitute a recording fake. [`HttpTransport`] is the real
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::request::{Method, Request};
use crate::tracing::prelude::*;

/// Failures below the protocol level: the pump was not reached, or what
/// came back was not a usable HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON. Only a body that is not JSON at all is a
    /// transport failure; the shape is for the caller to judge.
    pub fn json(&self) -> Result<Value, TransportError> {
        serde_json::from_str(&self.body)
            .map_err(|e| TransportError::Malformed(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange, bounded by `timeout`.
    async fn execute(&self, request: &Request, timeout: Duration)
    -> Result<Response, TransportError>;
}

/// Transport over plain HTTP using reqwest.
///
/// Each call builds its own `reqwest::Client` and drops it on return, so
/// no connection outlives a single operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &Request,
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Http(e)
            }
        };

        let session = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Http)?;

        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        trace!(method = %request.method(), url = %request.endpoint, "Sending request");

        let response = session
            .request(method, &request.endpoint)
            .query(&request.query())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        Ok(Response { status, body })
    }
}

/// Recording fake for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays queued results in order and records every request it sees.
    #[derive(Default)]
    pub(crate) struct SpyTransport {
        replies: Mutex<VecDeque<Result<Response, TransportError>>>,
        requests: Mutex<Vec<Request>>,
    }

    impl SpyTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(self, status: StatusCode, body: impl Into<String>) -> Self {
            self.push(Ok(Response::new(status, body)));
            self
        }

        pub(crate) fn fail(self, error: TransportError) -> Self {
            self.push(Err(error));
            self
        }

        fn push(&self, reply: Result<Response, TransportError>) {
            self.replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(reply);
        }

        pub(crate) fn requests(&self) -> Vec<Request> {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }
    }

    #[async_trait]
    impl Transport for SpyTransport {
        async fn execute(
            &self,
            request: &Request,
            _timeout: Duration,
        ) -> Result<Response, TransportError> {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(request.clone());
            self.replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Malformed("no reply queued".into())))
        }
    }
}
