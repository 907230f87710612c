//! Nomad HTTP API client.

use super::{NodeClient, NodeEntry, NodeStub, QueryMeta};
use crate::dependency::QueryOptions;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const TOKEN_HEADER: &str = "x-nomad-token";
const INDEX_HEADER: &str = "x-nomad-index";
const LAST_CONTACT_HEADER: &str = "x-nomad-lastcontact";
const KNOWN_LEADER_HEADER: &str = "x-nomad-knownleader";

fn map_http_error(error: reqwest::Error) -> ClientError {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), error.to_string())
    } else if error.is_timeout() {
        ClientError::Timeout(error.to_string())
    } else if error.is_connect() {
        ClientError::Connection(error.to_string())
    } else if error.is_decode() {
        ClientError::Decode(error.to_string())
    } else {
        ClientError::Other(format!("HTTP error: {}", error))
    }
}

fn map_status(status: u16, body: String) -> ClientError {
    match status {
        401 | 403 => ClientError::Unauthorized(body),
        404 => ClientError::NotFound(body),
        429 => ClientError::RateLimited(body),
        _ => ClientError::RequestFailed { status, body },
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Read the consistency point from blocking-query response headers.
/// Missing or unparsable headers read as zero.
fn parse_query_meta(headers: &HeaderMap) -> QueryMeta {
    let last_index = header_value(headers, INDEX_HEADER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let last_contact = header_value(headers, LAST_CONTACT_HEADER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_default();
    let known_leader = header_value(headers, KNOWN_LEADER_HEADER)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    QueryMeta {
        last_index,
        last_contact,
        known_leader,
    }
}

/// Node client backed by the Nomad HTTP API
pub struct HttpNodeClient {
    client: Client,
    address: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl HttpNodeClient {
    pub fn new(
        address: impl Into<String>,
        token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Other(format!("Failed to create HTTP client: {}", e)))?;

        let address = address.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            address,
            token: token.filter(|t| !t.is_empty()),
            request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: &QueryOptions,
    ) -> Result<(T, QueryMeta), ClientError> {
        // A blocking query may legitimately be held for its whole wait time.
        let timeout = self.request_timeout + opts.wait_time.unwrap_or_default();

        let mut request = self
            .client
            .get(self.url(path))
            .query(&opts.to_query_pairs())
            .timeout(timeout);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!(path, status = status.as_u16(), "Nomad request failed");
            return Err(map_status(status.as_u16(), body));
        }

        let meta = parse_query_meta(response.headers());
        let body = response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok((body, meta))
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn node_info(
        &self,
        id: &str,
        opts: &QueryOptions,
    ) -> Result<(NodeEntry, QueryMeta), ClientError> {
        self.get(&format!("/v1/node/{}", id), opts).await
    }

    async fn list_nodes(
        &self,
        opts: &QueryOptions,
    ) -> Result<(Vec<NodeStub>, QueryMeta), ClientError> {
        self.get("/v1/nodes", opts).await
    }

    fn address(&self) -> &str {
        &self.address
    }
}
