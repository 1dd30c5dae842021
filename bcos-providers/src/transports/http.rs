use super::jsonrpc::{JsonRpcError, Request, Response};
use crate::{errors::ProviderError, JsonRpcClient, RpcError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use thiserror::Error;
use url::Url;

/// Talks to a node's JSON-RPC endpoint over HTTP, one POST per request.
///
/// # Example
///
/// ```no_run
/// use bcos_providers::{Http, JsonRpcClient};
/// use std::str::FromStr;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let node = Http::from_str("http://127.0.0.1:20200")?;
/// let block_number: u64 = node.request("getBlockNumber", ["group0", ""]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Http {
    next_id: AtomicU64,
    client: Client,
    url: Url,
}

/// Ways a request over HTTP can fail
#[derive(Error, Debug)]
pub enum HttpClientError {
    /// The connection failed or timed out
    #[error(transparent)]
    Connection(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status
    #[error("node answered with HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Node(#[from] JsonRpcError),

    /// The reply is not a JSON-RPC response, or its result does not have the expected shape
    #[error("could not decode reply: {err}. Reply: {body}")]
    Decode { err: serde_json::Error, body: String },

    /// The reply carried neither a result nor an error
    #[error("reply to request {id} carried neither a result nor an error")]
    EmptyReply { id: u64 },

    #[error("reply to request {expected} is tagged with id {got}")]
    IdMismatch { expected: u64, got: u64 },
}

impl From<HttpClientError> for ProviderError {
    fn from(src: HttpClientError) -> Self {
        ProviderError::Transport(Box::new(src))
    }
}

impl RpcError for HttpClientError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            HttpClientError::Node(err) => Some(err),
            _ => None,
        }
    }
}

#[async_trait]
impl JsonRpcClient for Http {
    type Error = HttpClientError;

    async fn request<T: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        params: T,
    ) -> Result<R, HttpClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request::new(id, method, params);
        let res = self.client.post(self.url.clone()).json(&request).send().await?;

        let status = res.status();
        let body = res.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            return Err(HttpClientError::Status { status, body })
        }

        let reply: Response = serde_json::from_slice(&body).map_err(|err| {
            HttpClientError::Decode { err, body: String::from_utf8_lossy(&body).into_owned() }
        })?;
        if let Some(got) = reply.id.filter(|got| *got != id) {
            return Err(HttpClientError::IdMismatch { expected: id, got })
        }

        let raw = reply.into_outcome().ok_or(HttpClientError::EmptyReply { id })??;
        serde_json::from_str(raw.get())
            .map_err(|err| HttpClientError::Decode { err, body: raw.get().to_owned() })
    }
}

impl Http {
    /// Connects to the endpoint with a default client
    ///
    /// # Example
    ///
    /// ```
    /// use bcos_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://127.0.0.1:20200").unwrap();
    /// let node = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// Connects to the endpoint, failing any request the node takes longer than `timeout` to
    /// answer. `sendTransaction` blocks until the transaction is executed, so leave room for a
    /// few block intervals.
    pub fn with_timeout(url: impl Into<Url>, timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(url, client))
    }

    /// Uses a preconfigured client, e.g. one carrying the chain's TLS certificates
    pub fn new_with_client(url: impl Into<Url>, client: Client) -> Self {
        Self { next_id: AtomicU64::new(1), client, url: url.into() }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FromStr for Http {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Ok(Http::new(Url::parse(src)?))
    }
}

impl Clone for Http {
    fn clone(&self) -> Self {
        Self::new_with_client(self.url.clone(), self.client.clone())
    }
}
