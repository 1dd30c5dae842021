use super::jsonrpc::JsonRpcError;
use crate::{JsonRpcClient, ProviderError, RpcError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    borrow::Borrow,
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;

/// A canned answer for the [`MockProvider`]
#[derive(Clone, Debug)]
pub enum MockResponse {
    Value(Value),
    /// Answer with a node error object, e.g. a transaction pool rejection
    Error(JsonRpcError),
}

/// An in-memory node for tests. It records every request and answers with canned responses.
///
/// Responses are handed out last-in first-out: push the answer to the last request first.
/// Recorded requests come back in the order they were made.
#[derive(Clone, Debug, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    requests: VecDeque<(String, Value)>,
    responses: Vec<MockResponse>,
}

#[async_trait]
impl JsonRpcClient for MockProvider {
    type Error = MockError;

    async fn request<T: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        params: T,
    ) -> Result<R, MockError> {
        let params = serde_json::to_value(params)?;
        let response = {
            let mut state = self.state();
            state.requests.push_back((method.to_owned(), params));
            state.responses.pop().ok_or_else(|| MockError::NoResponse(method.to_owned()))?
        };
        match response {
            MockResponse::Value(value) => Ok(serde_json::from_value(value)?),
            MockResponse::Error(error) => Err(MockError::Node(error)),
        }
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // poisoning only means another test thread panicked
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pops the oldest recorded request and checks it against `method` and `params`
    pub fn assert_request<T: Serialize + Send + Sync>(
        &self,
        method: &str,
        params: T,
    ) -> Result<(), MockError> {
        let expected = (method.to_owned(), serde_json::to_value(params)?);
        let got = self.pop_request().ok_or(MockError::NoRequest)?;
        if got != expected {
            return Err(MockError::UnexpectedRequest { expected, got })
        }
        Ok(())
    }

    /// Pops the oldest recorded request without checking it
    pub fn pop_request(&self) -> Option<(String, Value)> {
        self.state().requests.pop_front()
    }

    /// Number of requests recorded and not yet popped
    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Number of pushed responses not yet consumed
    pub fn pending_responses(&self) -> usize {
        self.state().responses.len()
    }

    /// Queues a successful answer
    pub fn push<T: Serialize + Send + Sync, K: Borrow<T>>(&self, data: K) -> Result<(), MockError> {
        let value = serde_json::to_value(data.borrow())?;
        self.push_response(MockResponse::Value(value));
        Ok(())
    }

    /// Queues a transaction pool rejection with the node's code and name for it
    pub fn push_rejection(&self, rejection: crate::NodeRejection) {
        self.push_response(MockResponse::Error(JsonRpcError {
            code: rejection.code(),
            message: format!("{rejection:?}"),
            data: None,
        }));
    }

    pub fn push_response(&self, response: MockResponse) {
        self.state().responses.push(response);
    }
}

/// Errors for the [`MockProvider`]
#[derive(Error, Debug)]
pub enum MockError {
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error("no request was recorded")]
    NoRequest,

    #[error("no response queued for {0}")]
    NoResponse(String),

    #[error("expected request {expected:?}, got {got:?}")]
    UnexpectedRequest { expected: (String, Value), got: (String, Value) },

    #[error(transparent)]
    Node(JsonRpcError),
}

impl RpcError for MockError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            MockError::Node(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        ProviderError::Transport(Box::new(src))
    }
}
