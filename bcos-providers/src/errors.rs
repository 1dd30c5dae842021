use crate::{JsonRpcError, NodeRejection};
use std::{error::Error, fmt::Debug};
use thiserror::Error;

/// Errors a [`JsonRpcClient`](crate::JsonRpcClient) transport can fail with.
///
/// Transports differ in how they fail, but all of them can relay an error object from the node.
/// Once a transport error is boxed into a [`ProviderError`] this is how callers get it back.
pub trait RpcError: Error + Debug + Send + Sync {
    /// The error object the node answered with, if any
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Why the node refused to admit a transaction, when the error is an admission failure
    fn rejection(&self) -> Option<NodeRejection> {
        self.as_error_response().and_then(JsonRpcError::rejection)
    }
}

/// An error raised while talking to a node
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The transport failed, or the node answered with an error object
    #[error("{0}")]
    Transport(Box<dyn RpcError>),

    /// The request parameters could not be encoded
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// The node answered with a value that does not fit the expected type
    #[error("invalid response for {method}: {reason}")]
    InvalidResponse { method: &'static str, reason: String },
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            ProviderError::Transport(err) => err.as_error_response(),
            _ => None,
        }
    }
}
