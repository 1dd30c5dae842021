//! The JSON-RPC 2.0 envelopes exchanged with a FISCO BCOS node, and the node's error codes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{value::RawValue, Value};
use std::fmt;
use thiserror::Error;

/// An error object returned by the node in place of a result
#[derive(Serialize, Deserialize, Debug, Clone, Error, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Classifies the error as one of the node's transaction admission failures, if it is one
    pub fn rejection(&self) -> Option<NodeRejection> {
        NodeRejection::from_code(self.code)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node error {}: {}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, " ({data})")?;
        }
        Ok(())
    }
}

/// Reasons a node refuses to admit a transaction into its pool.
///
/// The node reports these with codes from 10000 upwards, either as the error of a
/// `sendTransaction` request or as the status of the returned receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRejection {
    /// The nonce was already used by this sender
    NonceCheckFail,
    /// The block limit is already behind the chain head, or too far ahead of it
    BlockLimitCheckFail,
    TxPoolIsFull,
    /// The transaction could not be decoded
    Malformed,
    AlreadyInTxPool,
    AlreadyOnChain,
    InvalidChainId,
    InvalidGroupId,
    InvalidSignature,
    /// The request was routed to a node outside the transaction's group
    WrongGroup,
    /// The pool did not seal the transaction in time
    PoolTimeout,
}

impl NodeRejection {
    pub fn from_code(code: i64) -> Option<Self> {
        let rejection = match code {
            10000 => NodeRejection::NonceCheckFail,
            10001 => NodeRejection::BlockLimitCheckFail,
            10002 => NodeRejection::TxPoolIsFull,
            10003 => NodeRejection::Malformed,
            10004 => NodeRejection::AlreadyInTxPool,
            10005 => NodeRejection::AlreadyOnChain,
            10006 => NodeRejection::InvalidChainId,
            10007 => NodeRejection::InvalidGroupId,
            10008 => NodeRejection::InvalidSignature,
            10009 => NodeRejection::WrongGroup,
            10010 => NodeRejection::PoolTimeout,
            _ => return None,
        };
        Some(rejection)
    }

    pub fn code(&self) -> i64 {
        match self {
            NodeRejection::NonceCheckFail => 10000,
            NodeRejection::BlockLimitCheckFail => 10001,
            NodeRejection::TxPoolIsFull => 10002,
            NodeRejection::Malformed => 10003,
            NodeRejection::AlreadyInTxPool => 10004,
            NodeRejection::AlreadyOnChain => 10005,
            NodeRejection::InvalidChainId => 10006,
            NodeRejection::InvalidGroupId => 10007,
            NodeRejection::InvalidSignature => 10008,
            NodeRejection::WrongGroup => 10009,
            NodeRejection::PoolTimeout => 10010,
        }
    }

    /// Whether resubmitting with a freshly resolved nonce and block limit can succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NodeRejection::NonceCheckFail |
                NodeRejection::BlockLimitCheckFail |
                NodeRejection::TxPoolIsFull |
                NodeRejection::PoolTimeout
        )
    }
}

impl fmt::Display for NodeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}

/// An outgoing call. FISCO BCOS methods always take positional params.
#[derive(Serialize, Debug)]
pub(crate) struct Request<'a, T> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: T,
}

impl<'a, T> Request<'a, T> {
    pub(crate) fn new(id: u64, method: &'a str, params: T) -> Self {
        Self { jsonrpc: "2.0", id, method, params }
    }
}

/// A reply from the node, carrying either a result or an error
#[derive(Deserialize, Debug)]
pub(crate) struct Response {
    #[serde(default)]
    pub(crate) id: Option<u64>,
    // a `null` result is a legitimate answer, e.g. for an unknown receipt
    #[serde(default, deserialize_with = "present")]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

impl Response {
    /// The node's answer. An error wins over a result sent alongside it. `None` when the reply
    /// carries neither.
    pub(crate) fn into_outcome(self) -> Option<Result<Box<RawValue>, JsonRpcError>> {
        match (self.result, self.error) {
            (_, Some(error)) => Some(Err(error)),
            (Some(result), None) => Some(Ok(result)),
            (None, None) => None,
        }
    }
}
