#![cfg_attr(docsrs, feature(doc_cfg))]
//! Clients for interacting with FISCO BCOS nodes.
//!
//! A [`Provider`] wraps a [`JsonRpcClient`] transport and exposes the typed node methods the
//! transaction pipeline consumes: the current block number, transaction submission, receipts and
//! read-only calls. Transports are pluggable; [`Http`] talks to a node's JSON-RPC endpoint and
//! [`MockProvider`] replays canned responses in tests.
//!
//! ```no_run
//! use bcos_providers::{Http, Provider};
//! use std::convert::TryFrom;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://127.0.0.1:20200")?.with_group("group0");
//! let block_number = provider.get_block_number().await?;
//! # Ok(())
//! # }
//! ```
mod transports;
pub use transports::*;

mod connections;
pub use connections::JsonRpcClient;

mod errors;
pub use errors::{ProviderError, RpcError};

mod provider;
pub use provider::{Provider, DEFAULT_GROUP};
