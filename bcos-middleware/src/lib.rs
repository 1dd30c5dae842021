#![cfg_attr(docsrs, feature(doc_cfg))]
//! # bcos middleware
//!
//! The [`TransactionDispatcher`] sits on top of a [`Provider`](bcos_providers::Provider) and
//! turns a [`TransactionIntent`](bcos_core::types::TransactionIntent) into a signed, submitted
//! transaction:
//!
//! 1. the intent is validated and missing fields take their configured defaults
//!    ([`DispatcherConfig`]),
//! 2. replay protection (nonce and block limit) is resolved,
//! 3. the configured [`SignerBackend`] signs the assembled transaction,
//! 4. the signed bytes are submitted and the node's receipt is returned.
//!
//! Read-only calls go through [`TransactionDispatcher::call`] and friends. Every operation has a
//! callback variant (`spawn_*`) that runs on the current tokio runtime.

mod backend;
pub use backend::{SendOptions, SignerBackend};

mod config;
pub use config::{
    DispatcherConfig, DEFAULT_BLOCK_LIMIT_OFFSET, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE,
};

mod dispatcher;
pub use dispatcher::{CallRequest, SubmissionId, TransactionDispatcher};

mod error;
pub use error::{ConfigError, DispatchError};
