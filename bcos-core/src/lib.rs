#![cfg_attr(docsrs, feature(doc_cfg))]
//! FISCO BCOS types, cryptography and utilities.
//!
//! This crate defines the values that flow through the transaction pipeline:
//!
//! - [`TransactionIntent`](types::TransactionIntent): what the caller wants to happen on chain,
//!   before any defaults are applied or anything is signed.
//! - [`TypedTransaction`](types::transaction::TypedTransaction): the assembled wire transaction,
//!   either legacy-priced or EIP-1559 priced, ready to be hashed and signed.
//! - [`TransactionReceipt`](types::TransactionReceipt) and [`CallResult`](types::CallResult):
//!   what the node hands back.
//!
//! # Revert reasons
//!
//! A failed receipt may carry an ABI encoded `Error(string)` payload in its output. The
//! [`abi::revert`] module recognizes both the keccak-256 and the SM3 selector and decodes the
//! message. Decoding is best effort and never fails loudly:
//!
//! ```
//! use bcos_core::abi::{self, revert::try_resolve_revert_message, Token};
//!
//! let encoded = abi::encode(&[Token::String("not owner".to_string())]);
//! let output = format!("0x08c379a0{}", hex::encode(encoded));
//!
//! let resolution = try_resolve_revert_message(1, &output);
//! assert_eq!(resolution.message(), Some("not owner"));
//!
//! // a successful receipt is never inspected
//! assert!(!try_resolve_revert_message(0, &output).found());
//! ```
pub mod types;

pub mod abi;

/// Various utilities
pub mod utils;

// re-export rand to avoid potential confusion when there's rand version mismatches
pub use rand;

// re-export k256
pub use k256;
