#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![doc(test(
    no_crate_inject,
    attr(deny(rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # bcos-rs
//!
//! Build, sign and submit transactions to FISCO BCOS nodes, and decode why they reverted.
//!
//! # Quickstart
//!
//! A prelude is provided which imports all the important things for you.
//!
//! ```no_run
//! use bcos::prelude::*;
//! use std::convert::TryFrom;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://127.0.0.1:20200")?;
//! let wallet = LocalWallet::new(&mut bcos::core::rand::thread_rng());
//! let config = DispatcherConfig::default().group_id("group0");
//! let dispatcher = TransactionDispatcher::with_signer(provider, config, wallet);
//!
//! let to = "0x0000000000000000000000000000000000001000".parse::<Address>()?;
//! let receipt = dispatcher.send_transaction(TransactionIntent::call(to, vec![0x01])).await?;
//! match receipt.revert_message() {
//!     RevertResolution::Found(reason) => println!("reverted: {reason}"),
//!     RevertResolution::NotFound => println!("status {}", receipt.status),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The crates behind the facade can also be used on their own:
//!
//! - [`core`]: transaction, receipt and signature types, revert reason decoding
//! - [`signers`]: the [`Signer`](signers::Signer) and [`AsyncSigner`](signers::AsyncSigner)
//!   capabilities and their implementations
//! - [`providers`]: the JSON-RPC transports and the node API
//! - [`middleware`]: the transaction dispatcher

/// # FISCO BCOS types, cryptography and utilities
///
/// This crate re-exports the [`ethabi`](http://docs.rs/ethabi) crate's functions under the
/// `abi` module, as well as the [`k256`](k256) and [`rand`](rand) crates for convenience.
pub mod core {
    pub use bcos_core::*;
}

pub mod signers {
    pub use bcos_signers::*;
}

/// # Clients for interacting with FISCO BCOS nodes
///
/// [`Provider`](providers::Provider) wraps a [`JsonRpcClient`](providers::JsonRpcClient)
/// transport, such as [`Http`](providers::Http) or, in tests,
/// [`MockProvider`](providers::MockProvider).
pub mod providers {
    pub use bcos_providers::*;
}

pub mod middleware {
    pub use bcos_middleware::*;
}

// Re-export bcos_core::utils
pub use bcos_core::utils;

/// Easy import of frequently used type definitions and traits
pub mod prelude {
    pub use bcos_middleware::*;

    pub use bcos_providers::*;

    pub use bcos_signers::*;

    pub use bcos_core::{abi::RevertResolution, types::*};
}
