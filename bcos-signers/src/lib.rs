#![cfg_attr(docsrs, feature(doc_cfg))]
//! Provides a unified interface for signing transactions.
//!
//! Implement [`Signer`] (blocking) or [`AsyncSigner`] (non-blocking) to plug other signing
//! backends into the transaction dispatcher, such as remote signing services or HSMs. The
//! dispatcher only ever sees these traits, so swapping the backend never touches call sites.
//!
//! The exposed interfaces return a recoverable signature. To turn the signature and the
//! [`TypedTransaction`] into wire bytes, use [`TypedTransaction::rlp_signed`].
//!
//! Supported signers:
//! - Private key ([`LocalWallet`])
//! - External process ([`ProcessSigner`])
//!
//! ```
//! use bcos_core::types::{
//!     transaction::TransactionContext, Address, CryptoSuite, FeeModel, TransactionIntent,
//!     TypedTransaction, U256,
//! };
//! use bcos_signers::{LocalWallet, Signer};
//!
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let wallet = "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7"
//!     .parse::<LocalWallet>()?;
//!
//! let intent = TransactionIntent::call(Address::zero(), vec![0x01]);
//! let fee = FeeModel::Legacy { gas_price: U256::one(), gas_limit: U256::from(9_000_000u64) };
//! let tx = TypedTransaction::assemble(&intent, fee, TransactionContext::default());
//!
//! let signature = wallet.sign_transaction(&tx, CryptoSuite::Standard)?;
//! signature.verify(tx.sighash(), wallet.address())?;
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{Wallet, WalletError};

mod process;
pub use process::{ProcessError, ProcessSigner};

/// A wallet instantiated with a locally stored private key
pub type LocalWallet = Wallet<bcos_core::k256::ecdsa::SigningKey>;

use async_trait::async_trait;
use auto_impl::auto_impl;
use bcos_core::types::{
    Address, CryptoSuite, FeeModel, Signature, SignatureError, TypedTransaction,
};
use std::{error::Error, fmt::Debug};
use thiserror::Error;

/// Errors raised by signing backends
#[derive(Debug, Error)]
pub enum SignerError {
    /// The signer has no signing path for the requested suite
    #[error("crypto suite `{0}` is not supported by this signer")]
    UnsupportedSuite(CryptoSuite),
    /// The signer has no signing path for the requested fee model
    #[error("fee model not supported by this signer: {0:?}")]
    UnsupportedFeeModel(FeeModel),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    /// Error from a third party signer implementation
    #[error(transparent)]
    Custom(Box<dyn Error + Send + Sync>),
}

impl SignerError {
    /// Wraps an arbitrary backend error
    pub fn custom<E: Error + Send + Sync + 'static>(err: E) -> Self {
        SignerError::Custom(Box::new(err))
    }

    /// Returns `true` if the error means the signer was asked for something it cannot do, as
    /// opposed to a failure while doing it
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SignerError::UnsupportedSuite(_) | SignerError::UnsupportedFeeModel(_))
    }
}

/// A blocking signing backend.
///
/// `sign_payload` is the only required signing method: it hashes the payload with the suite's
/// hash function and signs the digest. Transactions are signed over their unsigned encoding.
#[auto_impl(&, Box, Arc)]
pub trait Signer: Debug + Send + Sync {
    /// Hashes `payload` under `suite` and signs the digest
    fn sign_payload(&self, payload: &[u8], suite: CryptoSuite) -> Result<Signature, SignerError>;

    /// Signs the transaction
    fn sign_transaction(
        &self,
        tx: &TypedTransaction,
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError> {
        self.sign_payload(tx.rlp().as_ref(), suite)
    }

    /// Returns the signer's address
    fn address(&self) -> Address;

    /// Returns `false` if this signer cannot sign for `suite`
    fn supports_suite(&self, _suite: CryptoSuite) -> bool {
        true
    }

    /// Returns `false` if this signer cannot sign transactions priced with `fee`
    fn supports_fee_model(&self, _fee: &FeeModel) -> bool {
        true
    }
}

/// A non-blocking signing backend, e.g. a remote signing service.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait AsyncSigner: Debug + Send + Sync {
    /// Hashes `payload` under `suite` and signs the digest
    async fn sign_payload(
        &self,
        payload: &[u8],
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError>;

    /// Signs the transaction
    async fn sign_transaction(
        &self,
        tx: &TypedTransaction,
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError> {
        let unsigned = tx.rlp();
        self.sign_payload(unsigned.as_ref(), suite).await
    }

    /// Returns the signer's address
    fn address(&self) -> Address;

    fn supports_suite(&self, _suite: CryptoSuite) -> bool {
        true
    }

    fn supports_fee_model(&self, _fee: &FeeModel) -> bool {
        true
    }
}
