pub type Selector = [u8; 4];

// Re-export common datatypes with more specific names

/// A transaction Hash
pub use ethabi::ethereum_types::H256 as TxHash;

pub use ethabi::ethereum_types::{Address, H160, H256, U256, U64};

pub mod transaction;
pub use transaction::{
    intent::{FeeModel, IntentError, NonceSpec, TransactionIntent},
    TransactionContext, TypedTransaction,
};

mod bytes;
pub use self::bytes::{Bytes, ParseBytesError};

mod crypto_suite;
pub use crypto_suite::CryptoSuite;

mod receipt;
pub use receipt::{CallResult, TransactionReceipt};

mod signature;
pub use signature::{public_key_to_address, Signature, SignatureError};

pub mod serde_helpers;
