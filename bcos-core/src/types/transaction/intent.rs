//! What the caller wants to happen on chain, before any defaults are applied.
use crate::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fee parameters of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeeModel {
    /// Flat gas price
    #[serde(rename_all = "camelCase")]
    Legacy { gas_price: U256, gas_limit: U256 },
    /// EIP-1559 style base + priority fee
    #[serde(rename_all = "camelCase")]
    Eip1559 { max_fee_per_gas: U256, max_priority_fee_per_gas: U256, gas_limit: U256 },
}

impl FeeModel {
    /// The gas limit, whichever the model
    pub fn gas_limit(&self) -> U256 {
        match self {
            FeeModel::Legacy { gas_limit, .. } | FeeModel::Eip1559 { gas_limit, .. } => *gas_limit,
        }
    }

    pub fn is_eip1559(&self) -> bool {
        matches!(self, FeeModel::Eip1559 { .. })
    }
}

/// How the transaction nonce and block limit are chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NonceSpec {
    /// Pick a fresh random nonce and derive the block limit from the current block number
    #[default]
    Auto,
    /// Use exactly these values
    #[serde(rename_all = "camelCase")]
    Explicit { block_limit: U256, nonce: String },
}

/// Errors raised when an intent is not internally consistent
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    /// A deployment must carry the contract ABI
    #[error("contract deployment requires a non-empty ABI")]
    MissingAbi,
    /// A deployment has no recipient
    #[error("contract deployment must not set a recipient")]
    ConstructorWithRecipient,
}

/// A transaction the caller wants sent, with the optional parameters left open.
///
/// ```
/// use bcos_core::types::{Address, FeeModel, TransactionIntent, U256};
///
/// let intent = TransactionIntent::call(Address::zero(), vec![0xde, 0xad])
///     .legacy(1u64, 3_000_000u64);
/// assert_eq!(
///     intent.fee,
///     Some(FeeModel::Legacy { gas_price: U256::one(), gas_limit: U256::from(3_000_000u64) })
/// );
/// assert!(intent.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    /// Recipient, `None` for a deployment
    pub to: Option<Address>,
    /// Call data, or the creation bytecode (plus encoded constructor args)
    pub data: Bytes,
    /// Value to transfer
    #[serde(default)]
    pub value: U256,
    /// Fee parameters, `None` means the dispatcher's configured legacy defaults
    #[serde(default)]
    pub fee: Option<FeeModel>,
    #[serde(default)]
    pub nonce: NonceSpec,
    /// Contract ABI JSON, required for deployments
    #[serde(default)]
    pub abi: Option<String>,
    /// `true` for contract creation
    #[serde(default)]
    pub constructor: bool,
}

impl TransactionIntent {
    /// A call to an existing contract
    pub fn call<T: Into<Address>, D: Into<Bytes>>(to: T, data: D) -> Self {
        Self { to: Some(to.into()), data: data.into(), ..Default::default() }
    }

    /// A contract deployment
    pub fn deploy<D: Into<Bytes>, A: Into<String>>(bytecode: D, abi: A) -> Self {
        Self {
            data: bytecode.into(),
            abi: Some(abi.into()),
            constructor: true,
            ..Default::default()
        }
    }

    /// Sets the value to transfer
    pub fn value<T: Into<U256>>(mut self, value: T) -> Self {
        self.value = value.into();
        self
    }

    /// Uses the legacy fee model
    pub fn legacy<P: Into<U256>, L: Into<U256>>(mut self, gas_price: P, gas_limit: L) -> Self {
        self.fee =
            Some(FeeModel::Legacy { gas_price: gas_price.into(), gas_limit: gas_limit.into() });
        self
    }

    /// Uses the EIP-1559 fee model
    pub fn eip1559<M, P, L>(
        mut self,
        max_fee_per_gas: M,
        max_priority_fee_per_gas: P,
        gas_limit: L,
    ) -> Self
    where
        M: Into<U256>,
        P: Into<U256>,
        L: Into<U256>,
    {
        self.fee = Some(FeeModel::Eip1559 {
            max_fee_per_gas: max_fee_per_gas.into(),
            max_priority_fee_per_gas: max_priority_fee_per_gas.into(),
            gas_limit: gas_limit.into(),
        });
        self
    }

    /// Pins the block limit and nonce instead of deriving them
    pub fn nonce<B: Into<U256>, N: Into<String>>(mut self, block_limit: B, nonce: N) -> Self {
        self.nonce = NonceSpec::Explicit { block_limit: block_limit.into(), nonce: nonce.into() };
        self
    }

    /// Sets the ABI JSON attached to the transaction
    pub fn abi<A: Into<String>>(mut self, abi: A) -> Self {
        self.abi = Some(abi.into());
        self
    }

    /// Checks the intent for internal consistency. No network access.
    pub fn validate(&self) -> Result<(), IntentError> {
        if self.constructor {
            if self.abi.as_deref().map_or(true, str::is_empty) {
                return Err(IntentError::MissingAbi)
            }
            if self.to.is_some() {
                return Err(IntentError::ConstructorWithRecipient)
            }
        }
        Ok(())
    }
}
