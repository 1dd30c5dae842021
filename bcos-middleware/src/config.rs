use bcos_core::types::{CryptoSuite, FeeModel, U256};
use serde::{Deserialize, Serialize};

/// Gas price applied when an intent carries no fee model
pub const DEFAULT_GAS_PRICE: u64 = 1;

/// Gas limit applied when an intent carries no fee model
pub const DEFAULT_GAS_LIMIT: u64 = 9_000_000;

/// Number of blocks an automatically nonced transaction stays valid for
pub const DEFAULT_BLOCK_LIMIT_OFFSET: u64 = 500;

/// Settings of a [`TransactionDispatcher`](crate::TransactionDispatcher).
///
/// Every field has a default, so hosts embedding this in their own configuration files only
/// need to spell out what differs:
///
/// ```
/// use bcos_middleware::DispatcherConfig;
///
/// let config: DispatcherConfig =
///     serde_json::from_str(r#"{ "groupId": "group1", "cryptoSuite": "sm" }"#).unwrap();
/// assert_eq!(config.group_id, "group1");
/// assert_eq!(config.chain_id, "chain0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatcherConfig {
    pub chain_id: String,
    pub group_id: String,
    /// Node requests are routed to, empty for any
    pub node_name: String,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub block_limit_offset: u64,
    /// Suite used when a send does not name one
    pub crypto_suite: CryptoSuite,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            chain_id: "chain0".to_string(),
            group_id: "group0".to_string(),
            node_name: String::new(),
            gas_price: U256::from(DEFAULT_GAS_PRICE),
            gas_limit: U256::from(DEFAULT_GAS_LIMIT),
            block_limit_offset: DEFAULT_BLOCK_LIMIT_OFFSET,
            crypto_suite: CryptoSuite::Standard,
        }
    }
}

impl DispatcherConfig {
    #[must_use]
    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    #[must_use]
    pub fn node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    #[must_use]
    pub fn gas_price<T: Into<U256>>(mut self, gas_price: T) -> Self {
        self.gas_price = gas_price.into();
        self
    }

    #[must_use]
    pub fn gas_limit<T: Into<U256>>(mut self, gas_limit: T) -> Self {
        self.gas_limit = gas_limit.into();
        self
    }

    #[must_use]
    pub fn block_limit_offset(mut self, offset: u64) -> Self {
        self.block_limit_offset = offset;
        self
    }

    #[must_use]
    pub fn crypto_suite(mut self, suite: CryptoSuite) -> Self {
        self.crypto_suite = suite;
        self
    }

    /// The fee model applied to intents that do not carry one
    pub fn default_fee(&self) -> FeeModel {
        FeeModel::Legacy { gas_price: self.gas_price, gas_limit: self.gas_limit }
    }
}
