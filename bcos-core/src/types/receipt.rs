use crate::{
    abi::revert::{self, RevertResolution},
    types::{
        serde_helpers::{
            deserialize_address_opt, deserialize_stringified_numeric, deserialize_stringified_u64,
        },
        Address, TxHash, U256,
    },
};
use serde::{Deserialize, Serialize};

/// "Receipt" of an executed transaction: details of its execution.
///
/// Receipts are produced by the node and are never mutated by this library.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction hash.
    #[serde(alias = "hash")]
    pub transaction_hash: TxHash,
    /// Number of the block this transaction was included within.
    #[serde(default, deserialize_with = "deserialize_stringified_u64")]
    pub block_number: u64,
    /// Execution status, `0` is success, everything else is a failure code.
    pub status: i32,
    /// Hex encoded return data, or revert data when `status` is non-zero.
    #[serde(default)]
    pub output: String,
    /// Address of the sender.
    #[serde(default, deserialize_with = "deserialize_address_opt")]
    pub from: Option<Address>,
    /// Address of the receiver. `None` when it's a contract creation transaction.
    #[serde(default, deserialize_with = "deserialize_address_opt")]
    pub to: Option<Address>,
    /// Contract address created, or `None` if not a deployment.
    #[serde(default, deserialize_with = "deserialize_address_opt")]
    pub contract_address: Option<Address>,
    /// Gas used by this transaction alone.
    #[serde(default, deserialize_with = "deserialize_stringified_numeric")]
    pub gas_used: U256,
    /// Node supplied status message.
    #[serde(default)]
    pub message: String,
}

impl TransactionReceipt {
    /// Returns `true` if the transaction executed successfully
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Attempts to decode a revert reason from this receipt's output.
    ///
    /// Never fails: a successful receipt, a missing selector or a malformed payload all yield
    /// [`RevertResolution::NotFound`].
    pub fn revert_message(&self) -> RevertResolution {
        revert::try_resolve_revert_message(self.status, &self.output)
    }
}

/// The result of a read-only call, no receipt is involved.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
    /// Block the call was executed against.
    #[serde(default, deserialize_with = "deserialize_stringified_u64")]
    pub block_number: u64,
    /// Execution status, `0` is success.
    pub status: i32,
    /// Hex encoded return data.
    #[serde(default)]
    pub output: String,
}

impl CallResult {
    /// Returns `true` if the call executed successfully
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Attempts to decode a revert reason from the call output.
    pub fn revert_message(&self) -> RevertResolution {
        revert::try_resolve_revert_message(self.status, &self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT: &str = r#"{
        "blockNumber": 12,
        "contractAddress": "",
        "from": "0x3d20a4e26f41b57c2061e520c825fbfa5f321f22",
        "gasUsed": "21000",
        "hash": "0xb1b4c6e82a0f5d56d0b8e2ab9d48c1f20f2c8ba49b6f8d52f4c4d2fb2e3e2a11",
        "input": "0x",
        "logEntries": [],
        "message": "",
        "output": "0x",
        "status": 0,
        "to": "0x0000000000000000000000000000000000001000",
        "version": 0
    }"#;

    #[test]
    fn decodes_node_receipt() {
        let receipt: TransactionReceipt = serde_json::from_str(RECEIPT).unwrap();
        assert_eq!(receipt.block_number, 12);
        assert_eq!(receipt.gas_used, U256::from(21000u64));
        assert!(receipt.contract_address.is_none());
        assert_eq!(receipt.to, Some(Address::from_low_u64_be(0x1000)));
        assert!(receipt.is_success());
        assert!(!receipt.revert_message().found());
    }

    #[test]
    fn decodes_call_result() {
        let result: CallResult =
            serde_json::from_str(r#"{"blockNumber":"0x10","status":16,"output":"0x"}"#).unwrap();
        assert_eq!(result.block_number, 16);
        assert!(!result.is_success());
        assert!(!result.revert_message().found());
    }
}
