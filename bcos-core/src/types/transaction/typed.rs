use super::{
    eip1559::Eip1559Transaction,
    intent::{FeeModel, TransactionIntent},
    legacy::LegacyTransaction,
};
use crate::{
    types::{Address, Bytes, Signature, H256, U256},
    utils::keccak256,
};
use serde::{Deserialize, Serialize};

/// Chain coordinates and replay protection resolved for a single transaction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionContext {
    pub chain_id: String,
    pub group_id: String,
    pub block_limit: U256,
    pub nonce: String,
}

/// A transaction ready to be signed, one variant per fee model.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(tag = "type")]
pub enum TypedTransaction {
    // 0x00
    #[serde(rename = "0x00")]
    Legacy(LegacyTransaction),
    // 0x02
    #[serde(rename = "0x02")]
    Eip1559(Eip1559Transaction),
}

use TypedTransaction::*;

impl TypedTransaction {
    /// Builds the transaction for `intent` using an already resolved fee model and context.
    pub fn assemble(
        intent: &TransactionIntent,
        fee: FeeModel,
        context: TransactionContext,
    ) -> Self {
        let TransactionContext { chain_id, group_id, block_limit, nonce } = context;
        let abi = intent.abi.clone().unwrap_or_default();
        match fee {
            FeeModel::Legacy { gas_price, gas_limit } => Legacy(LegacyTransaction {
                chain_id,
                group_id,
                nonce,
                block_limit,
                to: intent.to,
                value: intent.value,
                data: intent.data.clone(),
                gas_price,
                gas_limit,
                abi,
            }),
            FeeModel::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas, gas_limit } => {
                Eip1559(Eip1559Transaction {
                    chain_id,
                    group_id,
                    nonce,
                    block_limit,
                    to: intent.to,
                    value: intent.value,
                    data: intent.data.clone(),
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas_limit,
                    abi,
                })
            }
        }
    }

    pub fn to(&self) -> Option<&Address> {
        match self {
            Legacy(inner) => inner.to.as_ref(),
            Eip1559(inner) => inner.to.as_ref(),
        }
    }

    pub fn nonce(&self) -> &str {
        match self {
            Legacy(inner) => &inner.nonce,
            Eip1559(inner) => &inner.nonce,
        }
    }

    pub fn block_limit(&self) -> &U256 {
        match self {
            Legacy(inner) => &inner.block_limit,
            Eip1559(inner) => &inner.block_limit,
        }
    }

    pub fn chain_id(&self) -> &str {
        match self {
            Legacy(inner) => &inner.chain_id,
            Eip1559(inner) => &inner.chain_id,
        }
    }

    pub fn group_id(&self) -> &str {
        match self {
            Legacy(inner) => &inner.group_id,
            Eip1559(inner) => &inner.group_id,
        }
    }

    pub fn value(&self) -> &U256 {
        match self {
            Legacy(inner) => &inner.value,
            Eip1559(inner) => &inner.value,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Legacy(inner) => &inner.data,
            Eip1559(inner) => &inner.data,
        }
    }

    pub fn abi(&self) -> &str {
        match self {
            Legacy(inner) => &inner.abi,
            Eip1559(inner) => &inner.abi,
        }
    }

    pub fn gas_limit(&self) -> &U256 {
        match self {
            Legacy(inner) => &inner.gas_limit,
            Eip1559(inner) => &inner.gas_limit,
        }
    }

    /// The fee model this transaction was assembled with
    pub fn fee_model(&self) -> FeeModel {
        match self {
            Legacy(inner) => {
                FeeModel::Legacy { gas_price: inner.gas_price, gas_limit: inner.gas_limit }
            }
            Eip1559(inner) => FeeModel::Eip1559 {
                max_fee_per_gas: inner.max_fee_per_gas,
                max_priority_fee_per_gas: inner.max_priority_fee_per_gas,
                gas_limit: inner.gas_limit,
            },
        }
    }

    /// Returns the unsigned encoding
    pub fn rlp(&self) -> Bytes {
        match self {
            Legacy(inner) => inner.rlp(),
            Eip1559(inner) => inner.rlp(),
        }
    }

    /// Returns the signed encoding, ready to be submitted
    pub fn rlp_signed(&self, signature: &Signature) -> Bytes {
        match self {
            Legacy(inner) => inner.rlp_signed(signature),
            Eip1559(inner) => inner.rlp_signed(signature),
        }
    }

    /// Hashes the unsigned encoding with keccak-256, the hash that gets signed
    pub fn sighash(&self) -> H256 {
        match self {
            Legacy(inner) => inner.sighash(),
            Eip1559(inner) => inner.sighash(),
        }
    }

    /// Hashes the signed encoding with keccak-256
    pub fn hash(&self, signature: &Signature) -> H256 {
        keccak256(self.rlp_signed(signature).as_ref()).into()
    }
}

impl From<LegacyTransaction> for TypedTransaction {
    fn from(src: LegacyTransaction) -> TypedTransaction {
        TypedTransaction::Legacy(src)
    }
}

impl From<Eip1559Transaction> for TypedTransaction {
    fn from(src: Eip1559Transaction) -> TypedTransaction {
        TypedTransaction::Eip1559(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TransactionContext {
        TransactionContext {
            chain_id: "chain0".to_string(),
            group_id: "group0".to_string(),
            block_limit: U256::from(510u64),
            nonce: "1234".to_string(),
        }
    }

    #[test]
    fn assembles_legacy() {
        let intent = TransactionIntent::call(Address::repeat_byte(1), vec![0xaa]).value(5u64);
        let fee = FeeModel::Legacy { gas_price: U256::one(), gas_limit: U256::from(9_000_000u64) };
        let tx = TypedTransaction::assemble(&intent, fee, context());
        assert!(matches!(tx, TypedTransaction::Legacy(_)));
        assert_eq!(tx.fee_model(), fee);
        assert_eq!(tx.to(), Some(&Address::repeat_byte(1)));
        assert_eq!(tx.value(), &U256::from(5u64));
        assert_eq!(tx.nonce(), "1234");
        assert_eq!(tx.block_limit(), &U256::from(510u64));
        assert_eq!(tx.chain_id(), "chain0");
        assert_eq!(tx.group_id(), "group0");
        assert_eq!(tx.abi(), "");
    }

    #[test]
    fn assembles_eip1559_deployment() {
        let intent = TransactionIntent::deploy(vec![0x60, 0x80], "[]");
        let fee = FeeModel::Eip1559 {
            max_fee_per_gas: U256::from(100u64),
            max_priority_fee_per_gas: U256::from(2u64),
            gas_limit: U256::from(21_000u64),
        };
        let tx = TypedTransaction::assemble(&intent, fee, context());
        assert!(matches!(tx, TypedTransaction::Eip1559(_)));
        assert_eq!(tx.fee_model(), fee);
        assert_eq!(tx.to(), None);
        assert_eq!(tx.abi(), "[]");
        assert_eq!(tx.rlp()[0], 0x02);
    }

    #[test]
    fn signed_hash_differs_from_sighash() {
        let intent = TransactionIntent::call(Address::zero(), Vec::<u8>::new());
        let fee = FeeModel::Legacy { gas_price: U256::one(), gas_limit: U256::one() };
        let tx = TypedTransaction::assemble(&intent, fee, context());
        let signature = Signature { r: U256::one(), s: U256::one(), v: 0 };
        assert_ne!(tx.sighash(), tx.hash(&signature));
        assert_eq!(tx.sighash(), H256::from(keccak256(tx.rlp().as_ref())));
    }
}
