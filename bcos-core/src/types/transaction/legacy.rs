use super::rlp_opt;
use crate::{
    types::{Address, Bytes, Signature, H256, U256},
    utils::keccak256,
};
use rlp::RlpStream;
use serde::{Deserialize, Serialize};

/// Legacy transactions have 10 fields before signing
const NUM_TX_FIELDS: usize = 10;

/// A fully resolved transaction with a flat gas price.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTransaction {
    pub chain_id: String,
    pub group_id: String,
    /// Replay protection nonce, unique per sender within the block limit window
    pub nonce: String,
    /// The last block number this transaction may be included in
    pub block_limit: U256,
    /// Recipient address (None for contract creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub gas_price: U256,
    pub gas_limit: U256,
    /// Contract ABI JSON, empty unless this is a deployment
    #[serde(default)]
    pub abi: String,
}

impl LegacyTransaction {
    /// Hashes the transaction's data with keccak-256
    pub fn sighash(&self) -> H256 {
        keccak256(self.rlp().as_ref()).into()
    }

    /// Gets the unsigned transaction's RLP encoding
    pub fn rlp(&self) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_TX_FIELDS);
        self.rlp_base(&mut rlp);
        rlp.out().freeze().into()
    }

    /// Produces the RLP encoding of the transaction with the provided signature
    pub fn rlp_signed(&self, signature: &Signature) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_unbounded_list();
        self.rlp_base(&mut rlp);

        rlp.append(&signature.v);
        rlp.append(&signature.r);
        rlp.append(&signature.s);
        rlp.finalize_unbounded_list();
        rlp.out().freeze().into()
    }

    pub(crate) fn rlp_base(&self, rlp: &mut RlpStream) {
        rlp.append(&self.nonce);
        rlp.append(&self.gas_price);
        rlp.append(&self.gas_limit);
        rlp.append(&self.block_limit);
        rlp_opt(rlp, &self.to);
        rlp.append(&self.value);
        rlp.append(&self.data);
        rlp.append(&self.chain_id);
        rlp.append(&self.group_id);
        rlp.append(&self.abi);
    }
}
