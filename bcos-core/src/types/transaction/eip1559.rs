use super::rlp_opt;
use crate::{
    types::{Address, Bytes, Signature, H256, U256},
    utils::keccak256,
};
use rlp::RlpStream;
use serde::{Deserialize, Serialize};

/// EIP-1559 transactions have 11 fields before signing
const NUM_TX_FIELDS: usize = 11;

/// The envelope type byte prepended to the RLP payload
pub(crate) const EIP1559_TX_TYPE: u8 = 0x02;

/// A fully resolved transaction priced with a base fee cap and a priority tip.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Eip1559Transaction {
    pub chain_id: String,
    pub group_id: String,
    pub nonce: String,
    pub block_limit: U256,
    /// Recipient address (None for contract creation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    /// Represents the maximum tx fee that will go to the block producer as part of the user's
    /// fee payment.
    pub max_priority_fee_per_gas: U256,
    /// Represents the maximum amount that a user is willing to pay for their tx, inclusive of
    /// the base fee and `max_priority_fee_per_gas`.
    pub max_fee_per_gas: U256,
    pub gas_limit: U256,
    #[serde(default)]
    pub abi: String,
}

impl Eip1559Transaction {
    /// Hashes the typed envelope with keccak-256
    pub fn sighash(&self) -> H256 {
        keccak256(self.rlp().as_ref()).into()
    }

    /// Gets the unsigned transaction's encoding: the type byte followed by the RLP list
    pub fn rlp(&self) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_TX_FIELDS);
        self.rlp_base(&mut rlp);
        typed_envelope(rlp)
    }

    /// Produces the typed encoding of the transaction with the provided signature
    pub fn rlp_signed(&self, signature: &Signature) -> Bytes {
        let mut rlp = RlpStream::new();
        rlp.begin_unbounded_list();
        self.rlp_base(&mut rlp);

        rlp.append(&signature.v);
        rlp.append(&signature.r);
        rlp.append(&signature.s);
        rlp.finalize_unbounded_list();
        typed_envelope(rlp)
    }

    pub(crate) fn rlp_base(&self, rlp: &mut RlpStream) {
        rlp.append(&self.chain_id);
        rlp.append(&self.group_id);
        rlp.append(&self.nonce);
        rlp.append(&self.block_limit);
        rlp.append(&self.max_priority_fee_per_gas);
        rlp.append(&self.max_fee_per_gas);
        rlp.append(&self.gas_limit);
        rlp_opt(rlp, &self.to);
        rlp.append(&self.value);
        rlp.append(&self.data);
        rlp.append(&self.abi);
    }
}

fn typed_envelope(rlp: RlpStream) -> Bytes {
    let payload = rlp.out();
    let mut encoded = Vec::with_capacity(payload.len() + 1);
    encoded.push(EIP1559_TX_TYPE);
    encoded.extend_from_slice(payload.as_ref());
    encoded.into()
}
