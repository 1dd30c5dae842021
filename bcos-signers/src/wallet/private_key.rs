//! Specific helper functions for loading an offline K256 Private Key
use super::Wallet;

use bcos_core::{
    k256::ecdsa::{self, SigningKey},
    types::public_key_to_address,
    utils::strip_hex_prefix,
};
use elliptic_curve::rand_core::CryptoRngCore;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the Wallet module
pub enum WalletError {
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// Error propagated from the hex crate.
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
}

impl Clone for Wallet<SigningKey> {
    fn clone(&self) -> Self {
        Self { signer: self.signer.clone(), address: self.address }
    }
}

impl Wallet<SigningKey> {
    /// Creates a new random keypair seeded with the provided RNG
    pub fn new<R: CryptoRngCore>(rng: &mut R) -> Self {
        let signer = SigningKey::random(rng);
        let address = public_key_to_address(signer.verifying_key());
        Self { signer, address }
    }

    /// Creates a new Wallet instance from a raw scalar value (big endian).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let signer = SigningKey::from_slice(bytes)?;
        let address = public_key_to_address(signer.verifying_key());
        Ok(Self { signer, address })
    }
}

impl PartialEq for Wallet<SigningKey> {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes()) && self.address == other.address
    }
}

impl From<SigningKey> for Wallet<SigningKey> {
    fn from(signer: SigningKey) -> Self {
        let address = public_key_to_address(signer.verifying_key());
        Self { signer, address }
    }
}

impl FromStr for Wallet<SigningKey> {
    type Err = WalletError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = hex::decode(strip_hex_prefix(src.trim()))?;
        Wallet::from_bytes(&src)
    }
}

impl TryFrom<&str> for Wallet<SigningKey> {
    type Error = WalletError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Wallet<SigningKey> {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
