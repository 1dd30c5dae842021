mod private_key;
pub use private_key::WalletError;

use crate::{Signer, SignerError};
use bcos_core::{
    k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, Signature as RecoverableSignature},
    types::{Address, CryptoSuite, Signature, H256, U256},
    utils::keccak256,
};
use std::fmt;

/// A private-public key pair which can be used for signing transactions and call payloads.
///
/// Only the [`Standard`](CryptoSuite::Standard) suite is supported: asking a wallet to sign for
/// the SM suite fails with [`SignerError::UnsupportedSuite`].
///
/// # Examples
///
/// ```
/// use bcos_core::{rand::thread_rng, types::CryptoSuite, utils::keccak256};
/// use bcos_signers::{LocalWallet, Signer};
///
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = LocalWallet::new(&mut thread_rng());
///
/// let payload = b"hello";
/// let signature = wallet.sign_payload(payload, CryptoSuite::Standard)?;
/// assert_eq!(signature.recover(keccak256(payload).into())?, wallet.address());
/// # Ok(())
/// # }
/// ```
pub struct Wallet<D: PrehashSigner<(RecoverableSignature, RecoveryId)>> {
    /// The Wallet's private Key
    pub(crate) signer: D,
    /// The wallet's address
    pub(crate) address: Address,
}

impl<D> Signer for Wallet<D>
where
    D: PrehashSigner<(RecoverableSignature, RecoveryId)> + Send + Sync,
{
    fn sign_payload(&self, payload: &[u8], suite: CryptoSuite) -> Result<Signature, SignerError> {
        if !self.supports_suite(suite) {
            return Err(SignerError::UnsupportedSuite(suite))
        }
        Ok(self.sign_hash(keccak256(payload).into())?)
    }

    fn address(&self) -> Address {
        self.address
    }

    fn supports_suite(&self, suite: CryptoSuite) -> bool {
        suite == CryptoSuite::Standard
    }
}

impl<D: PrehashSigner<(RecoverableSignature, RecoveryId)>> Wallet<D> {
    /// Creates a wallet from a signer and its address
    pub fn new_with_signer(signer: D, address: Address) -> Self {
        Wallet { signer, address }
    }

    /// Signs a 32 byte digest, `v` is the raw recovery id
    pub fn sign_hash(&self, hash: H256) -> Result<Signature, WalletError> {
        let (sig, recovery_id) = self.signer.sign_prehash(hash.as_ref())?;
        let bytes = sig.to_bytes();

        let r = U256::from_big_endian(&bytes[..32]);
        let s = U256::from_big_endian(&bytes[32..]);
        Ok(Signature { r, s, v: recovery_id.to_byte() as u64 })
    }

    /// Gets the wallet's signer
    pub fn signer(&self) -> &D {
        &self.signer
    }

    /// Returns the wallet's address
    pub fn address(&self) -> Address {
        self.address
    }
}

// do not log the signer
impl<D: PrehashSigner<(RecoverableSignature, RecoveryId)>> fmt::Debug for Wallet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}
