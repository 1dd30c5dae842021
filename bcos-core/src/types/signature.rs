use crate::{
    types::{Address, H256, U256},
    utils::keccak256,
};
use elliptic_curve::sec1::ToEncodedPoint;
use k256::{
    ecdsa::{Error as K256SignatureError, RecoveryId, Signature as K256Signature, VerifyingKey},
    FieldBytes, PublicKey as K256PublicKey,
};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};
use thiserror::Error;

/// An error involving a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Invalid length, secp256k1 signatures are 65 bytes
    #[error("invalid signature length, got {0}, expected 65")]
    InvalidLength(usize),
    /// When parsing a signature from string to hex
    #[error(transparent)]
    DecodingError(#[from] hex::FromHexError),
    /// Thrown when signature verification failed (i.e. when the address that
    /// produced the signature did not match the expected address)
    #[error("Signature verification failed. Expected {0}, got {1}")]
    VerificationError(Address, Address),
    /// Internal error during signature recovery
    #[error(transparent)]
    K256Error(#[from] K256SignatureError),
    /// Error in recovering public key from signature
    #[error("Public key recovery error")]
    RecoveryError,
    /// `v` does not fit the single recovery byte of the 65 byte encoding
    #[error("recovery id {0} does not fit in a byte")]
    InvalidRecoveryId(u64),
}

/// An ECDSA signature.
///
/// `v` holds the raw recovery id (`0` or `1`); `27`/`28` are accepted when recovering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub struct Signature {
    /// R value
    pub r: U256,
    /// S Value
    pub s: U256,
    /// V value
    pub v: u64,
}

/// Hex of `r`, `s` and `v`. A `v` above `0xff` is written out in full rather than truncated.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rs = [0u8; 64];
        self.r.to_big_endian(&mut rs[..32]);
        self.s.to_big_endian(&mut rs[32..]);
        write!(f, "{}{:02x}", hex::encode(rs), self.v)
    }
}

impl Signature {
    /// Verifies that the signature over `hash` was produced by `address`
    pub fn verify<A: Into<Address>>(&self, hash: H256, address: A) -> Result<(), SignatureError> {
        let address = address.into();
        let recovered = self.recover(hash)?;
        if recovered != address {
            return Err(SignatureError::VerificationError(address, recovered))
        }

        Ok(())
    }

    /// Recovers the address which was used to sign the given prehashed message.
    pub fn recover(&self, hash: H256) -> Result<Address, SignatureError> {
        let (signature, recovery_id) = self.as_signature()?;
        let verify_key =
            VerifyingKey::recover_from_prehash(hash.as_ref(), &signature, recovery_id)?;

        Ok(public_key_to_address(&verify_key))
    }

    /// Retrieves the recovery signature.
    fn as_signature(&self) -> Result<(K256Signature, RecoveryId), SignatureError> {
        let recovery_id = self.recovery_id()?;
        let signature = {
            let mut r_bytes = [0u8; 32];
            let mut s_bytes = [0u8; 32];
            self.r.to_big_endian(&mut r_bytes);
            self.s.to_big_endian(&mut s_bytes);
            K256Signature::from_scalars(
                *FieldBytes::from_slice(&r_bytes),
                *FieldBytes::from_slice(&s_bytes),
            )?
        };

        Ok((signature, recovery_id))
    }

    /// Retrieve the recovery ID.
    pub fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        let standard_v = match self.v {
            0 | 27 => 0,
            1 | 28 => 1,
            _ => return Err(SignatureError::RecoveryError),
        };
        RecoveryId::from_byte(standard_v).ok_or(SignatureError::RecoveryError)
    }

    /// The 65 byte `r || s || v` encoding
    pub fn to_bytes(&self) -> Result<[u8; 65], SignatureError> {
        self.try_into()
    }
}

/// Converts a secp256k1 public key into its 20-byte address
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let public_key = K256PublicKey::from(key);
    let public_key = public_key.to_encoded_point(/* compress = */ false);
    let public_key = public_key.as_bytes();
    debug_assert_eq!(public_key[0], 0x04);
    let hash = keccak256(&public_key[1..]);
    Address::from_slice(&hash[12..])
}

impl<'a> TryFrom<&'a [u8]> for Signature {
    type Error = SignatureError;

    /// Parses a raw signature which is expected to be 65 bytes long where
    /// the first 32 bytes is the `r` value, the second 32 bytes the `s` value
    /// and the final byte is the `v` value.
    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 65 {
            return Err(SignatureError::InvalidLength(bytes.len()))
        }

        let v = bytes[64];
        let r = U256::from_big_endian(&bytes[0..32]);
        let s = U256::from_big_endian(&bytes[32..64]);

        Ok(Signature { r, s, v: v.into() })
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(crate::utils::strip_hex_prefix(s.trim()))?;
        Signature::try_from(&bytes[..])
    }
}

impl TryFrom<&Signature> for [u8; 65] {
    type Error = SignatureError;

    fn try_from(src: &Signature) -> Result<[u8; 65], SignatureError> {
        let v = u8::try_from(src.v).map_err(|_| SignatureError::InvalidRecoveryId(src.v))?;
        let mut sig = [0u8; 65];
        src.r.to_big_endian(&mut sig[0..32]);
        src.s.to_big_endian(&mut sig[32..64]);
        sig[64] = v;
        Ok(sig)
    }
}

impl TryFrom<Signature> for [u8; 65] {
    type Error = SignatureError;

    fn try_from(src: Signature) -> Result<[u8; 65], SignatureError> {
        <[u8; 65]>::try_from(&src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    fn sign(key: &SigningKey, hash: H256) -> Signature {
        let (sig, recid) = key.sign_prehash_recoverable(hash.as_ref()).unwrap();
        let r: FieldBytes = sig.r().into();
        let s: FieldBytes = sig.s().into();
        Signature {
            r: U256::from_big_endian(r.as_slice()),
            s: U256::from_big_endian(s.as_slice()),
            v: recid.to_byte().into(),
        }
    }

    #[test]
    fn recover_signed_hash() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = public_key_to_address(key.verifying_key());
        let hash = H256::from(keccak256(b"some data"));

        let signature = sign(&key, hash);
        assert_eq!(signature.recover(hash).unwrap(), address);
        signature.verify(hash, address).unwrap();

        let other = H256::from(keccak256(b"other data"));
        assert!(signature.verify(other, address).is_err());
    }

    #[test]
    fn byte_roundtrip() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let hash = H256::from(keccak256(b"roundtrip"));
        let signature = sign(&key, hash);

        let bytes = signature.to_bytes().unwrap();
        assert_eq!(Signature::try_from(&bytes[..]).unwrap(), signature);
        assert_eq!(signature.to_string().parse::<Signature>().unwrap(), signature);
    }

    #[test]
    fn rejects_bad_length_and_recovery_id() {
        assert!(matches!(
            Signature::try_from(&[0u8; 64][..]),
            Err(SignatureError::InvalidLength(64))
        ));

        let sig = Signature { r: U256::one(), s: U256::one(), v: 9 };
        assert!(matches!(sig.recovery_id(), Err(SignatureError::RecoveryError)));
    }

    #[test]
    fn oversized_recovery_id_is_not_truncated() {
        let sig = Signature { r: U256::one(), s: U256::one(), v: 256 + 27 };
        assert!(matches!(sig.to_bytes(), Err(SignatureError::InvalidRecoveryId(283))));
        assert!(<[u8; 65]>::try_from(sig).is_err());

        let text = sig.to_string();
        assert!(text.ends_with("11b"));
        assert!(matches!(text.parse::<Signature>(), Err(SignatureError::DecodingError(_))));

        let sig = Signature { v: 255, ..sig };
        assert_eq!(sig.to_bytes().unwrap()[64], 0xff);
        assert_eq!(sig.to_string().len(), 130);
    }
}
