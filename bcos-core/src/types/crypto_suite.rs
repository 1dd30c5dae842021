use crate::abi::revert::{REVERT_SELECTOR, SM_REVERT_SELECTOR};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The hash and signature family a chain is deployed with.
///
/// Most chains use the [`Standard`](CryptoSuite::Standard) suite (keccak-256 hashing and
/// secp256k1 signatures). Deployments following the Chinese national standards use the
/// [`Sm`](CryptoSuite::Sm) suite (SM3 hashing and SM2 signatures), which changes every hash
/// derived value, including function and error selectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoSuite {
    #[default]
    Standard,
    Sm,
}

impl CryptoSuite {
    /// The hex encoded `Error(string)` selector under this suite's hash function
    pub const fn revert_selector(&self) -> &'static str {
        match self {
            CryptoSuite::Standard => REVERT_SELECTOR,
            CryptoSuite::Sm => SM_REVERT_SELECTOR,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            CryptoSuite::Standard => "standard",
            CryptoSuite::Sm => "sm",
        }
    }
}

impl fmt::Display for CryptoSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoSuite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "ecdsa" | "secp256k1" => Ok(CryptoSuite::Standard),
            "sm" | "sm2" | "gm" => Ok(CryptoSuite::Sm),
            other => Err(format!("unknown crypto suite: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::id;

    #[test]
    fn standard_selector_matches_keccak() {
        assert_eq!(hex::encode(id("Error(string)")), CryptoSuite::Standard.revert_selector());
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("GM".parse::<CryptoSuite>().unwrap(), CryptoSuite::Sm);
        assert_eq!("secp256k1".parse::<CryptoSuite>().unwrap(), CryptoSuite::Standard);
        assert!("ed25519".parse::<CryptoSuite>().is_err());
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&CryptoSuite::Sm).unwrap(), r#""sm""#);
        let suite: CryptoSuite = serde_json::from_str(r#""standard""#).unwrap();
        assert_eq!(suite, CryptoSuite::Standard);
    }
}
