//! Some convenient serde helpers

use crate::types::{Address, U256};
use serde::{Deserialize, Deserializer};
use std::convert::{TryFrom, TryInto};

/// Helper type to parse numeric strings, `u64` and `U256`
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum StringifiedNumeric {
    String(String),
    Num(serde_json::Number),
}

impl TryFrom<StringifiedNumeric> for U256 {
    type Error = String;

    fn try_from(value: StringifiedNumeric) -> Result<Self, Self::Error> {
        match value {
            StringifiedNumeric::Num(n) => {
                U256::from_dec_str(&n.to_string()).map_err(|err| err.to_string())
            }
            StringifiedNumeric::String(s) => {
                if s.is_empty() {
                    Ok(U256::zero())
                } else if let Some(hex) = s.strip_prefix("0x") {
                    U256::from_str_radix(hex, 16).map_err(|err| err.to_string())
                } else {
                    U256::from_dec_str(&s).map_err(|err| err.to_string())
                }
            }
        }
    }
}

impl TryFrom<StringifiedNumeric> for u64 {
    type Error = String;

    fn try_from(value: StringifiedNumeric) -> Result<Self, Self::Error> {
        let value = U256::try_from(value)?;
        if value > U256::from(u64::MAX) {
            return Err(format!("{value} does not fit into u64"))
        }
        Ok(value.as_u64())
    }
}

/// Supports parsing numbers as strings (decimal or `0x` prefixed hex)
pub fn deserialize_stringified_numeric<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let num = StringifiedNumeric::deserialize(deserializer)?;
    num.try_into().map_err(serde::de::Error::custom)
}

/// Supports parsing u64 given as a number or a string
pub fn deserialize_stringified_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let num = StringifiedNumeric::deserialize(deserializer)?;
    num.try_into().map_err(serde::de::Error::custom)
}

/// Nodes report "no address" as an empty string or `null`
pub fn deserialize_address_opt<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() || s == "0x" => Ok(None),
        Some(s) => {
            let raw = hex::decode(crate::utils::strip_hex_prefix(&s))
                .map_err(serde::de::Error::custom)?;
            if raw.len() != 20 {
                return Err(serde::de::Error::custom(format!("invalid address length: {s}")))
            }
            Ok(Some(Address::from_slice(&raw)))
        }
    }
}
