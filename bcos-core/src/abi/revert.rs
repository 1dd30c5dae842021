//! Revert reason decoding.
//!
//! A failed execution may return the ABI encoding of `Error(string)`: a 4-byte selector followed
//! by a single dynamic string. The selector depends on the chain's hash function:
//!
//! | suite      | hash       | selector     |
//! |------------|------------|--------------|
//! | standard   | keccak-256 | `0x08c379a0` |
//! | SM         | SM3        | `0xc703cb12` |
//!
//! Both selectors are accepted regardless of the suite the caller is configured with.
//!
//! Everything here is best effort. A payload that cannot be decoded is reported as
//! [`RevertResolution::NotFound`] instead of an error, so a malformed message can never hide
//! the failure it was meant to describe.
use crate::{
    abi::{self, ParamType, Token},
    utils::strip_hex_prefix,
};
use thiserror::Error;

/// Hex encoded `Error(string)` selector under keccak-256
pub const REVERT_SELECTOR: &str = "08c379a0";

/// Hex encoded `Error(string)` selector under SM3
pub const SM_REVERT_SELECTOR: &str = "c703cb12";

const SELECTOR_HEX_LEN: usize = 8;

/// The outcome of looking for a revert message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RevertResolution {
    /// A revert message was present and decoded
    Found(String),
    /// No message: success status, untagged output, or an undecodable payload
    #[default]
    NotFound,
}

impl RevertResolution {
    /// Returns `true` if a message was decoded
    pub fn found(&self) -> bool {
        matches!(self, RevertResolution::Found(_))
    }

    /// The decoded message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            RevertResolution::Found(message) => Some(message),
            RevertResolution::NotFound => None,
        }
    }

    /// Consumes the resolution, returning the decoded message
    pub fn into_message(self) -> Option<String> {
        match self {
            RevertResolution::Found(message) => Some(message),
            RevertResolution::NotFound => None,
        }
    }

    /// The `(found, message)` pair
    pub fn into_parts(self) -> (bool, Option<String>) {
        let found = self.found();
        (found, self.into_message())
    }
}

impl From<RevertResolution> for Option<String> {
    fn from(src: RevertResolution) -> Self {
        src.into_message()
    }
}

/// Errors from strictly decoding an `Error(string)` payload
#[derive(Debug, Error)]
pub enum RevertDecodeError {
    /// The payload is not valid hex
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    /// The payload is not a valid ABI encoding of a single dynamic string
    #[error(transparent)]
    Abi(#[from] abi::Error),
    /// The decoded string is not valid UTF-8
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("unexpected token decoded for Error(string)")]
    UnexpectedToken,
}

/// Returns `true` if the output starts with one of the two `Error(string)` selectors.
///
/// A leading `0x` is ignored, as is the case of the hex digits.
pub fn is_output_revert_tagged(output: &str) -> bool {
    strip_hex_prefix(output).get(..SELECTOR_HEX_LEN).map_or(false, |selector| {
        selector.eq_ignore_ascii_case(REVERT_SELECTOR) ||
            selector.eq_ignore_ascii_case(SM_REVERT_SELECTOR)
    })
}

/// Returns `true` if a receipt with this `status` and `output` carries a revert message.
///
/// Successful receipts (`status == 0`) are never inspected.
pub fn has_revert_message(status: i32, output: &str) -> bool {
    status != 0 && !output.is_empty() && is_output_revert_tagged(output)
}

/// Decodes the ABI payload that follows the selector: a tuple holding one dynamic string.
///
/// Strings and bytes share the same layout, the payload is decoded as bytes so that invalid
/// UTF-8 is rejected instead of being replaced.
pub fn decode_revert_reason(payload: &[u8]) -> Result<String, RevertDecodeError> {
    let mut tokens = abi::decode(&[ParamType::Bytes], payload)?;
    match tokens.pop() {
        Some(Token::Bytes(raw)) if tokens.is_empty() => Ok(String::from_utf8(raw)?),
        _ => Err(RevertDecodeError::UnexpectedToken),
    }
}

/// Looks for a revert message in a receipt's `status` and hex `output`.
pub fn try_resolve_revert_message(status: i32, output: &str) -> RevertResolution {
    if !has_revert_message(status, output) {
        return RevertResolution::NotFound
    }

    let payload = &strip_hex_prefix(output)[SELECTOR_HEX_LEN..];
    hex::decode(payload)
        .map_err(RevertDecodeError::from)
        .and_then(|raw| decode_revert_reason(&raw))
        .map_or(RevertResolution::NotFound, RevertResolution::Found)
}
