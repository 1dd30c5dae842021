//! Extensions to the [`ethabi`](https://docs.rs/ethabi) API.
//!
//! `ethabi` is the generic ABI tuple codec; this module only adds what the transaction
//! pipeline needs on top of it.
pub use ethabi::{self, *};

pub mod revert;
pub use revert::{
    has_revert_message, is_output_revert_tagged, try_resolve_revert_message, RevertResolution,
};
