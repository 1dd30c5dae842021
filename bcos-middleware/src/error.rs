use bcos_core::types::{CryptoSuite, FeeModel, IntentError};
use bcos_providers::{NodeRejection, ProviderError, RpcError};
use bcos_signers::SignerError;
use thiserror::Error;

/// Problems with the request or the dispatcher setup. These are always raised before the node
/// is contacted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Intent(#[from] IntentError),
    /// Neither a default nor a per-call signer is available
    #[error("no signer configured")]
    NoSigner,
    #[error("fee model not supported by the active signer: {0:?}")]
    UnsupportedFeeModel(FeeModel),
    #[error("crypto suite `{0}` not supported by the active signer")]
    UnsupportedCryptoSuite(CryptoSuite),
    /// Callback variants were used outside of a tokio runtime
    #[error("callback variants require a running tokio runtime")]
    NoRuntime,
}

#[derive(Debug, Error)]
/// Error thrown when the dispatcher sends a transaction or a call
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Thrown when the signer fails to produce a signature
    #[error(transparent)]
    Signer(SignerError),

    /// Thrown when the transport or the node rejects the request
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DispatchError {
    /// `true` if the request was rejected before reaching the node
    pub fn is_config(&self) -> bool {
        matches!(self, DispatchError::Config(_))
    }

    pub fn as_config_error(&self) -> Option<&ConfigError> {
        match self {
            DispatchError::Config(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_provider_error(&self) -> Option<&ProviderError> {
        match self {
            DispatchError::Provider(e) => Some(e),
            _ => None,
        }
    }

    /// Why the node refused to admit the transaction into its pool, if that is what happened.
    /// Transient rejections can be retried with a fresh nonce and block limit.
    pub fn node_rejection(&self) -> Option<NodeRejection> {
        self.as_provider_error().and_then(RpcError::rejection)
    }
}

impl From<IntentError> for DispatchError {
    fn from(src: IntentError) -> Self {
        DispatchError::Config(src.into())
    }
}

// a signer refusing a suite or fee model is a configuration problem, not a signing failure
impl From<SignerError> for DispatchError {
    fn from(src: SignerError) -> Self {
        match src {
            SignerError::UnsupportedSuite(suite) => {
                ConfigError::UnsupportedCryptoSuite(suite).into()
            }
            SignerError::UnsupportedFeeModel(fee) => ConfigError::UnsupportedFeeModel(fee).into(),
            err => DispatchError::Signer(err),
        }
    }
}
