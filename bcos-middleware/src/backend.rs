use bcos_core::types::{Address, CryptoSuite, FeeModel, Signature, TypedTransaction};
use bcos_signers::{AsyncSigner, Signer, SignerError};
use std::sync::Arc;
use tokio::runtime::Handle;

/// The signing capability a dispatcher signs with: either shape of signer behind a shared
/// pointer, so dispatchers and their clones can hand it to spawned submissions.
#[derive(Clone, Debug)]
pub enum SignerBackend {
    /// Signs on tokio's blocking thread pool, or inline when polled outside a runtime
    Blocking(Arc<dyn Signer>),
    Async(Arc<dyn AsyncSigner>),
}

impl SignerBackend {
    pub fn blocking<S: Signer + 'static>(signer: S) -> Self {
        SignerBackend::Blocking(Arc::new(signer))
    }

    pub fn non_blocking<S: AsyncSigner + 'static>(signer: S) -> Self {
        SignerBackend::Async(Arc::new(signer))
    }

    pub fn address(&self) -> Address {
        match self {
            SignerBackend::Blocking(signer) => signer.address(),
            SignerBackend::Async(signer) => signer.address(),
        }
    }

    pub fn supports_suite(&self, suite: CryptoSuite) -> bool {
        match self {
            SignerBackend::Blocking(signer) => signer.supports_suite(suite),
            SignerBackend::Async(signer) => signer.supports_suite(suite),
        }
    }

    pub fn supports_fee_model(&self, fee: &FeeModel) -> bool {
        match self {
            SignerBackend::Blocking(signer) => signer.supports_fee_model(fee),
            SignerBackend::Async(signer) => signer.supports_fee_model(fee),
        }
    }

    pub async fn sign_transaction(
        &self,
        tx: &TypedTransaction,
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError> {
        match self {
            SignerBackend::Blocking(signer) => {
                let (signer, tx) = (signer.clone(), tx.clone());
                off_runtime(move || signer.sign_transaction(&tx, suite)).await
            }
            SignerBackend::Async(signer) => signer.sign_transaction(tx, suite).await,
        }
    }

    pub async fn sign_payload(
        &self,
        payload: &[u8],
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError> {
        match self {
            SignerBackend::Blocking(signer) => {
                let (signer, payload) = (signer.clone(), payload.to_vec());
                off_runtime(move || signer.sign_payload(&payload, suite)).await
            }
            SignerBackend::Async(signer) => signer.sign_payload(payload, suite).await,
        }
    }
}

async fn off_runtime<F>(sign: F) -> Result<Signature, SignerError>
where
    F: FnOnce() -> Result<Signature, SignerError> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(sign)
            .await
            .unwrap_or_else(|err| Err(SignerError::custom(err))),
        Err(_) => sign(),
    }
}

/// Per-call overrides for [`send_transaction_with`].
///
/// A signer set here replaces the dispatcher's default signer for this call; the two are never
/// combined.
///
/// [`send_transaction_with`]: crate::TransactionDispatcher::send_transaction_with
#[derive(Clone, Debug, Default)]
pub struct SendOptions {
    pub suite: Option<CryptoSuite>,
    pub signer: Option<SignerBackend>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn suite(mut self, suite: CryptoSuite) -> Self {
        self.suite = Some(suite);
        self
    }

    #[must_use]
    pub fn signer<S: Signer + 'static>(mut self, signer: S) -> Self {
        self.signer = Some(SignerBackend::blocking(signer));
        self
    }

    #[must_use]
    pub fn async_signer<S: AsyncSigner + 'static>(mut self, signer: S) -> Self {
        self.signer = Some(SignerBackend::non_blocking(signer));
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: SignerBackend) -> Self {
        self.signer = Some(backend);
        self
    }
}
