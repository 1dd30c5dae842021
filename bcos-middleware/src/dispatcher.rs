use crate::{
    backend::{SendOptions, SignerBackend},
    config::DispatcherConfig,
    error::{ConfigError, DispatchError},
};
use bcos_core::{
    abi::revert::RevertResolution,
    types::{
        Address, Bytes, CallResult, CryptoSuite, FeeModel, NonceSpec, Signature,
        TransactionContext, TransactionIntent, TransactionReceipt, TypedTransaction, U256,
    },
};
use bcos_providers::{JsonRpcClient, NodeRejection, Provider, RpcError};
use bcos_signers::{AsyncSigner, Signer};
use rand::Rng;
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::runtime::Handle;
use tracing::{debug, warn};
use tracing_futures::Instrument;

/// Identifies a submission made through one of the callback variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A read-only call, optionally authenticated by a signature over its payload
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub signature: Option<Signature>,
}

impl CallRequest {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self { to, data: data.into(), signature: None }
    }

    #[must_use]
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }
}

/// Everything resolved about a send before the node is contacted
#[derive(Debug)]
struct Prepared {
    signer: SignerBackend,
    suite: CryptoSuite,
    fee: FeeModel,
}

/// Builds, signs and submits transactions through a pluggable signer.
///
/// Every send entry point funnels into [`send_transaction_with`], so the signing path is the
/// same whichever entry point or signer is used. Missing fee models default to the configured
/// legacy gas price and limit, and [`NonceSpec::Auto`] is resolved against the current block
/// number.
///
/// # Example
///
/// ```no_run
/// use bcos_core::types::{Address, TransactionIntent};
/// use bcos_middleware::{DispatcherConfig, TransactionDispatcher};
/// use bcos_providers::{Http, Provider};
/// use bcos_signers::LocalWallet;
/// use std::convert::TryFrom;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Provider::<Http>::try_from("http://127.0.0.1:20200")?;
/// let wallet: LocalWallet =
///     "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7".parse()?;
///
/// let dispatcher =
///     TransactionDispatcher::with_signer(provider, DispatcherConfig::default(), wallet);
///
/// let to = "0x0000000000000000000000000000000000001000".parse::<Address>()?;
/// let receipt = dispatcher.send_transaction(TransactionIntent::call(to, vec![0x01])).await?;
/// if let Some(reason) = receipt.revert_message().message() {
///     println!("reverted: {reason}");
/// }
/// # Ok(())
/// # }
/// ```
///
/// [`send_transaction_with`]: TransactionDispatcher::send_transaction_with
pub struct TransactionDispatcher<P> {
    provider: Arc<Provider<P>>,
    config: DispatcherConfig,
    signer: Option<SignerBackend>,
    submissions: Arc<AtomicU64>,
}

impl<P> Clone for TransactionDispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.clone(),
            signer: self.signer.clone(),
            submissions: self.submissions.clone(),
        }
    }
}

impl<P> fmt::Debug for TransactionDispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionDispatcher")
            .field("config", &self.config)
            .field("signer", &self.signer)
            .finish()
    }
}

impl<P: JsonRpcClient> TransactionDispatcher<P> {
    /// Creates a dispatcher without a default signer. Sends fail with
    /// [`ConfigError::NoSigner`] unless a signer is passed per call.
    ///
    /// The provider is scoped to the configured group and node.
    pub fn new(provider: Provider<P>, config: DispatcherConfig) -> Self {
        let provider = provider.with_group(&config.group_id).with_node(&config.node_name);
        Self {
            provider: Arc::new(provider),
            config,
            signer: None,
            submissions: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Creates a dispatcher signing with a blocking signer by default
    pub fn with_signer<S: Signer + 'static>(
        provider: Provider<P>,
        config: DispatcherConfig,
        signer: S,
    ) -> Self {
        let mut this = Self::new(provider, config);
        this.set_signer(signer);
        this
    }

    /// Creates a dispatcher signing with a non-blocking signer by default
    pub fn with_async_signer<S: AsyncSigner + 'static>(
        provider: Provider<P>,
        config: DispatcherConfig,
        signer: S,
    ) -> Self {
        let mut this = Self::new(provider, config);
        this.set_async_signer(signer);
        this
    }

    /// Replaces the default signer. Submissions already in flight keep the signer they
    /// started with.
    pub fn set_signer<S: Signer + 'static>(&mut self, signer: S) -> &mut Self {
        self.signer = Some(SignerBackend::blocking(signer));
        self
    }

    /// Replaces the default signer with a non-blocking one
    pub fn set_async_signer<S: AsyncSigner + 'static>(&mut self, signer: S) -> &mut Self {
        self.signer = Some(SignerBackend::non_blocking(signer));
        self
    }

    pub fn set_signer_backend(&mut self, backend: SignerBackend) -> &mut Self {
        self.signer = Some(backend);
        self
    }

    pub fn signer_backend(&self) -> Option<&SignerBackend> {
        self.signer.as_ref()
    }

    /// Address of the default signer, if any
    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(SignerBackend::address)
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }

    /// Sends `intent` with the default signer and suite
    pub async fn send_transaction(
        &self,
        intent: TransactionIntent,
    ) -> Result<TransactionReceipt, DispatchError> {
        self.send_transaction_with(intent, SendOptions::default()).await
    }

    /// Validates, signs and submits `intent`, returning the node's receipt.
    ///
    /// Configuration errors are returned before the node is contacted. A receipt reporting a
    /// failed execution is still `Ok`: inspect [`TransactionReceipt::revert_message`].
    pub async fn send_transaction_with(
        &self,
        intent: TransactionIntent,
        options: SendOptions,
    ) -> Result<TransactionReceipt, DispatchError> {
        let prepared = self.prepare(&intent, options)?;
        self.dispatch(intent, prepared).await
    }

    /// Sends `intent` on the current tokio runtime and hands the outcome to `callback`.
    ///
    /// Configuration errors are returned here and the callback is dropped without being
    /// called. Otherwise the callback runs exactly once, on whichever runtime worker completes
    /// the submission.
    pub fn spawn_send_transaction<F>(
        &self,
        intent: TransactionIntent,
        options: SendOptions,
        callback: F,
    ) -> Result<SubmissionId, DispatchError>
    where
        P: 'static,
        F: FnOnce(Result<TransactionReceipt, DispatchError>) + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        let prepared = self.prepare(&intent, options)?;
        let id = self.next_submission();
        let this = self.clone();
        let span = tracing::debug_span!("submission", id = %id);
        handle.spawn(
            async move {
                let result = this.dispatch(intent, prepared).await;
                callback(result);
            }
            .instrument(span),
        );
        Ok(id)
    }

    /// Executes a read-only call
    pub async fn call(&self, to: Address, data: Bytes) -> Result<CallResult, DispatchError> {
        self.call_request(CallRequest::new(to, data)).await
    }

    /// Executes a read-only call authenticated by `signature`, see [`sign_call`]
    ///
    /// [`sign_call`]: TransactionDispatcher::sign_call
    pub async fn call_with_signature(
        &self,
        to: Address,
        data: Bytes,
        signature: Signature,
    ) -> Result<CallResult, DispatchError> {
        self.call_request(CallRequest::new(to, data).signature(signature)).await
    }

    pub async fn call_request(&self, request: CallRequest) -> Result<CallResult, DispatchError> {
        let CallRequest { to, data, signature } = request;
        let result = match signature {
            Some(signature) => self.provider.call_with_signature(to, data, &signature).await?,
            None => self.provider.call(to, data).await?,
        };
        if !result.is_success() {
            log_failure(result.status, result.revert_message());
        }
        Ok(result)
    }

    /// Executes `request` on the current tokio runtime and hands the outcome to `callback`
    pub fn spawn_call<F>(
        &self,
        request: CallRequest,
        callback: F,
    ) -> Result<SubmissionId, DispatchError>
    where
        P: 'static,
        F: FnOnce(Result<CallResult, DispatchError>) + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        let id = self.next_submission();
        let this = self.clone();
        let span = tracing::debug_span!("call", id = %id);
        handle.spawn(
            async move {
                let result = this.call_request(request).await;
                callback(result);
            }
            .instrument(span),
        );
        Ok(id)
    }

    /// Signs a call payload with the default signer and suite, for nodes that only serve
    /// authenticated reads
    pub async fn sign_call(&self, data: &[u8]) -> Result<Signature, DispatchError> {
        let signer = self.signer.as_ref().ok_or(ConfigError::NoSigner)?;
        let suite = self.config.crypto_suite;
        if !signer.supports_suite(suite) {
            return Err(ConfigError::UnsupportedCryptoSuite(suite).into())
        }
        Ok(signer.sign_payload(data, suite).await?)
    }

    /// Resolves everything that does not need the node, failing on the first configuration
    /// problem
    fn prepare(
        &self,
        intent: &TransactionIntent,
        options: SendOptions,
    ) -> Result<Prepared, DispatchError> {
        intent.validate()?;

        // a per-call signer replaces the default one
        let signer = options.signer.or_else(|| self.signer.clone()).ok_or(ConfigError::NoSigner)?;

        let suite = options.suite.unwrap_or(self.config.crypto_suite);
        if !signer.supports_suite(suite) {
            return Err(ConfigError::UnsupportedCryptoSuite(suite).into())
        }

        let fee = intent.fee.unwrap_or_else(|| self.config.default_fee());
        if !signer.supports_fee_model(&fee) {
            return Err(ConfigError::UnsupportedFeeModel(fee).into())
        }

        Ok(Prepared { signer, suite, fee })
    }

    async fn dispatch(
        &self,
        intent: TransactionIntent,
        prepared: Prepared,
    ) -> Result<TransactionReceipt, DispatchError> {
        let Prepared { signer, suite, fee } = prepared;
        let context = self.resolve_context(&intent.nonce).await?;
        let tx = TypedTransaction::assemble(&intent, fee, context);

        let signature = signer.sign_transaction(&tx, suite).await?;
        let raw = tx.rlp_signed(&signature);
        debug!(
            hash = ?tx.hash(&signature),
            block_limit = %tx.block_limit(),
            eip1559 = fee.is_eip1559(),
            "submitting transaction"
        );

        let receipt = self.provider.send_raw_transaction(raw).await.map_err(|err| {
            if let Some(rejection) = err.rejection() {
                log_rejection(rejection);
            }
            err
        })?;
        if receipt.is_success() {
            debug!(hash = ?receipt.transaction_hash, block = receipt.block_number, "executed");
        } else if let Some(rejection) = NodeRejection::from_code(receipt.status.into()) {
            log_rejection(rejection);
        } else {
            log_failure(receipt.status, receipt.revert_message());
        }
        Ok(receipt)
    }

    async fn resolve_context(
        &self,
        nonce: &NonceSpec,
    ) -> Result<TransactionContext, DispatchError> {
        let (block_limit, nonce) = match nonce {
            NonceSpec::Explicit { block_limit, nonce } => (*block_limit, nonce.clone()),
            NonceSpec::Auto => {
                let block_number = self.provider.get_block_number().await?;
                let block_limit =
                    U256::from(block_number) + U256::from(self.config.block_limit_offset);
                (block_limit, random_nonce())
            }
        };
        Ok(TransactionContext {
            chain_id: self.config.chain_id.clone(),
            group_id: self.config.group_id.clone(),
            block_limit,
            nonce,
        })
    }

    fn next_submission(&self) -> SubmissionId {
        SubmissionId(self.submissions.fetch_add(1, Ordering::Relaxed))
    }
}

/// A fresh 256 bit nonce, in decimal
fn random_nonce() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    U256::from_big_endian(&bytes).to_string()
}

fn log_rejection(rejection: NodeRejection) {
    warn!(%rejection, transient = rejection.is_transient(), "node rejected transaction");
}

fn log_failure(status: i32, revert: RevertResolution) {
    match revert {
        RevertResolution::Found(reason) => warn!(status, %reason, "execution reverted"),
        RevertResolution::NotFound => warn!(status, "execution failed"),
    }
}
