use crate::{errors::ProviderError, Http, JsonRpcClient, MockProvider};
use bcos_core::types::{
    serde_helpers::StringifiedNumeric, Address, Bytes, CallResult, Signature, TransactionReceipt,
    TxHash,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, fmt::Debug};
use tracing::trace;
use tracing_futures::Instrument;
use url::{ParseError, Url};

/// The group requests are routed to unless configured otherwise
pub const DEFAULT_GROUP: &str = "group0";

/// An abstract provider for interacting with a FISCO BCOS node. Requires a [`JsonRpcClient`]
/// transport.
///
/// Every node method is scoped to a group and, optionally, to a named node inside it. An empty
/// node name lets the gateway pick one.
///
/// # Example
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use bcos_providers::{Provider, Http};
/// use std::convert::TryFrom;
///
/// let provider = Provider::<Http>::try_from("http://127.0.0.1:20200")
///     .expect("could not instantiate HTTP Provider")
///     .with_group("group0");
///
/// let block = provider.get_block_number().await?;
/// println!("Got block: {block}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
    group: String,
    node: String,
}

impl<P> AsRef<P> for Provider<P> {
    fn as_ref(&self) -> &P {
        &self.inner
    }
}

impl<P: JsonRpcClient> Provider<P> {
    /// Instantiate a new provider with a backend.
    pub fn new(provider: P) -> Self {
        Self { inner: provider, group: DEFAULT_GROUP.to_string(), node: String::new() }
    }

    #[must_use]
    /// Sets the group every request is scoped to
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    #[must_use]
    /// Routes every request to the named node
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    /// Make an RPC request via the internal connection, and return the result.
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Debug + Send,
    {
        let span =
            tracing::trace_span!("rpc", method = method, params = ?serde_json::to_string(&params)?);
        // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
        let res = async move {
            trace!("tx");
            let res: R = self.inner.request(method, params).await.map_err(Into::into)?;
            trace!(rx = ?res);
            Ok::<_, ProviderError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }

    /// Gets the latest block number
    pub async fn get_block_number(&self) -> Result<u64, ProviderError> {
        let number: StringifiedNumeric =
            self.request("getBlockNumber", (&self.group, &self.node)).await?;
        u64::try_from(number)
            .map_err(|reason| ProviderError::InvalidResponse { method: "getBlockNumber", reason })
    }

    /// Submits a signed transaction and waits for the node to return its receipt
    pub async fn send_raw_transaction(
        &self,
        tx: Bytes,
    ) -> Result<TransactionReceipt, ProviderError> {
        // the last parameter requests a merkle proof along with the receipt
        self.request("sendTransaction", (&self.group, &self.node, tx, false)).await
    }

    /// Gets the receipt of an executed transaction, `None` if unknown to the node
    pub async fn get_transaction_receipt<T: Send + Sync + Into<TxHash>>(
        &self,
        transaction_hash: T,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let hash = transaction_hash.into();
        self.request("getTransactionReceipt", (&self.group, &self.node, hash, false)).await
    }

    /// Executes a read-only call. Nothing is signed and no state changes.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<CallResult, ProviderError> {
        self.request("call", (&self.group, &self.node, to, data)).await
    }

    /// Executes a read-only call authenticated by a signature over the call payload, for nodes
    /// that restrict reads
    pub async fn call_with_signature(
        &self,
        to: Address,
        data: Bytes,
        signature: &Signature,
    ) -> Result<CallResult, ProviderError> {
        let signature = format!("0x{signature}");
        self.request("call", (&self.group, &self.node, to, data, signature)).await
    }
}

impl Provider<MockProvider> {
    /// Returns a `Provider` instantiated with an internal "mock" transport.
    ///
    /// # Example
    ///
    /// ```
    /// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
    /// use bcos_providers::Provider;
    ///
    /// // Instantiate the provider
    /// let (provider, mock) = Provider::mocked();
    /// // Push the mock response
    /// mock.push(12u64)?;
    /// // Make the call
    /// let blk = provider.get_block_number().await.unwrap();
    /// // The response matches
    /// assert_eq!(blk, 12);
    /// // and the request as well!
    /// mock.assert_request("getBlockNumber", ("group0", ""))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn mocked() -> (Self, MockProvider) {
        let mock = MockProvider::new();
        let mock_clone = mock.clone();
        (Self::new(mock), mock_clone)
    }
}

impl TryFrom<&str> for Provider<Http> {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(Http::new(Url::parse(src)?)))
    }
}

impl TryFrom<String> for Provider<Http> {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}
