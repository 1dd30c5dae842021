use async_trait::async_trait;
use bcos_core::{
    abi::{self, Token},
    types::{
        Address, Bytes, CryptoSuite, FeeModel, Signature, TransactionIntent, TxHash,
        TypedTransaction, H256, U256,
    },
    utils::keccak256,
};
use bcos_middleware::{
    CallRequest, ConfigError, DispatchError, DispatcherConfig, SendOptions, TransactionDispatcher,
};
use bcos_providers::{JsonRpcError, MockProvider, MockResponse, NodeRejection, Provider};
use bcos_signers::{AsyncSigner, LocalWallet, Signer, SignerError};
use serde_json::json;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc, Mutex,
    },
    time::Duration,
};
use tokio::sync::oneshot;
use tracing_test::traced_test;

const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

/// Signs with a local key and remembers every transaction it was asked to sign
#[derive(Debug)]
struct RecordingSigner {
    wallet: LocalWallet,
    signed: Mutex<Vec<(TypedTransaction, Signature)>>,
}

impl RecordingSigner {
    fn new() -> Arc<Self> {
        Self::with_wallet(LocalWallet::new(&mut rand::thread_rng()))
    }

    fn with_wallet(wallet: LocalWallet) -> Arc<Self> {
        Arc::new(Self { wallet, signed: Mutex::new(Vec::new()) })
    }

    fn signed(&self) -> Vec<(TypedTransaction, Signature)> {
        self.signed.lock().unwrap().clone()
    }
}

impl Signer for RecordingSigner {
    fn sign_payload(&self, payload: &[u8], suite: CryptoSuite) -> Result<Signature, SignerError> {
        self.wallet.sign_payload(payload, suite)
    }

    fn sign_transaction(
        &self,
        tx: &TypedTransaction,
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError> {
        let signature = self.wallet.sign_transaction(tx, suite)?;
        self.signed.lock().unwrap().push((tx.clone(), signature));
        Ok(signature)
    }

    fn address(&self) -> Address {
        self.wallet.address()
    }

    fn supports_suite(&self, suite: CryptoSuite) -> bool {
        self.wallet.supports_suite(suite)
    }
}

/// A remote signing service that only prices transactions the legacy way
#[derive(Debug)]
struct LegacyOnlyService(LocalWallet);

#[async_trait]
impl AsyncSigner for LegacyOnlyService {
    async fn sign_payload(
        &self,
        payload: &[u8],
        suite: CryptoSuite,
    ) -> Result<Signature, SignerError> {
        self.0.sign_payload(payload, suite)
    }

    fn address(&self) -> Address {
        self.0.address()
    }

    fn supports_fee_model(&self, fee: &FeeModel) -> bool {
        !fee.is_eip1559()
    }
}

fn receipt_json(status: i32, output: &str) -> serde_json::Value {
    json!({
        "blockNumber": 11,
        "from": "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23",
        "gasUsed": "21000",
        "hash": format!("{:?}", TxHash::repeat_byte(0x11)),
        "output": output,
        "status": status,
        "to": "0x0000000000000000000000000000000000001000"
    })
}

fn revert_output(message: &str) -> String {
    let encoded = abi::encode(&[Token::String(message.to_string())]);
    format!("0x08c379a0{}", hex::encode(encoded))
}

fn target() -> Address {
    "0x0000000000000000000000000000000000001000".parse().unwrap()
}

fn dispatcher_with(
    signer: Arc<RecordingSigner>,
) -> (TransactionDispatcher<MockProvider>, MockProvider) {
    let (provider, mock) = Provider::mocked();
    (TransactionDispatcher::with_signer(provider, DispatcherConfig::default(), signer), mock)
}

fn without_nonce(tx: &TypedTransaction) -> TypedTransaction {
    let mut tx = tx.clone();
    match tx {
        TypedTransaction::Legacy(ref mut inner) => inner.nonce.clear(),
        TypedTransaction::Eip1559(ref mut inner) => inner.nonce.clear(),
    }
    tx
}

fn request_params(request: Option<(String, serde_json::Value)>) -> (String, serde_json::Value) {
    request.expect("a recorded request")
}

#[tokio::test]
async fn omitted_fee_and_nonce_match_the_documented_defaults() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer.clone());

    // responses pop from the back
    mock.push(receipt_json(0, "0x")).unwrap();
    mock.push(20u64).unwrap();
    mock.push(receipt_json(0, "0x")).unwrap();
    mock.push(20u64).unwrap();

    let data = vec![0x12, 0x34];
    let quick = TransactionIntent::call(target(), data.clone()).value(5u64);
    let explicit =
        TransactionIntent::call(target(), data).value(5u64).legacy(1u64, 9_000_000u64);

    dispatcher.send_transaction(quick).await.unwrap();
    dispatcher.send_transaction(explicit).await.unwrap();

    let signed = signer.signed();
    assert_eq!(signed.len(), 2);
    assert_eq!(without_nonce(&signed[0].0), without_nonce(&signed[1].0));
    assert_ne!(signed[0].0.nonce(), signed[1].0.nonce());

    let tx = &signed[0].0;
    assert_eq!(
        tx.fee_model(),
        FeeModel::Legacy { gas_price: U256::one(), gas_limit: U256::from(9_000_000u64) }
    );
    assert_eq!(*tx.block_limit(), U256::from(520u64));
    assert_eq!(tx.chain_id(), "chain0");
    assert_eq!(tx.group_id(), "group0");
    assert_eq!(*tx.value(), U256::from(5u64));
}

#[tokio::test]
async fn constructor_without_abi_never_reaches_the_transport() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer.clone());

    let intent = TransactionIntent::deploy(vec![0x60, 0x80], "");
    let err = dispatcher.send_transaction(intent).await.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Config(ConfigError::Intent(bcos_core::types::IntentError::MissingAbi))
    ));

    let intent = TransactionIntent { constructor: true, ..Default::default() };
    assert!(dispatcher.send_transaction(intent).await.unwrap_err().is_config());

    assert_eq!(mock.request_count(), 0);
    assert!(signer.signed().is_empty());
}

#[tokio::test]
async fn missing_signer_fails_fast() {
    let (provider, mock) = Provider::mocked();
    let dispatcher = TransactionDispatcher::new(provider, DispatcherConfig::default());

    let err = dispatcher
        .send_transaction(TransactionIntent::call(target(), vec![0x01]))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Config(ConfigError::NoSigner)));

    let err = dispatcher.sign_call(&[0x01]).await.unwrap_err();
    assert!(matches!(err, DispatchError::Config(ConfigError::NoSigner)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn per_call_signer_overrides_the_default() {
    let default = RecordingSigner::new();
    let per_call = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(default.clone());

    mock.push(receipt_json(0, "0x")).unwrap();
    mock.push(1u64).unwrap();

    let options = SendOptions::new().signer(per_call.clone());
    dispatcher
        .send_transaction_with(TransactionIntent::call(target(), vec![0x01]), options)
        .await
        .unwrap();

    assert!(default.signed().is_empty());
    let signed = per_call.signed();
    assert_eq!(signed.len(), 1);
    let (tx, signature) = &signed[0];
    signature.verify(tx.sighash(), per_call.address()).unwrap();
}

#[tokio::test]
async fn per_call_signer_works_without_a_default() {
    let (provider, mock) = Provider::mocked();
    let dispatcher = TransactionDispatcher::new(provider, DispatcherConfig::default());
    let signer = RecordingSigner::new();

    mock.push(receipt_json(0, "0x")).unwrap();
    mock.push(1u64).unwrap();

    let receipt = dispatcher
        .send_transaction_with(
            TransactionIntent::call(target(), vec![0x01]),
            SendOptions::new().signer(signer.clone()),
        )
        .await
        .unwrap();
    assert!(receipt.is_success());
    assert_eq!(signer.signed().len(), 1);
}

#[tokio::test]
async fn unsupported_fee_model_fails_before_any_rpc() {
    let (provider, mock) = Provider::mocked();
    let wallet: LocalWallet = KEY.parse().unwrap();
    let dispatcher = TransactionDispatcher::with_async_signer(
        provider,
        DispatcherConfig::default(),
        LegacyOnlyService(wallet),
    );

    let intent =
        TransactionIntent::call(target(), vec![0x01]).eip1559(100u64, 2u64, 1_000_000u64);
    let err = dispatcher.send_transaction(intent).await.unwrap_err();
    assert!(matches!(err, DispatchError::Config(ConfigError::UnsupportedFeeModel(_))));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn unsupported_suite_fails_before_any_rpc() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer);

    let options = SendOptions::new().suite(CryptoSuite::Sm);
    let err = dispatcher
        .send_transaction_with(TransactionIntent::call(target(), vec![0x01]), options)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Config(ConfigError::UnsupportedCryptoSuite(CryptoSuite::Sm))
    ));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn explicit_nonce_is_used_verbatim() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer.clone());
    mock.push(receipt_json(0, "0x")).unwrap();

    let intent = TransactionIntent::call(target(), vec![0x01]).nonce(600u64, "42");
    dispatcher.send_transaction(intent).await.unwrap();

    let (tx, signature) = signer.signed().remove(0);
    assert_eq!(tx.nonce(), "42");
    assert_eq!(*tx.block_limit(), U256::from(600u64));

    // no block number lookup, the only request is the submission
    assert_eq!(mock.request_count(), 1);
    let (method, params) = request_params(mock.pop_request());
    assert_eq!(method, "sendTransaction");
    assert_eq!(params[2], serde_json::to_value(tx.rlp_signed(&signature)).unwrap());
}

#[tokio::test]
async fn eip1559_transactions_are_enveloped() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer.clone());
    mock.push(receipt_json(0, "0x")).unwrap();

    let intent = TransactionIntent::call(target(), vec![0x01])
        .eip1559(100u64, 2u64, 1_000_000u64)
        .nonce(10u64, "1");
    dispatcher.send_transaction(intent).await.unwrap();

    let (tx, signature) = signer.signed().remove(0);
    assert!(tx.fee_model().is_eip1559());
    assert_eq!(tx.rlp_signed(&signature).as_ref()[0], 0x02);
}

#[tokio::test]
#[traced_test]
async fn node_rejections_are_propagated() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer);
    mock.push_response(MockResponse::Error(JsonRpcError {
        code: 10001,
        message: "BlockLimitCheckFail".to_string(),
        data: None,
    }));

    let intent = TransactionIntent::call(target(), vec![0x01]).nonce(1u64, "1");
    let err = dispatcher.send_transaction(intent).await.unwrap_err();
    assert!(matches!(err, DispatchError::Provider(_)));
    assert_eq!(err.node_rejection(), Some(NodeRejection::BlockLimitCheckFail));
    assert!(logs_contain("node rejected transaction"));
}

#[tokio::test]
#[traced_test]
async fn rejections_reported_as_receipt_status_are_logged() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer);
    mock.push(receipt_json(10004, "0x")).unwrap();

    let intent = TransactionIntent::call(target(), vec![0x01]).nonce(1u64, "1");
    let receipt = dispatcher.send_transaction(intent).await.unwrap();
    assert!(!receipt.is_success());
    assert!(logs_contain("node rejected transaction"));
    assert!(logs_contain("AlreadyInTxPool"));
    assert!(!logs_contain("execution failed"));
}

#[tokio::test]
#[traced_test]
async fn failed_receipts_are_returned_and_logged() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer);
    mock.push(receipt_json(16, &revert_output("revert: not owner"))).unwrap();

    let intent = TransactionIntent::call(target(), vec![0x01]).nonce(1u64, "1");
    let receipt = dispatcher.send_transaction(intent).await.unwrap();

    assert!(!receipt.is_success());
    assert_eq!(receipt.revert_message().message(), Some("revert: not owner"));
    assert!(logs_contain("execution reverted"));
    assert!(logs_contain("revert: not owner"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawned_send_calls_back_exactly_once() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer.clone());
    mock.push(receipt_json(0, "0x")).unwrap();
    mock.push(3u64).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let counter = calls.clone();
    let id = dispatcher
        .spawn_send_transaction(
            TransactionIntent::call(target(), vec![0x01]),
            SendOptions::default(),
            move |result| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(result);
            },
        )
        .unwrap();

    let receipt = rx.await.unwrap().unwrap();
    assert!(receipt.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(signer.signed().len(), 1);

    let next = dispatcher.spawn_call(CallRequest::new(target(), vec![0x01]), |_| {});
    assert!(next.is_ok());
    assert!(next.unwrap() > id);
}

#[tokio::test]
async fn spawned_send_reports_config_errors_synchronously() {
    let (provider, mock) = Provider::mocked();
    let dispatcher = TransactionDispatcher::new(provider, DispatcherConfig::default());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let err = dispatcher
        .spawn_send_transaction(
            TransactionIntent::call(target(), vec![0x01]),
            SendOptions::default(),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap_err();

    assert!(matches!(err, DispatchError::Config(ConfigError::NoSigner)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawned_send_delivers_node_errors_to_the_callback() {
    let (dispatcher, mock) = dispatcher_with(RecordingSigner::new());
    mock.push_rejection(NodeRejection::TxPoolIsFull);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let (tx, rx) = oneshot::channel();
    dispatcher
        .spawn_send_transaction(
            TransactionIntent::call(target(), vec![0x01]).nonce(5u64, "5"),
            SendOptions::default(),
            move |result| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(result);
            },
        )
        .unwrap();

    let err = rx.await.unwrap().unwrap_err();
    assert!(matches!(err, DispatchError::Provider(_)));
    assert_eq!(err.node_rejection(), Some(NodeRejection::TxPoolIsFull));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawned_call_delivers_node_errors_to_the_callback() {
    let (dispatcher, mock) = dispatcher_with(RecordingSigner::new());
    mock.push_response(MockResponse::Error(JsonRpcError {
        code: -32602,
        message: "invalid params".to_string(),
        data: None,
    }));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let (tx, rx) = oneshot::channel();
    dispatcher
        .spawn_call(CallRequest::new(target(), vec![0x01]), move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(result);
        })
        .unwrap();

    let err = rx.await.unwrap().unwrap_err();
    assert!(matches!(err, DispatchError::Provider(_)));
    assert_eq!(err.node_rejection(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Signs only once a message from another task on the same runtime has arrived
#[derive(Debug)]
struct WaitingSigner {
    wallet: LocalWallet,
    go: Mutex<mpsc::Receiver<()>>,
}

impl Signer for WaitingSigner {
    fn sign_payload(&self, payload: &[u8], suite: CryptoSuite) -> Result<Signature, SignerError> {
        let go = self.go.lock().unwrap();
        go.recv_timeout(Duration::from_secs(2)).map_err(SignerError::custom)?;
        self.wallet.sign_payload(payload, suite)
    }

    fn address(&self) -> Address {
        self.wallet.address()
    }
}

// single threaded runtime: the sender only runs if signing leaves the runtime thread
#[tokio::test]
async fn blocking_signers_do_not_stall_the_runtime() {
    let (go, wait) = mpsc::channel();
    let signer = WaitingSigner { wallet: KEY.parse().unwrap(), go: Mutex::new(wait) };
    let (provider, mock) = Provider::mocked();
    let dispatcher =
        TransactionDispatcher::with_signer(provider, DispatcherConfig::default(), signer);
    mock.push(receipt_json(0, "0x")).unwrap();

    tokio::spawn(async move {
        let _ = go.send(());
    });

    let intent = TransactionIntent::call(target(), vec![0x01]).nonce(1u64, "1");
    let receipt = dispatcher.send_transaction(intent).await.unwrap();
    assert!(receipt.is_success());
}

#[test]
fn spawning_needs_a_runtime() {
    let (dispatcher, _mock) = dispatcher_with(RecordingSigner::new());
    let err = dispatcher
        .spawn_send_transaction(
            TransactionIntent::call(target(), vec![0x01]),
            SendOptions::default(),
            |_| {},
        )
        .unwrap_err();
    assert!(matches!(err, DispatchError::Config(ConfigError::NoRuntime)));
}

#[tokio::test]
async fn calls_are_not_signed() {
    let signer = RecordingSigner::new();
    let (dispatcher, mock) = dispatcher_with(signer.clone());
    mock.push(json!({"blockNumber": 4, "status": 0, "output": "0x2a"})).unwrap();

    let result = dispatcher.call(target(), Bytes::from(vec![0x01])).await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.output, "0x2a");
    assert!(signer.signed().is_empty());
    mock.assert_request("call", ("group0", "", target(), Bytes::from(vec![0x01]))).unwrap();
}

#[tokio::test]
async fn authenticated_calls_carry_a_recoverable_signature() {
    let wallet: LocalWallet = KEY.parse().unwrap();
    let (dispatcher, mock) = dispatcher_with(RecordingSigner::with_wallet(wallet));
    mock.push(json!({"blockNumber": 4, "status": 0, "output": "0x"})).unwrap();

    let data = vec![0xcau8, 0xfe];
    let signature = dispatcher.sign_call(&data).await.unwrap();
    let recovered = signature.recover(H256::from(keccak256(&data))).unwrap();
    assert_eq!(Some(recovered), dispatcher.address());

    dispatcher.call_with_signature(target(), data.into(), signature).await.unwrap();
    let (method, params) = request_params(mock.pop_request());
    assert_eq!(method, "call");
    assert_eq!(params[4], json!(format!("0x{signature}")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawned_call_delivers_the_result() {
    let (dispatcher, mock) = dispatcher_with(RecordingSigner::new());
    mock.push(json!({"blockNumber": 9, "status": 16, "output": revert_output("paused")}))
        .unwrap();

    let (tx, rx) = oneshot::channel();
    dispatcher
        .spawn_call(CallRequest::new(target(), vec![0x01]), move |result| {
            let _ = tx.send(result);
        })
        .unwrap();

    let result = rx.await.unwrap().unwrap();
    assert!(!result.is_success());
    assert_eq!(result.revert_message().into_message().as_deref(), Some("paused"));
}
