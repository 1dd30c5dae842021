mod jsonrpc;
pub use jsonrpc::{JsonRpcError, NodeRejection};

mod http;
pub use self::http::{Http, HttpClientError};

mod mock;
pub use mock::{MockError, MockProvider, MockResponse};
