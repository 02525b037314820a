pub mod request_executor;
pub mod retry_policy;
pub mod transport;

pub use request_executor::{validate_response, AttemptFailure, RequestExecutor};
pub use retry_policy::{is_error_status, RetryPolicy};
pub use transport::{
    HttpTransport, ReqwestTransport, RequestHeaders, TransportError, TransportResponse,
};
