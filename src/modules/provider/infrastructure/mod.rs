pub mod external;
pub mod http_client;
pub mod monitoring;

// Re-export commonly used types
pub use external::ProviderApiClient;
pub use http_client::{HttpTransport, RequestExecutor, RetryPolicy};
pub use monitoring::{HealthMonitorConfig, ProviderHealthMonitor};
