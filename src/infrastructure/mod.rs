//! Outbound plumbing: HTTP and logging.

pub mod http_client;
pub mod logging;

pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{LoggingConfig, init_logging, init_logging_with_config};
