//! HTTP transport to the hosted model.

mod http;

pub use http::{Auth, HttpTransport, RetryConfig, TransportError};
