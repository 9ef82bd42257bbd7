//! PDF conversion relay library.

pub mod config;
pub mod convert;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use convert::{ConversionRelay, RelayError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
