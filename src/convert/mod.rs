//! Conversion relay subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/convert (JSON)
//!     → relay.rs (credential check)
//!     → request.rs (mode + document validation, ExternalCall)
//!     → options.rs (allow-list filtering)
//!     → upstream.rs (single GET/POST to provider, classify response)
//!     → Document | RelayError → HTTP response
//! ```

pub mod error;
pub mod options;
pub mod relay;
pub mod request;
pub mod upstream;

pub use error::{RelayError, RelayResult};
pub use options::{normalize_options, ConversionOptions, ALLOWED_OPTIONS};
pub use relay::ConversionRelay;
pub use request::{ConversionRequest, DocumentSource, ExternalCall, Mode};
pub use upstream::{Document, UpstreamClient};
