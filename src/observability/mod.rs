//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and HTTP layers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the trace span
//! - Metrics are recorded whether or not an exporter is installed

pub mod logging;
pub mod metrics;
