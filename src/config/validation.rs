//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.max_body_size must be greater than zero")]
    BodyLimit,

    #[error("upstream.endpoint '{0}' is not an absolute http(s) URL")]
    Endpoint(String),

    #[error("upstream.service_name must not be empty")]
    ServiceName,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if parse_endpoint(&config.upstream.endpoint).is_none() {
        errors.push(ValidationError::Endpoint(config.upstream.endpoint.clone()));
    }

    if config.upstream.service_name.trim().is_empty() {
        errors.push(ValidationError::ServiceName);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse an endpoint, accepting only http and https URLs with a host.
pub fn parse_endpoint(endpoint: &str) -> Option<Url> {
    let url = Url::parse(endpoint).ok()?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Some(url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "localhost".into();
        config.listener.max_body_size = 0;
        config.upstream.endpoint = "ftp://example.com".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nope".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::BodyLimit));
        assert!(errors.contains(&ValidationError::Endpoint("ftp://example.com".into())));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("https://api.pdflayer.com/api/convert").is_some());
        assert!(parse_endpoint("http://127.0.0.1:9000/convert").is_some());
        assert!(parse_endpoint("/api/convert").is_none());
        assert!(parse_endpoint("mailto:a@b.c").is_none());
    }
}
