//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (parents reference earlier resources)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Detect duplicate resource names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Verb tokens are not checked; unknown verbs simply bind nothing

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("resource #{0} has no title")]
    MissingTitle(usize),

    #[error("resource `{0}` is declared more than once")]
    DuplicateResource(String),

    #[error("resource `{name}` references parent `{parent}` which is not declared before it")]
    UnknownParent { name: String, parent: String },
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut seen: HashSet<String> = HashSet::new();
    for (index, resource) in config.resources.iter().enumerate() {
        let Some(name) = resource
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
        else {
            errors.push(ValidationError::MissingTitle(index));
            continue;
        };

        if let Some(parent) = &resource.parent {
            if !seen.contains(&parent.trim().to_lowercase()) {
                errors.push(ValidationError::UnknownParent {
                    name: name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        if !seen.insert(name.clone()) {
            errors.push(ValidationError::DuplicateResource(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ResourceConfig;

    fn resource(title: &str, parent: Option<&str>) -> ResourceConfig {
        ResourceConfig {
            title: Some(title.to_string()),
            parent: parent.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_parent_must_come_first() {
        let mut config = ServiceConfig::default();
        config.resources.push(resource("Gadget", Some("Widget")));
        config.resources.push(resource("Widget", None));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownParent {
                name: "gadget".into(),
                parent: "Widget".into(),
            }]
        );
    }

    #[test]
    fn test_duplicate_names_case_insensitive() {
        let mut config = ServiceConfig::default();
        config.resources.push(resource("Widget", None));
        config.resources.push(resource("WIDGET", None));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateResource("widget".into())]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.request_secs = 0;
        config.security.max_body_size = 0;
        config.resources.push(ResourceConfig::default());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingTitle(0)));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("bad".into())]
        );
    }
}
