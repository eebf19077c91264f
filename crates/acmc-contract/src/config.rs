//! Contract configuration.
//!
//! Names the storage locations the contract reads and writes and the roles
//! seeded on first registration. Loaded from environment variables with
//! defaults matching the deployed contract.

use acmc_ledger::{COMPOSITE_KEY_NAMESPACE, MAX_UNICODE_RUNE};
use acmc_rbac::{DEFAULT_POLICY_NAMESPACE, DEFAULT_ROLES, DEFAULT_ROLE_SET_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::audit::DEFAULT_LOG_SEPARATOR;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Contract configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Roles written to the role set on first registration.
    pub default_roles: Vec<String>,

    /// State key of the role set.
    pub role_set_key: String,

    /// Composite-key namespace of policy entries.
    pub policy_namespace: String,

    /// Infix between content id and transaction id in audit keys.
    pub log_separator: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            default_roles: DEFAULT_ROLES.iter().map(|r| r.to_string()).collect(),
            role_set_key: DEFAULT_ROLE_SET_KEY.to_string(),
            policy_namespace: DEFAULT_POLICY_NAMESPACE.to_string(),
            log_separator: DEFAULT_LOG_SEPARATOR.to_string(),
        }
    }
}

impl ContractConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACMC_DEFAULT_ROLES`: Comma-separated seed roles (default: Creator,Contributor,Public)
    /// - `ACMC_ROLE_SET_KEY`: Role set state key (default: roleSet)
    /// - `ACMC_POLICY_NAMESPACE`: Policy composite-key namespace (default: policy)
    /// - `ACMC_LOG_SEPARATOR`: Audit key infix (default: _log_)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            default_roles: std::env::var("ACMC_DEFAULT_ROLES")
                .map(|s| parse_role_list(&s))
                .unwrap_or(default.default_roles),
            role_set_key: std::env::var("ACMC_ROLE_SET_KEY").unwrap_or(default.role_set_key),
            policy_namespace: std::env::var("ACMC_POLICY_NAMESPACE").unwrap_or(default.policy_namespace),
            log_separator: std::env::var("ACMC_LOG_SEPARATOR").unwrap_or(default.log_separator),
        }
    }

    /// Validate the configuration before the contract is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_roles.is_empty() {
            return Err(ConfigError::invalid("default_roles", "at least one role is required"));
        }

        let mut seen = HashSet::new();
        for role in &self.default_roles {
            if role.trim().is_empty() {
                return Err(ConfigError::invalid("default_roles", "role names must not be blank"));
            }
            if !seen.insert(role.as_str()) {
                return Err(ConfigError::invalid("default_roles", format!("duplicate role {:?}", role)));
            }
        }

        if self.role_set_key.is_empty() {
            return Err(ConfigError::invalid("role_set_key", "must not be empty"));
        }
        if self.role_set_key.starts_with(COMPOSITE_KEY_NAMESPACE) {
            return Err(ConfigError::invalid("role_set_key", "must be a simple key"));
        }

        if self.policy_namespace.is_empty() {
            return Err(ConfigError::invalid("policy_namespace", "must not be empty"));
        }
        if self
            .policy_namespace
            .chars()
            .any(|c| c == COMPOSITE_KEY_NAMESPACE || c == MAX_UNICODE_RUNE)
        {
            return Err(ConfigError::invalid(
                "policy_namespace",
                "must not contain composite key delimiters",
            ));
        }

        if self.log_separator.is_empty() {
            return Err(ConfigError::invalid("log_separator", "must not be empty"));
        }

        Ok(())
    }
}

fn parse_role_list(s: &str) -> Vec<String> {
    s.split(',').map(|r| r.trim().to_string()).filter(|r| !r.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ContractConfig::default();
        assert_eq!(config.default_roles, vec!["Creator", "Contributor", "Public"]);
        assert_eq!(config.role_set_key, "roleSet");
        assert_eq!(config.policy_namespace, "policy");
        assert_eq!(config.log_separator, "_log_");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_role_list() {
        assert_eq!(parse_role_list("Owner, Reader ,,Guest"), vec!["Owner", "Reader", "Guest"]);
        assert!(parse_role_list(" , ").is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_roles() {
        let mut config = ContractConfig::default();
        config.default_roles.clear();
        assert!(config.validate().is_err());

        config.default_roles = vec!["Creator".to_string(), " ".to_string()];
        assert!(config.validate().is_err());

        config.default_roles = vec!["Creator".to_string(), "Creator".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        let config = ContractConfig {
            role_set_key: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ContractConfig {
            role_set_key: "\u{0}roles".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ContractConfig {
            policy_namespace: "pol\u{0}icy".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                key: "policy_namespace".to_string(),
                message: "must not contain composite key delimiters".to_string(),
            })
        );

        let config = ContractConfig {
            log_separator: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde() {
        let json = serde_json::to_string(&ContractConfig::default()).unwrap();
        let parsed: ContractConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ContractConfig::default());
    }
}
