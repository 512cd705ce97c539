//! Member configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use hazelcast_wire::HazelcastError;
use thiserror::Error;

use crate::logging::{LogLevel, LoggingConfig};

/// Default member address.
pub const DEFAULT_MEMBER_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5701);

/// Error returned when configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("configuration error: {message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The validation failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ConfigError> for HazelcastError {
    fn from(err: ConfigError) -> Self {
        HazelcastError::Configuration(err.message)
    }
}

/// Settings of a member's client engine.
#[derive(Debug, Clone)]
pub struct MemberConfig {
    portable_version: i32,
    security_enabled: bool,
    member_address: SocketAddr,
    logging: LoggingConfig,
}

impl MemberConfig {
    /// Creates a builder with default values.
    pub fn builder() -> MemberConfigBuilder {
        MemberConfigBuilder::new()
    }

    /// Version stamped on class definitions built by this member.
    pub fn portable_version(&self) -> i32 {
        self.portable_version
    }

    /// Whether request permissions are checked.
    pub fn security_enabled(&self) -> bool {
        self.security_enabled
    }

    /// Address this member is reachable at.
    pub fn member_address(&self) -> SocketAddr {
        self.member_address
    }

    /// Logging settings.
    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}

impl Default for MemberConfig {
    fn default() -> Self {
        Self {
            portable_version: 0,
            security_enabled: false,
            member_address: DEFAULT_MEMBER_ADDRESS,
            logging: LoggingConfig::default(),
        }
    }
}

/// Builder for `MemberConfig`.
#[derive(Debug, Clone, Default)]
pub struct MemberConfigBuilder {
    portable_version: Option<i32>,
    security_enabled: Option<bool>,
    member_address: Option<SocketAddr>,
    logging: Option<LoggingConfig>,
}

impl MemberConfigBuilder {
    /// Creates a new member configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the portable version.
    pub fn portable_version(mut self, version: i32) -> Self {
        self.portable_version = Some(version);
        self
    }

    /// Enables or disables permission checks.
    pub fn security_enabled(mut self, enabled: bool) -> Self {
        self.security_enabled = Some(enabled);
        self
    }

    /// Sets the member address.
    pub fn member_address(mut self, address: SocketAddr) -> Self {
        self.member_address = Some(address);
        self
    }

    /// Sets the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Shorthand for a logging configuration at `level`.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        let logging = self.logging.unwrap_or_default();
        self.logging = Some(LoggingConfig::new(level).with_ansi(logging.ansi()));
        self
    }

    /// Builds the member configuration, returning an error if validation fails.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `portable_version` is negative
    /// - `member_address` has port 0
    pub fn build(self) -> Result<MemberConfig, ConfigError> {
        let defaults = MemberConfig::default();
        let portable_version = self.portable_version.unwrap_or(defaults.portable_version);
        if portable_version < 0 {
            return Err(ConfigError::new(format!(
                "portable_version must not be negative, got {}",
                portable_version
            )));
        }

        let member_address = self.member_address.unwrap_or(defaults.member_address);
        if member_address.port() == 0 {
            return Err(ConfigError::new("member_address must have a non-zero port"));
        }

        Ok(MemberConfig {
            portable_version,
            security_enabled: self.security_enabled.unwrap_or(defaults.security_enabled),
            member_address,
            logging: self.logging.unwrap_or(defaults.logging),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_member_config() {
        let config = MemberConfig::default();
        assert_eq!(config.portable_version(), 0);
        assert!(!config.security_enabled());
        assert_eq!(
            config.member_address(),
            "127.0.0.1:5701".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.logging().level(), LogLevel::Info);
    }

    #[test]
    fn test_builder_overrides() {
        let address: SocketAddr = "10.0.0.5:5702".parse().unwrap();
        let config = MemberConfig::builder()
            .portable_version(2)
            .security_enabled(true)
            .member_address(address)
            .logging(LoggingConfig::new(LogLevel::Warning).with_ansi(false))
            .build()
            .unwrap();
        assert_eq!(config.portable_version(), 2);
        assert!(config.security_enabled());
        assert_eq!(config.member_address(), address);
        assert_eq!(config.logging().level(), LogLevel::Warning);
        assert!(!config.logging().ansi());
    }

    #[test]
    fn test_log_level_keeps_ansi_setting() {
        let config = MemberConfigBuilder::new()
            .logging(LoggingConfig::default().with_ansi(false))
            .log_level(LogLevel::Finest)
            .build()
            .unwrap();
        assert_eq!(config.logging().level(), LogLevel::Finest);
        assert!(!config.logging().ansi());
    }

    #[test]
    fn test_negative_portable_version_rejected() {
        let err = MemberConfigBuilder::new()
            .portable_version(-1)
            .build()
            .unwrap_err();
        assert!(err.message().contains("portable_version"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = MemberConfigBuilder::new()
            .member_address("127.0.0.1:0".parse().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: member_address must have a non-zero port"
        );
        let as_error: &dyn std::error::Error = &err;
        assert!(as_error.source().is_none());
        let converted: HazelcastError = err.into();
        assert!(matches!(converted, HazelcastError::Configuration(_)));
    }
}
