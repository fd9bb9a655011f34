use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OffboardError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures of the messaging bridge between this process and the
/// flight controller.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransportError {
    #[error("The link to the flight controller is down.")]
    Disconnected,
    #[error("The requested service is not available on the flight controller.")]
    Unavailable,
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Could not read configuration file: {0}")]
    Io(String),
    #[error("Could not parse configuration: {0}")]
    Parse(String),
    #[error("Invalid configuration value for <{field}>: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value.to_string())
    }
}
