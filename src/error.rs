//! Error types for halo cooling.
//!
//! All errors are strongly typed using thiserror. Configuration and table
//! errors are static-data failures surfaced before a simulation starts; the
//! per-halo cooling computation itself never fails.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{option} option value invalid: {value}. Supported values are {supported}")]
    InvalidConfiguration {
        option: String,
        value: String,
        supported: String,
    },

    #[error("Failed to parse configuration: {message}")]
    Parse {
        message: String,
    },

    #[error("Failed to read configuration file {}: {message}", path.display())]
    Io {
        path: PathBuf,
        message: String,
    },
}

impl ConfigError {
    /// Creates an `InvalidConfiguration` error for a selector option.
    #[must_use]
    pub fn invalid(option: &str, value: &str, supported: &[&str]) -> Self {
        Self::InvalidConfiguration {
            option: option.to_string(),
            value: value.to_string(),
            supported: supported.join(" and "),
        }
    }
}

/// Errors raised by the batch runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Cooling queue is full (capacity: {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Cooling workers disconnected")]
    Disconnected,

    #[error("Cooling job timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Failed to spawn cooling worker: {message}")]
    Spawn {
        message: String,
    },
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum CoolingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid interpolation input: {reason}")]
    InvalidInterpolationInput {
        reason: String,
    },

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl CoolingError {
    /// Creates an `InvalidInterpolationInput` error.
    #[must_use]
    pub fn interpolation(reason: impl Into<String>) -> Self {
        Self::InvalidInterpolationInput {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an interpolation input error.
    #[must_use]
    pub const fn is_interpolation(&self) -> bool {
        matches!(self, Self::InvalidInterpolationInput { .. })
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) | Self::InvalidInterpolationInput { .. } => false,
            Self::Runtime(e) => matches!(e, RuntimeError::QueueFull { .. } | RuntimeError::Timeout { .. }),
        }
    }
}

/// Result type alias for halo cooling operations.
pub type CoolingResult<T> = Result<T, CoolingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_message() {
        let err = ConfigError::invalid("gas_cooling.model", "Galform", &["Croton06", "Benson10"]);
        let msg = format!("{err}");
        assert!(msg.contains("gas_cooling.model"));
        assert!(msg.contains("Galform"));
        assert!(msg.contains("Croton06 and Benson10"));
    }

    #[test]
    fn test_interpolation_error_message() {
        let err = CoolingError::interpolation("x axis has 1 points");
        assert!(err.is_interpolation());
        assert!(!err.is_configuration());
        assert!(format!("{err}").contains("x axis has 1 points"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: CoolingError = ConfigError::Parse {
            message: "eof".to_string(),
        }
        .into();
        assert!(err.is_configuration());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable() {
        let full: CoolingError = RuntimeError::QueueFull { capacity: 4 }.into();
        assert!(full.is_retryable());
        assert!(format!("{full}").contains("capacity: 4"));

        let late: CoolingError = RuntimeError::Timeout { duration_ms: 10 }.into();
        assert!(late.is_retryable());

        let gone: CoolingError = RuntimeError::Disconnected.into();
        assert!(!gone.is_retryable());
    }
}
