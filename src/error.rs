//! Error types and handling for the weathercast application

use thiserror::Error;

/// Main error type for the weathercast application
#[derive(Error, Debug)]
pub enum WeathercastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An artifact could not be retrieved or written to local storage
    #[error("Download error for '{artifact}': {message}")]
    Download { artifact: String, message: String },

    /// A local artifact exists but is not a valid serialized model
    #[error("Deserialization error for '{artifact}': {message}")]
    Deserialization { artifact: String, message: String },

    /// A scaler, model or label decoder failed while forecasting
    #[error("Inference error: {message}")]
    Inference { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl WeathercastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new download error
    pub fn download<A: Into<String>, S: Into<String>>(artifact: A, message: S) -> Self {
        Self::Download {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a new deserialization error
    pub fn deserialization<A: Into<String>, S: Into<String>>(artifact: A, message: S) -> Self {
        Self::Deserialization {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(message: S) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the system
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, WeathercastError::Validation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeathercastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WeathercastError::Download { artifact, .. } => {
                format!("Unable to download model file '{artifact}'. Please check your internet connection.")
            }
            WeathercastError::Deserialization { artifact, .. } => {
                format!(
                    "Model file '{artifact}' is not a valid model export. Replace it or point the artifact catalogue at a valid one."
                )
            }
            WeathercastError::Inference { message } => {
                format!("Prediction failed: {message}")
            }
            WeathercastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}
