//! Error types for Facelink

use thiserror::Error;

/// Main error type for Facelink
#[derive(Error, Debug)]
pub enum FacelinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Tracking-related errors (landmark receiver + feature extraction)
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Failed to bind landmark receiver: {0}")]
    Bind(String),

    #[error("Landmark receive error: {0}")]
    Receive(String),

    #[error("Landmark parse error: {0}")]
    Parse(String),

    #[error("Snapshot is missing landmark {0}")]
    MissingLandmark(u32),

    #[error("Degenerate calibration baseline: {measurement} = {value}")]
    CalibrationDegenerate {
        measurement: &'static str,
        value: f64,
    },

    #[error("Tracker subprocess error: {0}")]
    Subprocess(String),
}

/// Coordinate stream errors
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Failed to connect to consumer: {0}")]
    Connect(String),

    #[error("Failed to send coordinate frame: {0}")]
    Send(String),

    #[error("Failed to encode coordinate frame: {0}")]
    Encode(String),

    #[error("Failed to decode coordinate frame: {0}")]
    Decode(String),
}

/// Result type alias for Facelink operations
pub type Result<T> = std::result::Result<T, FacelinkError>;
