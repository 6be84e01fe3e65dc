//! Facelink - Facial Kinematics Streaming Service
//!
//! A small service that:
//! - Receives per-frame facial landmarks from an external tracker process
//! - Calibrates a baseline pose and derives normalized kinematic features
//!   (mouth width, eye openness, approximate head rotation)
//! - Streams the features to a downstream avatar consumer over TCP

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod tracking;

pub use config::Config;
pub use error::{FacelinkError, Result};
pub use pipeline::{FrameOutcome, Pipeline};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
