//! Output module
//!
//! Consumers of extracted face coordinates:
//! - TCP coordinate stream (length-prefixed JSON frames)
//! - HUD log (the per-frame readout, written to the log)

pub mod hud;
pub mod stream;

pub use hud::HudLog;
pub use stream::CoordinateStream;

use crate::error::FacelinkError;
use crate::tracking::features::FaceCoordinates;

/// An independent consumer of per-frame face coordinates.
///
/// Sinks are driven one after another on the frame loop's thread; a slow
/// sink stalls capture. A sink error is a transport failure and terminates
/// the loop.
pub trait CoordinateSink {
    /// Short sink name for logs
    fn name(&self) -> &'static str;

    /// Deliver one frame's coordinates
    fn send(&mut self, coords: &FaceCoordinates) -> Result<(), FacelinkError>;
}
