//! Frame processing pipeline
//!
//! Drives the single-threaded per-frame loop: poll the landmark source,
//! extract features, fan the result out to every sink. One iteration per
//! video frame; the transport write blocks the same thread, so a slow
//! consumer stalls capture rather than queueing frames.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FacelinkError, TrackingError};
use crate::output::CoordinateSink;
use crate::tracking::extractor::{CalibrationState, FeatureExtractor};
use crate::tracking::features::FaceCoordinates;
use crate::tracking::receiver::{Detection, LandmarkSource};

/// What happened to a single processed frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A face was tracked and coordinates were emitted
    Tracked(FaceCoordinates),
    /// No face this frame; zeroed coordinates were emitted and the
    /// calibration was left untouched
    FaceAbsent,
    /// The calibration frame was degenerate; nothing was emitted and
    /// calibration retries on the next frame
    CalibrationRetry,
    /// The snapshot was unusable (missing a required landmark); nothing
    /// was emitted
    SnapshotInvalid,
}

/// Single-threaded frame loop wiring a landmark source to coordinate sinks
pub struct Pipeline<S> {
    source: S,
    extractor: FeatureExtractor,
    sinks: Vec<Box<dyn CoordinateSink>>,
    frames: u64,
}

impl<S: LandmarkSource> Pipeline<S> {
    /// Create a pipeline around a landmark source with no sinks attached
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: FeatureExtractor::new(),
            sinks: Vec::new(),
            frames: 0,
        }
    }

    /// Attach an output sink; sinks receive every emitted frame in order
    pub fn add_sink(&mut self, sink: Box<dyn CoordinateSink>) {
        tracing::info!("Attached sink: {}", sink.name());
        self.sinks.push(sink);
    }

    /// Read access to the extractor's calibration state
    pub fn calibration(&self) -> &CalibrationState {
        self.extractor.calibration()
    }

    /// Request recalibration on the next tracked frame
    pub fn recalibrate(&mut self) {
        tracing::info!("Recalibration requested");
        self.extractor.recalibrate();
    }

    /// Number of detector reports processed so far
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Deliver one frame's coordinates to every sink in attachment order.
    ///
    /// Sinks run on this thread; the first sink error is returned and ends
    /// the loop.
    fn emit(&mut self, coords: &FaceCoordinates) -> Result<(), FacelinkError> {
        for sink in &mut self.sinks {
            sink.send(coords)?;
        }
        Ok(())
    }

    /// Process one detector report and fan the result out to the sinks.
    ///
    /// Local conditions (no face, degenerate calibration, unusable
    /// snapshot) are absorbed into the returned outcome; sink and
    /// extraction failures beyond those are returned as errors.
    pub fn step(&mut self, detection: Detection) -> Result<FrameOutcome, FacelinkError> {
        self.frames += 1;

        match detection {
            Detection::Absent => {
                // Zero-valued output; baselines and the calibrated flag
                // must stay untouched.
                self.emit(&FaceCoordinates::default())?;
                Ok(FrameOutcome::FaceAbsent)
            }
            Detection::Face(snapshot) => match self.extractor.extract(&snapshot) {
                Ok(coords) => {
                    self.emit(&coords)?;
                    Ok(FrameOutcome::Tracked(coords))
                }
                Err(TrackingError::CalibrationDegenerate { measurement, value }) => {
                    tracing::warn!(
                        "Degenerate calibration frame ({} = {}), retrying next frame",
                        measurement,
                        value
                    );
                    Ok(FrameOutcome::CalibrationRetry)
                }
                Err(e @ TrackingError::MissingLandmark(_)) => {
                    tracing::warn!("Skipping unusable snapshot: {}", e);
                    Ok(FrameOutcome::SnapshotInvalid)
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Run until the stop flag is set or a fatal error occurs.
    ///
    /// Transport and upstream failures terminate the loop; everything the
    /// pipeline owns is released on the way out via drop.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), FacelinkError> {
        while !stop.load(Ordering::Relaxed) {
            let detection = match self.source.next_detection() {
                Ok(Some(detection)) => detection,
                // Poll timeout; re-check the stop flag
                Ok(None) => continue,
                Err(TrackingError::Parse(msg)) => {
                    tracing::warn!("Dropping malformed landmark packet: {}", msg);
                    continue;
                }
                // Upstream failure is fatal
                Err(e) => return Err(e.into()),
            };

            self.step(detection)?;
        }

        tracing::info!("Pipeline stopped after {} frames", self.frames);
        Ok(())
    }
}
