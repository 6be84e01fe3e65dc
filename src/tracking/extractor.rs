//! Feature extraction and baseline calibration
//!
//! Converts a landmark snapshot into pixel-space coordinates and
//! calibration-relative metrics. The first successfully processed snapshot
//! becomes the baseline; everything after is reported relative to it.

use crate::error::TrackingError;
use crate::tracking::features::FaceCoordinates;
use crate::tracking::landmarks::{self, LandmarkSnapshot};

/// Raw distances at or below this are rejected as calibration baselines
pub const DEGENERATE_BASELINE: f64 = 1e-6;

/// Baseline measurements captured from the calibration frame.
///
/// All three baselines are set together, exactly once, on the transition
/// from uncalibrated to calibrated. `reset()` only clears the flag; the
/// stale baselines are overwritten wholesale on the next successful extract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationState {
    mouth_width_base: f64,
    eye_blink_base_left: f64,
    eye_blink_base_right: f64,
    calibrated: bool,
}

impl CalibrationState {
    /// Whether baselines have been captured
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Baseline mouth width in pixels
    pub fn mouth_width_base(&self) -> f64 {
        self.mouth_width_base
    }

    /// Baseline left eyelid distance in pixels
    pub fn eye_blink_base_left(&self) -> f64 {
        self.eye_blink_base_left
    }

    /// Baseline right eyelid distance in pixels
    pub fn eye_blink_base_right(&self) -> f64 {
        self.eye_blink_base_right
    }

    /// Clear the calibrated flag; the next successful extract recalibrates
    pub fn reset(&mut self) {
        self.calibrated = false;
    }

    fn capture(&mut self, mouth_width: f64, blink_left: f64, blink_right: f64) {
        self.mouth_width_base = mouth_width;
        self.eye_blink_base_left = blink_left;
        self.eye_blink_base_right = blink_right;
        self.calibrated = true;
    }
}

/// Derives facial features from landmark snapshots.
///
/// Owns its `CalibrationState` exclusively; nothing else mutates it.
#[derive(Debug, Default)]
pub struct FeatureExtractor {
    calibration: CalibrationState,
}

impl FeatureExtractor {
    /// Create an uncalibrated extractor
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the calibration state
    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    /// Request recalibration; the next successful extract captures fresh
    /// baselines
    pub fn recalibrate(&mut self) {
        self.calibration.reset();
    }

    /// Extract features from one snapshot.
    ///
    /// On the first call (or the first after `recalibrate`) the raw
    /// measurements become the baseline, and the returned metrics are the
    /// identity values (0.0). A degenerate calibration pose fails with
    /// `CalibrationDegenerate` without finalizing calibration, so the next
    /// frame retries.
    pub fn extract(
        &mut self,
        snapshot: &LandmarkSnapshot,
    ) -> Result<FaceCoordinates, TrackingError> {
        let width = f64::from(snapshot.frame_width());
        let height = f64::from(snapshot.frame_height());

        let to_pixel = |id: u32| -> Result<[i32; 2], TrackingError> {
            let [x, y] = snapshot
                .point(id)
                .ok_or(TrackingError::MissingLandmark(id))?;
            Ok([(x * width).round() as i32, (y * height).round() as i32])
        };

        let nose_tip = to_pixel(landmarks::NOSE_TIP)?;
        let left_eye = to_pixel(landmarks::LEFT_EYE_OUTER)?;
        let right_eye = to_pixel(landmarks::RIGHT_EYE_OUTER)?;
        let mouth_center = to_pixel(landmarks::MOUTH_CENTER)?;
        let mouth_left = to_pixel(landmarks::MOUTH_CORNER_LEFT)?;
        let mouth_right = to_pixel(landmarks::MOUTH_CORNER_RIGHT)?;
        let left_eye_top = to_pixel(landmarks::LEFT_EYELID_TOP)?;
        let left_eye_bottom = to_pixel(landmarks::LEFT_EYELID_BOTTOM)?;
        let right_eye_top = to_pixel(landmarks::RIGHT_EYELID_TOP)?;
        let right_eye_bottom = to_pixel(landmarks::RIGHT_EYELID_BOTTOM)?;

        let raw_mouth_width = pixel_distance(mouth_left, mouth_right);
        let raw_blink_left = pixel_distance(left_eye_top, left_eye_bottom);
        let raw_blink_right = pixel_distance(right_eye_top, right_eye_bottom);

        if !self.calibration.is_calibrated() {
            // Reject a degenerate pose before committing any baseline, so
            // the calibrated flag stays false and the next frame retries.
            checked_baseline("mouth_width", raw_mouth_width)?;
            checked_baseline("eye_blink_left", raw_blink_left)?;
            checked_baseline("eye_blink_right", raw_blink_right)?;
            self.calibration
                .capture(raw_mouth_width, raw_blink_left, raw_blink_right);
        }

        let mouth_base = checked_baseline("mouth_width", self.calibration.mouth_width_base())?;
        let left_base =
            checked_baseline("eye_blink_left", self.calibration.eye_blink_base_left())?;
        let right_base =
            checked_baseline("eye_blink_right", self.calibration.eye_blink_base_right())?;

        // Head rotation proxy: nose offset from the eye midpoint, scaled by
        // frame size. A 2D approximation, not a pose estimate; roll stays 0.
        let eye_center = [
            (f64::from(left_eye[0]) + f64::from(right_eye[0])) / 2.0,
            (f64::from(left_eye[1]) + f64::from(right_eye[1])) / 2.0,
        ];
        let nose_vec = [
            f64::from(nose_tip[0]) - eye_center[0],
            f64::from(nose_tip[1]) - eye_center[1],
        ];

        Ok(FaceCoordinates {
            nose_tip,
            left_eye,
            right_eye,
            mouth_center,
            mouth_width: raw_mouth_width / mouth_base - 1.0,
            eye_blink_left: 1.0 - raw_blink_left / left_base,
            eye_blink_right: 1.0 - raw_blink_right / right_base,
            head_rotation: [nose_vec[1] / height, nose_vec[0] / width, 0.0],
        })
    }
}

/// Euclidean distance between two pixel positions
fn pixel_distance(a: [i32; 2], b: [i32; 2]) -> f64 {
    let dx = f64::from(a[0] - b[0]);
    let dy = f64::from(a[1] - b[1]);
    (dx * dx + dy * dy).sqrt()
}

fn checked_baseline(measurement: &'static str, value: f64) -> Result<f64, TrackingError> {
    if value.abs() <= DEGENERATE_BASELINE {
        return Err(TrackingError::CalibrationDegenerate { measurement, value });
    }
    Ok(value)
}
