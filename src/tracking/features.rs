//! Facial feature coordinates
//!
//! The per-frame output value of the feature extractor, and the exact shape
//! of the wire message sent to downstream consumers. The schema is fixed and
//! carries no version field; renaming a field breaks every consumer.

use serde::{Deserialize, Serialize};

/// Per-frame facial feature coordinates and normalized metrics.
///
/// Points are in pixel space of the source frame. The scalar metrics are
/// relative to the calibration baseline: `mouth_width` is 0.0 at the
/// calibration pose and positive when wider; the blink values are 0.0 at the
/// calibration pose and approach 1.0 as the eyelids close. `head_rotation`
/// is a crude 2D proxy (pitch, yaw, roll) derived from the eye-center-to-nose
/// vector; roll is always 0.
///
/// A zeroed value stands in for frames where no face was detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceCoordinates {
    /// Nose tip position
    pub nose_tip: [i32; 2],
    /// Left eye outer corner position
    pub left_eye: [i32; 2],
    /// Right eye outer corner position
    pub right_eye: [i32; 2],
    /// Mouth center position
    pub mouth_center: [i32; 2],
    /// Mouth width relative to baseline (0.0 = calibration pose)
    pub mouth_width: f64,
    /// Left eye blink degree (0.0 = open as calibrated, 1.0 = closed)
    pub eye_blink_left: f64,
    /// Right eye blink degree (0.0 = open as calibrated, 1.0 = closed)
    pub eye_blink_right: f64,
    /// Head rotation proxy (pitch, yaw, roll); roll is always 0
    pub head_rotation: [f64; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let coords = FaceCoordinates::default();
        assert_eq!(coords.nose_tip, [0, 0]);
        assert_eq!(coords.mouth_center, [0, 0]);
        assert_eq!(coords.mouth_width, 0.0);
        assert_eq!(coords.eye_blink_left, 0.0);
        assert_eq!(coords.eye_blink_right, 0.0);
        assert_eq!(coords.head_rotation, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_wire_field_names() {
        let coords = FaceCoordinates {
            nose_tip: [320, 260],
            left_eye: [280, 220],
            right_eye: [360, 220],
            mouth_center: [320, 320],
            mouth_width: 0.25,
            eye_blink_left: 0.1,
            eye_blink_right: 0.2,
            head_rotation: [0.05, -0.02, 0.0],
        };

        let value = serde_json::to_value(&coords).unwrap();
        let obj = value.as_object().unwrap();

        for field in [
            "nose_tip",
            "left_eye",
            "right_eye",
            "mouth_center",
            "mouth_width",
            "eye_blink_left",
            "eye_blink_right",
            "head_rotation",
        ] {
            assert!(obj.contains_key(field), "missing wire field {}", field);
        }
        assert_eq!(obj.len(), 8);
        assert_eq!(value["nose_tip"], serde_json::json!([320, 260]));
        assert_eq!(value["head_rotation"], serde_json::json!([0.05, -0.02, 0.0]));
    }
}
