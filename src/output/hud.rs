//! Coordinate readout logging
//!
//! Formats the same per-frame lines the tracker preview overlays on the
//! video and writes them to the log at a configurable frame interval.

use crate::error::FacelinkError;
use crate::output::CoordinateSink;
use crate::tracking::features::FaceCoordinates;

/// Format the per-frame readout lines
pub fn readout_lines(coords: &FaceCoordinates) -> Vec<String> {
    vec![
        format!("Nose Tip: ({}, {})", coords.nose_tip[0], coords.nose_tip[1]),
        format!("Left Eye: ({}, {})", coords.left_eye[0], coords.left_eye[1]),
        format!(
            "Right Eye: ({}, {})",
            coords.right_eye[0], coords.right_eye[1]
        ),
        format!(
            "Mouth Center: ({}, {})",
            coords.mouth_center[0], coords.mouth_center[1]
        ),
        format!("Mouth Width: {:.2}", coords.mouth_width),
        format!("Left Eye Blink: {:.2}", coords.eye_blink_left),
        format!("Right Eye Blink: {:.2}", coords.eye_blink_right),
        format!(
            "Head Rotation: ({:.3}, {:.3}, {:.3})",
            coords.head_rotation[0], coords.head_rotation[1], coords.head_rotation[2]
        ),
    ]
}

/// Logs the coordinate readout every `interval` processed frames
pub struct HudLog {
    interval: u64,
    frames: u64,
}

impl HudLog {
    /// Create a readout logger with the given frame interval
    pub fn new(interval: u32) -> Self {
        Self {
            interval: u64::from(interval.max(1)),
            frames: 0,
        }
    }

    fn due(&self) -> bool {
        self.frames % self.interval == 0
    }
}

impl CoordinateSink for HudLog {
    fn name(&self) -> &'static str {
        "hud-log"
    }

    fn send(&mut self, coords: &FaceCoordinates) -> Result<(), FacelinkError> {
        self.frames += 1;
        if self.due() {
            for line in readout_lines(coords) {
                tracing::debug!("{}", line);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_lines() {
        let coords = FaceCoordinates {
            nose_tip: [320, 260],
            left_eye: [280, 220],
            right_eye: [360, 220],
            mouth_center: [320, 320],
            mouth_width: 0.5,
            eye_blink_left: 0.25,
            eye_blink_right: 1.0,
            head_rotation: [0.0833, -0.0125, 0.0],
        };

        let lines = readout_lines(&coords);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Nose Tip: (320, 260)");
        assert_eq!(lines[3], "Mouth Center: (320, 320)");
        assert_eq!(lines[4], "Mouth Width: 0.50");
        assert_eq!(lines[6], "Right Eye Blink: 1.00");
        assert_eq!(lines[7], "Head Rotation: (0.083, -0.013, 0.000)");
    }

    #[test]
    fn test_interval_schedule() {
        let mut hud = HudLog::new(3);
        let coords = FaceCoordinates::default();

        let mut logged = Vec::new();
        for _ in 0..7 {
            hud.send(&coords).unwrap();
            logged.push(hud.due());
        }
        // Fires on frames 3 and 6
        assert_eq!(
            logged,
            vec![false, false, true, false, false, true, false]
        );
    }

    #[test]
    fn test_zero_interval_clamps_to_every_frame() {
        let mut hud = HudLog::new(0);
        hud.send(&FaceCoordinates::default()).unwrap();
        assert!(hud.due());
    }
}
