//! Landmark tracker receiver
//!
//! Receives JSON-over-UDP packets from the `scripts/landmark_tracker.py`
//! helper. The helper owns the capture device and detection model and sends
//! one datagram per captured frame: either the normalized landmark set or an
//! explicit no-face signal.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::UdpSocket;
use std::time::Duration;

use crate::config::TrackerConfig;
use crate::error::TrackingError;
use crate::tracking::landmarks::LandmarkSnapshot;

/// Poll timeout for the UDP socket; bounds how long the driver loop waits
/// before re-checking its stop flag
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A single JSON packet from the landmark tracker
#[derive(Debug, Clone, Deserialize)]
pub struct LandmarkPacket {
    /// Whether a face was detected this frame
    pub face_detected: bool,
    /// Canonical landmark id → normalized [x, y] position
    #[serde(default)]
    pub landmarks: BTreeMap<u32, [f64; 2]>,
    /// Source frame width in pixels
    pub frame_width: u32,
    /// Source frame height in pixels
    pub frame_height: u32,
}

impl LandmarkPacket {
    /// Convert the wire packet into a per-frame detection report
    pub fn into_detection(self) -> Detection {
        if self.face_detected {
            Detection::Face(LandmarkSnapshot::new(
                self.landmarks,
                self.frame_width,
                self.frame_height,
            ))
        } else {
            Detection::Absent
        }
    }
}

/// One frame's detector report
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// A face was found and its landmarks captured
    Face(LandmarkSnapshot),
    /// The detector saw no face this frame
    Absent,
}

/// A per-frame producer of landmark detections
pub trait LandmarkSource {
    /// Block until the next frame report, the poll timeout, or an error.
    ///
    /// `Ok(None)` means no report arrived within the timeout; the caller
    /// should re-check its stop flag and poll again.
    fn next_detection(&mut self) -> Result<Option<Detection>, TrackingError>;
}

/// Blocking JSON-over-UDP receiver for the helper tracker
pub struct LandmarkReceiver {
    socket: UdpSocket,
}

impl LandmarkReceiver {
    /// Bind the UDP socket and start receiving
    pub fn bind(config: &TrackerConfig) -> Result<Self, TrackingError> {
        let addr = format!("{}:{}", config.listen_address, config.port);

        let socket = UdpSocket::bind(&addr)
            .map_err(|e| TrackingError::Bind(format!("Failed to bind to {}: {}", addr, e)))?;

        socket
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| TrackingError::Bind(format!("Failed to set read timeout: {}", e)))?;

        tracing::info!("Landmark receiver listening on {}", addr);

        Ok(Self { socket })
    }
}

impl LandmarkSource for LandmarkReceiver {
    fn next_detection(&mut self) -> Result<Option<Detection>, TrackingError> {
        let mut buf = [0u8; 65536];

        match self.socket.recv(&mut buf) {
            Ok(size) if size > 0 => {
                let packet: LandmarkPacket = serde_json::from_slice(&buf[..size])
                    .map_err(|e| TrackingError::Parse(format!("JSON parse error: {}", e)))?;
                Ok(Some(packet.into_detection()))
            }
            Ok(_) => Ok(None),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(TrackingError::Receive(format!("Receive error: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::landmarks::{NOSE_TIP, RIGHT_EYE_OUTER};

    fn sample_json() -> String {
        serde_json::json!({
            "face_detected": true,
            "landmarks": {
                "0": [0.5, 0.66],
                "1": [0.5, 0.54],
                "33": [0.43, 0.45],
                "263": [0.56, 0.45]
            },
            "frame_width": 640,
            "frame_height": 480
        })
        .to_string()
    }

    #[test]
    fn test_parse_packet() {
        let pkt: LandmarkPacket = serde_json::from_str(&sample_json()).unwrap();

        assert!(pkt.face_detected);
        assert_eq!(pkt.landmarks.len(), 4);
        assert_eq!(pkt.landmarks[&NOSE_TIP], [0.5, 0.54]);
        assert_eq!(pkt.landmarks[&RIGHT_EYE_OUTER], [0.56, 0.45]);
        assert_eq!(pkt.frame_width, 640);
        assert_eq!(pkt.frame_height, 480);
    }

    #[test]
    fn test_parse_no_face() {
        let json = r#"{"face_detected":false,"frame_width":640,"frame_height":480}"#;
        let pkt: LandmarkPacket = serde_json::from_str(json).unwrap();
        assert!(!pkt.face_detected);
        assert!(pkt.landmarks.is_empty());
        assert_eq!(pkt.into_detection(), Detection::Absent);
    }

    #[test]
    fn test_into_detection_carries_snapshot() {
        let pkt: LandmarkPacket = serde_json::from_str(&sample_json()).unwrap();

        match pkt.into_detection() {
            Detection::Face(snapshot) => {
                assert_eq!(snapshot.len(), 4);
                assert_eq!(snapshot.point(NOSE_TIP), Some([0.5, 0.54]));
                assert_eq!(snapshot.frame_width(), 640);
                assert_eq!(snapshot.frame_height(), 480);
            }
            Detection::Absent => panic!("expected a face detection"),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_packet() {
        let result: Result<LandmarkPacket, _> = serde_json::from_str("{\"garbage\":true}");
        assert!(result.is_err());
    }
}
