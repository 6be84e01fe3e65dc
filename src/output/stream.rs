//! Coordinate streaming over TCP
//!
//! Wire format: one message per processed video frame, a 4-byte big-endian
//! payload length followed by a flat JSON object with the `FaceCoordinates`
//! fields. The length prefix is what lets a receiver split consecutive
//! messages on the byte stream; the JSON payload alone would not
//! self-delimit.
//!
//! The connection is opened once at startup and each send is a blocking
//! write on the frame loop's thread, so an unresponsive consumer stalls
//! capture rather than queueing frames.

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::config::StreamConfig;
use crate::error::{FacelinkError, StreamError};
use crate::output::CoordinateSink;
use crate::tracking::features::FaceCoordinates;

/// Length prefix size in bytes
pub const LEN_PREFIX_SIZE: usize = 4;

/// Upper bound on an encoded payload; anything larger is a corrupt frame
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Encode one coordinate message as a length-prefixed frame
pub fn encode_frame(coords: &FaceCoordinates) -> Result<Vec<u8>, StreamError> {
    let payload = serde_json::to_vec(coords).map_err(|e| StreamError::Encode(e.to_string()))?;

    let mut frame = Vec::with_capacity(LEN_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode one frame from the front of `buf`.
///
/// Returns the coordinates and the number of bytes consumed, so consecutive
/// frames can be split off a contiguous buffer.
pub fn decode_frame(buf: &[u8]) -> Result<(FaceCoordinates, usize), StreamError> {
    if buf.len() < LEN_PREFIX_SIZE {
        return Err(StreamError::Decode(format!(
            "Buffer too short for length prefix: {} bytes",
            buf.len()
        )));
    }

    let len = u32::from_be_bytes(buf[..LEN_PREFIX_SIZE].try_into().unwrap()) as usize;
    if len > MAX_PAYLOAD_LEN {
        return Err(StreamError::Decode(format!(
            "Payload length {} exceeds maximum {}",
            len, MAX_PAYLOAD_LEN
        )));
    }

    let end = LEN_PREFIX_SIZE + len;
    if buf.len() < end {
        return Err(StreamError::Decode(format!(
            "Truncated frame: need {} bytes, have {}",
            end,
            buf.len()
        )));
    }

    let coords = serde_json::from_slice(&buf[LEN_PREFIX_SIZE..end])
        .map_err(|e| StreamError::Decode(format!("JSON parse error: {}", e)))?;
    Ok((coords, end))
}

/// Read one length-prefixed frame from a byte stream
pub fn read_frame<R: Read>(reader: &mut R) -> Result<FaceCoordinates, StreamError> {
    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    reader
        .read_exact(&mut prefix)
        .map_err(|e| StreamError::Decode(format!("Failed to read length prefix: {}", e)))?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_PAYLOAD_LEN {
        return Err(StreamError::Decode(format!(
            "Payload length {} exceeds maximum {}",
            len, MAX_PAYLOAD_LEN
        )));
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .map_err(|e| StreamError::Decode(format!("Failed to read payload: {}", e)))?;

    serde_json::from_slice(&payload)
        .map_err(|e| StreamError::Decode(format!("JSON parse error: {}", e)))
}

/// Persistent TCP stream to the downstream coordinate consumer
#[derive(Debug)]
pub struct CoordinateStream {
    stream: TcpStream,
    addr: String,
}

impl CoordinateStream {
    /// Open the persistent connection to the downstream consumer
    pub fn connect(config: &StreamConfig) -> Result<Self, StreamError> {
        let addr = format!("{}:{}", config.host, config.port);
        tracing::info!("Connecting coordinate stream to {}", addr);

        let stream = TcpStream::connect(&addr)
            .map_err(|e| StreamError::Connect(format!("{}: {}", addr, e)))?;

        // Coordinate frames are small and latency-sensitive
        stream.set_nodelay(true).ok();

        Ok(Self { stream, addr })
    }

    /// Address of the connected consumer
    pub fn peer(&self) -> &str {
        &self.addr
    }
}

impl CoordinateSink for CoordinateStream {
    fn name(&self) -> &'static str {
        "coordinate-stream"
    }

    fn send(&mut self, coords: &FaceCoordinates) -> Result<(), FacelinkError> {
        let frame = encode_frame(coords)?;
        self.stream
            .write_all(&frame)
            .map_err(|e| StreamError::Send(format!("{}: {}", self.addr, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::net::TcpListener;

    fn sample_coords() -> FaceCoordinates {
        FaceCoordinates {
            nose_tip: [320, 260],
            left_eye: [280, 220],
            right_eye: [360, 220],
            mouth_center: [320, 320],
            mouth_width: 0.25,
            eye_blink_left: 0.1,
            eye_blink_right: 0.98,
            head_rotation: [0.0833, -0.0125, 0.0],
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let coords = sample_coords();
        let frame = encode_frame(&coords).unwrap();

        // 4-byte big-endian prefix followed by exactly that many bytes
        let len = u32::from_be_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(frame.len(), LEN_PREFIX_SIZE + len);

        let (decoded, consumed) = decode_frame(&frame).unwrap();
        assert_eq!(consumed, frame.len());
        assert_eq!(decoded.nose_tip, coords.nose_tip);
        assert_eq!(decoded.mouth_center, coords.mouth_center);
        assert_relative_eq!(decoded.mouth_width, coords.mouth_width, max_relative = 1e-9);
        assert_relative_eq!(
            decoded.eye_blink_left,
            coords.eye_blink_left,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            decoded.head_rotation[0],
            coords.head_rotation[0],
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_consecutive_frames_split_cleanly() {
        let first = sample_coords();
        let second = FaceCoordinates::default();

        let mut buf = encode_frame(&first).unwrap();
        buf.extend_from_slice(&encode_frame(&second).unwrap());

        let (decoded, consumed) = decode_frame(&buf).unwrap();
        assert_eq!(decoded, first);

        let (decoded, rest) = decode_frame(&buf[consumed..]).unwrap();
        assert_eq!(decoded, second);
        assert_eq!(consumed + rest, buf.len());
    }

    #[test]
    fn test_decode_rejects_truncated_frame() {
        let frame = encode_frame(&sample_coords()).unwrap();

        let err = decode_frame(&frame[..frame.len() - 1]).unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));

        let err = decode_frame(&frame[..2]).unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut frame = encode_frame(&sample_coords()).unwrap();
        frame[..4].copy_from_slice(&u32::MAX.to_be_bytes());

        let err = decode_frame(&frame).unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));
    }

    #[test]
    fn test_send_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = StreamConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port,
        };

        let mut sink = CoordinateStream::connect(&config).unwrap();
        let (mut accepted, _) = listener.accept().unwrap();

        let coords = sample_coords();
        sink.send(&coords).unwrap();
        sink.send(&FaceCoordinates::default()).unwrap();

        let first = read_frame(&mut accepted).unwrap();
        let second = read_frame(&mut accepted).unwrap();
        assert_eq!(first, coords);
        assert_eq!(second, FaceCoordinates::default());
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop a listener to get a port that refuses connections
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = StreamConfig {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port,
        };

        let err = CoordinateStream::connect(&config).unwrap_err();
        assert!(matches!(err, StreamError::Connect(_)));
    }
}
