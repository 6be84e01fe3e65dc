//! Tracker subprocess manager
//!
//! Launches the Python landmark tracker as a child process with automatic
//! cleanup on drop. The helper owns the capture device and the preview
//! overlay; this side only passes the configuration through as CLI flags.

use std::process::{Child, Command, Stdio};

use crate::config::TrackerConfig;
use crate::error::TrackingError;

/// Manages a landmark tracker subprocess
pub struct TrackerSubprocess {
    child: Option<Child>,
    config: TrackerConfig,
}

impl TrackerSubprocess {
    /// Create a new subprocess manager (does not start the process)
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            child: None,
            config: config.clone(),
        }
    }

    /// Launch the tracker subprocess.
    ///
    /// Runs: `python3 <tracker_script> --ip <listen_address> --port <port>
    ///        --capture <camera_device> --width <capture_width>
    ///        --height <capture_height> --fps <capture_fps>`
    /// plus `--overlay` / `--draw-landmarks` when those toggles are set.
    pub fn start(&mut self) -> Result<(), TrackingError> {
        if self.is_running() {
            return Ok(());
        }

        let mut command = Command::new("python3");
        command
            .arg(&self.config.tracker_script)
            .args(["--ip", &self.config.listen_address])
            .args(["--port", &self.config.port.to_string()])
            .args(["--capture", &self.config.camera_device.to_string()])
            .args(["--width", &self.config.capture_width.to_string()])
            .args(["--height", &self.config.capture_height.to_string()])
            .args(["--fps", &self.config.capture_fps.to_string()]);

        if self.config.show_overlay {
            command.arg("--overlay");
        }
        if self.config.show_landmarks {
            command.arg("--draw-landmarks");
        }

        let child = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TrackingError::Subprocess(format!(
                    "Failed to launch tracker at '{}': {}",
                    self.config.tracker_script, e
                ))
            })?;

        tracing::info!(
            "Landmark tracker started (pid: {}, camera: {}, port: {})",
            child.id(),
            self.config.camera_device,
            self.config.port,
        );

        self.child = Some(child);
        Ok(())
    }

    /// Check if the subprocess is still running (non-blocking)
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    tracing::warn!("Landmark tracker exited with: {}", status);
                    self.child = None;
                    false
                }
                Err(e) => {
                    tracing::error!("Failed to check tracker subprocess status: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    /// Stop the subprocess by killing and reaping it
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::info!("Stopping landmark tracker (pid: {})", child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for TrackerSubprocess {
    fn drop(&mut self) {
        self.stop();
    }
}
