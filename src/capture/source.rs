use std::collections::VecDeque;
use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::capture::error::CaptureError;
use crate::config::AcqConfig;

/// Something that can be probed for readiness and yield telemetry lines.
pub trait LineSource {
    /// Whether at least one byte is waiting to be read.
    fn data_ready(&mut self) -> Result<bool, CaptureError>;
    /// One decoded line with trailing whitespace stripped, or `""` if the
    /// read timed out first.
    fn read_line(&mut self) -> Result<String, CaptureError>;
}

/// Serial session against the motor-control board.
///
/// Opening the port arms the firmware's telemetry stream by writing the three
/// control bytes it expects, one write apiece; their meaning belongs to the
/// device. The port is released when the source is dropped, whichever way the
/// run ends.
pub struct SerialLineSource {
    port: Box<dyn serialport::SerialPort>,
    port_name: String,
    pending: Vec<u8>,
    lines: VecDeque<String>,
}

impl SerialLineSource {
    pub fn open(config: &AcqConfig) -> Result<Self, CaptureError> {
        let mut port = serialport::new(config.port_name.as_str(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| CaptureError::Connect {
                port: config.port_name.clone(),
                source,
            })?;
        for byte in config.handshake {
            port.write_all(&[byte])?;
        }
        info!(
            "opened {} at {} baud, armed telemetry stream",
            config.port_name, config.baud_rate
        );
        Ok(Self {
            port,
            port_name: config.port_name.clone(),
            pending: Vec::new(),
            lines: VecDeque::new(),
        })
    }

    fn split_off_lines(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.pending)
                    .trim_end()
                    .to_owned();
                self.pending.clear();
                self.lines.push_back(line);
            } else {
                self.pending.push(byte);
            }
        }
    }
}

impl LineSource for SerialLineSource {
    fn data_ready(&mut self) -> Result<bool, CaptureError> {
        Ok(self.port.bytes_to_read()? > 0)
    }

    fn read_line(&mut self) -> Result<String, CaptureError> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Ok(line);
            }
            let mut buf = [0u8; 256];
            match self.port.read(&mut buf) {
                Ok(0) => return Ok(String::new()),
                Ok(n) => self.split_off_lines(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    // A partial line stays buffered and is completed by the
                    // next call.
                    return Ok(String::new());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for SerialLineSource {
    fn drop(&mut self) {
        debug!("closed {}", self.port_name);
    }
}

/// Deterministic source for tests: hands out pre-loaded lines, then empties.
pub struct ScriptedSource {
    lines: VecDeque<String>,
}

impl ScriptedSource {
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedSource {
    fn data_ready(&mut self) -> Result<bool, CaptureError> {
        Ok(true)
    }

    fn read_line(&mut self) -> Result<String, CaptureError> {
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}

/// Synthetic board: a noisy first-order step toward the requested setpoint,
/// one sample every 10 ms of simulated time. Lets the console run without
/// hardware attached.
pub struct SimSource {
    t_ms: f64,
    setpoint: f64,
    tau_ms: f64,
}

impl SimSource {
    pub fn new(setpoint: f64) -> Self {
        Self {
            t_ms: 0.0,
            setpoint,
            tau_ms: 250.0,
        }
    }
}

impl LineSource for SimSource {
    fn data_ready(&mut self) -> Result<bool, CaptureError> {
        Ok(true)
    }

    fn read_line(&mut self) -> Result<String, CaptureError> {
        // Pace the stream a little so a simulated run is watchable.
        thread::sleep(Duration::from_millis(5));
        self.t_ms += 10.0;
        let ideal = self.setpoint * (1.0 - (-self.t_ms / self.tau_ms).exp());
        let noise = rand::thread_rng().gen_range(-40.0..40.0);
        Ok(format!("{:.1},{:.0}", self.t_ms, ideal + noise))
    }
}
