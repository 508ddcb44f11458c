// src/config.rs
use std::time::Duration;

/// Everything one acquisition run needs, with the lab defaults inline.
///
/// The shell owns one of these, lets the operator edit the interesting
/// fields, and hands a copy to each worker; nothing is global.
#[derive(Clone, Debug)]
pub struct AcqConfig {
    /// Serial device the motor board is attached to.
    pub port_name: String,
    pub baud_rate: u32,
    /// Upper bound for a single blocking read.
    pub read_timeout: Duration,
    /// How many line reads one run is allowed, counting skips and timeouts.
    pub read_budget: u32,
    /// Control bytes written once, in order, right after the port opens to
    /// arm the firmware's telemetry stream. Their meaning belongs to the
    /// device.
    pub handshake: [u8; 3],
    /// Proportional gain forwarded through the run, reserved for the
    /// controller side of the firmware.
    pub gain: f64,
    /// Target position forwarded through the run; the simulated board steps
    /// to it.
    pub setpoint: f64,
    pub x_label: String,
    pub y_label: String,
    pub window_title: String,
}

impl Default for AcqConfig {
    fn default() -> Self {
        Self {
            port_name: "COM9".to_owned(),
            baud_rate: 115_200,
            read_timeout: Duration::from_secs(1),
            read_budget: 150,
            handshake: [0x02, 0x03, 0x04],
            gain: 0.003,
            setpoint: 50_000.0,
            x_label: "Time (ms)".to_owned(),
            y_label: "Position (Encoder Counts)".to_owned(),
            window_title: "Step Response".to_owned(),
        }
    }
}
