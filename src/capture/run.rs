use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::capture::cancel::CancelToken;
use crate::capture::error::CaptureError;
use crate::capture::parse::{parse_line, LineOutcome};
use crate::capture::series::Series;
use crate::capture::source::LineSource;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How one acquisition loop ended. All three hand their data to the plot.
#[derive(Debug)]
pub enum CaptureOutcome {
    BudgetExhausted,
    Cancelled,
    Faulted(CaptureError),
}

/// Drives one run: waits for the first byte, then reads and parses up to
/// `budget` lines, appending good samples and skipping the rest. Timeouts
/// come back as empty lines and still consume budget, so a silent device
/// cannot stall a run forever.
pub fn capture_series<S: LineSource + ?Sized>(
    source: &mut S,
    cancel: &CancelToken,
    budget: u32,
) -> (Series, CaptureOutcome) {
    let mut series = Series::default();

    // Pre-read gate: the firmware needs a moment after the arming bytes
    // before the first line shows up.
    loop {
        if cancel.is_cancelled() {
            return (series, CaptureOutcome::Cancelled);
        }
        match source.data_ready() {
            Ok(true) => break,
            Ok(false) => thread::sleep(POLL_INTERVAL),
            Err(e) => return (series, CaptureOutcome::Faulted(e)),
        }
    }
    info!("start reading data");

    for _ in 0..budget {
        if cancel.is_cancelled() {
            info!("run cancelled with {} samples", series.len());
            return (series, CaptureOutcome::Cancelled);
        }
        let line = match source.read_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("read failed after {} samples: {e}", series.len());
                return (series, CaptureOutcome::Faulted(e));
            }
        };
        debug!("received line: {line:?}");
        match parse_line(&line) {
            LineOutcome::Sample(sample) => series.push(sample),
            // Skips are logged by the parser; one bad line never ends a run.
            _ => {}
        }
    }
    info!("read budget exhausted with {} samples", series.len());
    (series, CaptureOutcome::BudgetExhausted)
}
