// src/worker.rs
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::error;

use crate::capture::run::{capture_series, CaptureOutcome};
use crate::capture::source::{LineSource, SerialLineSource, SimSource};
use crate::capture::CancelToken;
use crate::config::AcqConfig;
use crate::types::{AcqMessage, SourceKind};

/// Spawns the acquisition worker for one run. The shell makes sure at most
/// one is live at a time before calling.
pub fn spawn_acquisition(
    config: AcqConfig,
    kind: SourceKind,
    cancel: CancelToken,
    tx: Sender<AcqMessage>,
    run: u32,
) -> JoinHandle<()> {
    thread::spawn(move || match kind {
        SourceKind::Simulation => {
            run_capture(SimSource::new(config.setpoint), &config, run, &cancel, &tx);
        }
        SourceKind::Hardware => match SerialLineSource::open(&config) {
            Ok(source) => run_capture(source, &config, run, &cancel, &tx),
            Err(e) => {
                let reason = format!("{:#}", anyhow::Error::from(e));
                error!("run {run}: {reason}");
                tx.send(AcqMessage::Failed { run, reason }).ok();
            }
        },
    })
}

/// The worker body: capture, release the source, then hand the series over.
/// Budget-reached, cancelled and faulted runs all deliver what they
/// collected.
fn run_capture<S: LineSource>(
    mut source: S,
    config: &AcqConfig,
    run: u32,
    cancel: &CancelToken,
    tx: &Sender<AcqMessage>,
) {
    let (series, outcome) = capture_series(&mut source, cancel, config.read_budget);
    // Port released before the results reach the shell.
    drop(source);
    let note = match outcome {
        CaptureOutcome::BudgetExhausted => {
            format!("run {run}: {} samples", series.len())
        }
        CaptureOutcome::Cancelled => {
            format!("run {run} cancelled, {} samples kept", series.len())
        }
        CaptureOutcome::Faulted(e) => {
            format!("run {run} faulted: {e}, {} samples kept", series.len())
        }
    };
    tx.send(AcqMessage::Log(note)).ok();
    tx.send(AcqMessage::Finished { run, series }).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureError, ScriptedSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::Arc;

    struct DropProbe {
        inner: ScriptedSource,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for DropProbe {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl LineSource for DropProbe {
        fn data_ready(&mut self) -> Result<bool, CaptureError> {
            self.inner.data_ready()
        }

        fn read_line(&mut self) -> Result<String, CaptureError> {
            self.inner.read_line()
        }
    }

    #[test]
    fn source_is_released_once_and_series_delivered() {
        let drops = Arc::new(AtomicUsize::new(0));
        let source = DropProbe {
            inner: ScriptedSource::new(["1,10", "2,20"]),
            drops: drops.clone(),
        };
        let (tx, rx) = channel();
        let config = AcqConfig {
            read_budget: 2,
            ..AcqConfig::default()
        };
        run_capture(source, &config, 1, &CancelToken::new(), &tx);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        let finished = rx.try_iter().find_map(|msg| match msg {
            AcqMessage::Finished { series, .. } => Some(series),
            _ => None,
        });
        assert_eq!(finished.expect("no Finished message").len(), 2);
    }

    #[test]
    fn source_is_released_once_when_cancelled() {
        let drops = Arc::new(AtomicUsize::new(0));
        let source = DropProbe {
            inner: ScriptedSource::new(["1,10"]),
            drops: drops.clone(),
        };
        let (tx, rx) = channel();
        let cancel = CancelToken::new();
        cancel.cancel();
        run_capture(source, &AcqConfig::default(), 2, &cancel, &tx);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        let finished = rx.try_iter().find_map(|msg| match msg {
            AcqMessage::Finished { series, .. } => Some(series),
            _ => None,
        });
        assert!(finished.expect("no Finished message").is_empty());
    }

    struct FaultingProbe {
        drops: Arc<AtomicUsize>,
    }

    impl Drop for FaultingProbe {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl LineSource for FaultingProbe {
        fn data_ready(&mut self) -> Result<bool, CaptureError> {
            Ok(true)
        }

        fn read_line(&mut self) -> Result<String, CaptureError> {
            Err(CaptureError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            )))
        }
    }

    #[test]
    fn source_is_released_once_when_faulted() {
        let drops = Arc::new(AtomicUsize::new(0));
        let source = FaultingProbe {
            drops: drops.clone(),
        };
        let (tx, rx) = channel();
        run_capture(source, &AcqConfig::default(), 4, &CancelToken::new(), &tx);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        let delivered = rx
            .try_iter()
            .any(|msg| matches!(msg, AcqMessage::Finished { run: 4, .. }));
        assert!(delivered, "a faulted run still delivers its series");
    }

    #[test]
    fn open_failure_is_fatal_to_the_run() {
        let (tx, rx) = channel();
        let config = AcqConfig {
            port_name: "/dev/tty-stepscope-does-not-exist".to_owned(),
            ..AcqConfig::default()
        };
        let handle =
            spawn_acquisition(config, SourceKind::Hardware, CancelToken::new(), tx, 3);
        handle.join().unwrap();
        let failed = rx
            .try_iter()
            .any(|msg| matches!(msg, AcqMessage::Failed { run: 3, .. }));
        assert!(failed, "expected a Failed message for the run");
    }
}
