use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial port: {0}")]
    Port(#[from] serialport::Error),
    #[error("serial I/O: {0}")]
    Io(#[from] std::io::Error),
}
