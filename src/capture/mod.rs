// src/capture/mod.rs
pub mod cancel;
pub mod error;
pub mod parse;
pub mod run;
pub mod series;
pub mod source;

pub use cancel::CancelToken;
pub use error::CaptureError;
pub use parse::{parse_line, LineOutcome, Sample};
pub use run::{capture_series, CaptureOutcome};
pub use series::{Series, Traces};
pub use source::{LineSource, ScriptedSource, SerialLineSource, SimSource};
