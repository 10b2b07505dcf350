//! Error types of the processing pipeline and the sensor backends.
//!
//! Both are plain `thiserror` enums so callers can match on the failure kind;
//! the command layer wraps them into `anyhow` errors with context.

use std::{io, path::PathBuf};
use thiserror::Error;

/// A log line that could not be turned into a record.
///
/// Any of these aborts the whole processing run: a malformed line means the
/// log is corrupted, not that a reading was noisy.
#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("line {line}: expected 4 tab-separated fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid timestamp {value:?}")]
    Timestamp { line: usize, value: String },

    #[error("line {line}: invalid {channel} value {value:?}")]
    Value {
        line: usize,
        channel: &'static str,
        value: String,
    },

    #[error("line {line}: timestamp {timestamp} is out of the representable range")]
    TimestampRange { line: usize, timestamp: i64 },
}

/// A failed or implausible sensor read.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {value:?} read from {path:?}")]
    Parse { path: PathBuf, value: String },

    #[error("{channel} reading {value} is outside the range {min}..={max}")]
    OutOfRange {
        channel: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{0} read failed")]
    ReadFailed(&'static str),
}
