//! Sensor data types.

use crate::error::ParseError;
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use std::fmt;

/// Single instantaneous reading of all sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Barometric pressure in hPa.
    pub pressure: f64,
}

/// Timestamped reading, one line of the log file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl Record {
    pub fn new(timestamp: i64, reading: Reading) -> Self {
        Self {
            timestamp,
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
        }
    }

    /// Parse a tab-separated log line.
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 4 {
            return Err(ParseError::FieldCount {
                line: line_no,
                found: fields.len(),
            });
        }

        let timestamp = fields[0]
            .trim()
            .parse::<i64>()
            .map_err(|_| ParseError::Timestamp {
                line: line_no,
                value: fields[0].to_string(),
            })?;

        let value = |idx: usize, channel: Channel| -> Result<f64, ParseError> {
            let text = fields[idx];
            match text.trim().parse::<f64>() {
                Ok(val) if val.is_finite() => Ok(val),
                _ => Err(ParseError::Value {
                    line: line_no,
                    channel: channel.name(),
                    value: text.to_string(),
                }),
            }
        };

        Ok(Self {
            timestamp,
            temperature: value(1, Channel::Temperature)?,
            humidity: value(2, Channel::Humidity)?,
            pressure: value(3, Channel::Pressure)?,
        })
    }

    /// Format as a log line (without trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{:.1}\t{:.1}\t{:.1}",
            self.timestamp, self.temperature, self.humidity, self.pressure
        )
    }
}

/// Monitored measurement stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Temperature,
    Humidity,
    Pressure,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Temperature, Channel::Humidity, Channel::Pressure];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Pressure => "pressure",
        }
    }

    pub fn value(self, record: &Record) -> f64 {
        match self {
            Channel::Temperature => record.temperature,
            Channel::Humidity => record.humidity,
            Channel::Pressure => record.pressure,
        }
    }
}

/// Calendar fields of a timestamp in some time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl Calendar {
    /// Expand an epoch timestamp in the time zone `tz`.
    ///
    /// Returns `None` if chrono cannot represent the timestamp.
    pub fn from_timestamp<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<Self> {
        let date_time = DateTime::from_timestamp(timestamp, 0)?.with_timezone(tz);
        Some(Self {
            year: date_time.year(),
            month: date_time.month(),
            day: date_time.day(),
            hour: date_time.hour(),
            minute: date_time.minute(),
        })
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Record that survived outlier rejection, with its derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRow {
    pub record: Record,
    pub calendar: Calendar,
    pub heat_index: f64,
}

/// Result of processing a batch of log lines.
///
/// Rows keep the relative order they had in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    pub rows: Vec<CleanedRow>,
    /// Number of records dropped as outliers.
    pub n_rejected: usize,
}

impl CleanedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.rows.iter().map(|row| row.record.timestamp).collect()
    }

    pub fn channel(&self, channel: Channel) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| channel.value(&row.record))
            .collect()
    }

    pub fn heat_index(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.heat_index).collect()
    }
}
