//! Batch processing of a sensor log.
//!
//! Parsing, calendar expansion, outlier rejection and heat index derivation
//! all run over the full batch; a single malformed line fails the whole run.

use crate::error::ParseError;
use crate::heat_index::heat_index;
use crate::model::{Calendar, CleanedRow, CleanedSeries, Record};
use crate::outliers::combined_mask;
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use std::{fs, path::Path};

/// Process log lines with calendar fields in the local time zone.
pub fn process<I, S>(lines: I, multiplier: f64) -> Result<CleanedSeries, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    process_in(lines, multiplier, &Local)
}

/// Process log lines with calendar fields in the time zone `tz`.
pub fn process_in<I, S, Tz>(
    lines: I,
    multiplier: f64,
    tz: &Tz,
) -> Result<CleanedSeries, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    Tz: TimeZone,
{
    let mut records = Vec::new();
    let mut calendars = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let record = Record::parse_line(line, idx + 1)?;
        let calendar = Calendar::from_timestamp(record.timestamp, tz).ok_or(
            ParseError::TimestampRange {
                line: idx + 1,
                timestamp: record.timestamp,
            },
        )?;
        records.push(record);
        calendars.push(calendar);
    }
    log::info!("parsed {} records", records.len());

    let mask = combined_mask(&records, multiplier);

    let mut series = CleanedSeries::default();
    for ((record, calendar), outlier) in records.into_iter().zip(calendars).zip(mask) {
        if outlier {
            log::debug!("rejected {}", record.to_line());
            series.n_rejected += 1;
            continue;
        }
        series.rows.push(CleanedRow {
            record,
            calendar,
            heat_index: heat_index(record.temperature, record.humidity),
        });
    }

    Ok(series)
}

/// Read a log file and process it.
pub fn load<P: AsRef<Path>>(file: P, multiplier: f64) -> Result<CleanedSeries> {
    let file = file.as_ref();
    let text = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
    let series = process(text.lines(), multiplier)
        .with_context(|| format!("failed to process {file:?}"))?;
    Ok(series)
}
