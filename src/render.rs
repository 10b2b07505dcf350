//! Chart rendering of a cleaned series.
//!
//! The chart is a 2x2 grid of line plots sharing the time axis:
//! temperature and heat index on the left, humidity and pressure on the right.

use crate::model::{Channel, CleanedSeries};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::path::Path;

/// Consumer of a cleaned series that produces an image file.
pub trait Renderer {
    fn render(&self, series: &CleanedSeries, file: &Path) -> Result<()>;
}

const TEMPERATURE_COLOR: RGBColor = RGBColor(0, 0, 255);
const HEAT_INDEX_COLOR: RGBColor = RGBColor(165, 42, 42);
const HUMIDITY_COLOR: RGBColor = RGBColor(255, 165, 0);
const PRESSURE_COLOR: RGBColor = RGBColor(0, 128, 0);

const FONT: &str = "sans-serif";
const N_TIME_LABELS: usize = 10;
const N_VALUE_LABELS: usize = 6;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Plotted quantity of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantity {
    Channel(Channel),
    HeatIndex,
}

impl Quantity {
    fn title(self) -> &'static str {
        match self {
            Quantity::Channel(Channel::Temperature) => "Temperature (°C)",
            Quantity::Channel(Channel::Humidity) => "Relative humidity (%)",
            Quantity::Channel(Channel::Pressure) => "Barometric pressure (hPa)",
            Quantity::HeatIndex => "Heat index (°C)",
        }
    }
}

/// Panels in row-major order, as returned by `split_evenly`.
const LAYOUT: [(Quantity, RGBColor); 4] = [
    (Quantity::Channel(Channel::Temperature), TEMPERATURE_COLOR),
    (Quantity::Channel(Channel::Humidity), HUMIDITY_COLOR),
    (Quantity::HeatIndex, HEAT_INDEX_COLOR),
    (Quantity::Channel(Channel::Pressure), PRESSURE_COLOR),
];

/// Renders the chart as a PNG image.
pub struct PngRenderer {
    width: u32,
    height: u32,
}

impl PngRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw the chart onto a bitmap drawing area.
    pub fn draw(
        &self,
        series: &CleanedSeries,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
    ) -> Result<()> {
        root.fill(&WHITE)?;

        let timestamps: Vec<f64> = series.timestamps().iter().map(|&ts| ts as f64).collect();
        let time_scale = Scale::new(&timestamps, 60.0);

        let time_label = |ts: &f64| format_time(*ts, &Local);
        let value_label = |val: &f64| format!("{val:.1}");

        for (i_panel, (area, (quantity, color))) in
            root.split_evenly((2, 2)).iter().zip(LAYOUT).enumerate()
        {
            let bottom_row = i_panel >= 2;

            let vals = match quantity {
                Quantity::Channel(channel) => series.channel(channel),
                Quantity::HeatIndex => series.heat_index(),
            };
            let value_scale = Scale::new(&vals, 1.0);

            let mut chart = ChartBuilder::on(area)
                .caption(quantity.title(), (FONT, 18))
                .margin(8)
                .x_label_area_size(if bottom_row { 110 } else { 0 })
                .y_label_area_size(56)
                .build_cartesian_2d(
                    time_scale.min..time_scale.max,
                    value_scale.min..value_scale.max,
                )?;

            chart
                .configure_mesh()
                .x_labels(N_TIME_LABELS)
                .y_labels(N_VALUE_LABELS)
                .x_label_formatter(&time_label)
                .y_label_formatter(&value_label)
                .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
                .y_label_style((FONT, 12))
                .draw()?;

            let points: Vec<(f64, f64)> = timestamps.iter().copied().zip(vals).collect();
            if let [point] = points[..] {
                chart.draw_series(std::iter::once(Circle::new(point, 2, color.filled())))?;
            } else {
                chart.draw_series(LineSeries::new(points, &color))?;
            }
        }

        Ok(())
    }
}

impl Renderer for PngRenderer {
    fn render(&self, series: &CleanedSeries, file: &Path) -> Result<()> {
        let root = BitMapBackend::new(file, (self.width, self.height)).into_drawing_area();
        self.draw(series, &root).context("failed to draw chart")?;
        root.present()
            .with_context(|| format!("failed to save {file:?}"))?;
        Ok(())
    }
}

/// Axis label of an epoch timestamp in the time zone `tz`.
fn format_time<Tz>(ts: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(ts.round() as i64, 0)
        .map(|date_time| date_time.with_timezone(tz).format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Linear axis spanning the data, padded by 5% on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    /// Flat or empty data get a span of `2 * flat_pad` centred on the value.
    fn new(vals: &[f64], flat_pad: f64) -> Self {
        let (min, max) = vals
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &val| {
                (min.min(val), max.max(val))
            });
        if !min.is_finite() || !max.is_finite() {
            return Self {
                min: -flat_pad,
                max: flat_pad,
            };
        }
        if max - min <= f64::EPSILON * max.abs().max(1.0) {
            return Self {
                min: min - flat_pad,
                max: max + flat_pad,
            };
        }
        let pad = 0.05 * (max - min);
        Self {
            min: min - pad,
            max: max + pad,
        }
    }
}
