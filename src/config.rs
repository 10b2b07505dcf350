use crate::model::Reading;
use crate::outliers::DEFAULT_MULTIPLIER;
use crate::sensor::SimulationParams;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::RangeBounds,
    path::{Path, PathBuf},
};

/// Program configuration.
///
/// Loaded from an optional TOML file where every field has a default.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sensor: SensorConfig,
    pub process: ProcessConfig,
    pub render: RenderConfig,
}

/// Sensor backend selection and parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SensorConfig {
    /// Linux Industrial I/O sysfs devices.
    Iio {
        #[serde(default = "default_humidity_device")]
        humidity_device: PathBuf,
        #[serde(default = "default_pressure_device")]
        pressure_device: PathBuf,
        /// Attempts per attribute read before giving up.
        #[serde(default = "default_read_attempts")]
        read_attempts: usize,
        /// Delay between attempts in milliseconds.
        #[serde(default = "default_retry_delay_ms")]
        retry_delay_ms: u64,
    },
    /// Random readings around fixed values.
    Simulated {
        seed: Option<u64>,
        #[serde(default = "default_temperature")]
        temperature: f64,
        #[serde(default = "default_humidity")]
        humidity: f64,
        #[serde(default = "default_pressure")]
        pressure: f64,
        /// Standard deviation of the temperature noise in °C.
        #[serde(default = "default_noise")]
        noise: f64,
        /// Probability that a read fails.
        #[serde(default)]
        failure_prob: f64,
    },
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig::Iio {
            humidity_device: default_humidity_device(),
            pressure_device: default_pressure_device(),
            read_attempts: default_read_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl SensorConfig {
    /// Simulation parameters, if the simulated backend is selected.
    pub fn simulation_params(&self) -> Option<SimulationParams> {
        match *self {
            SensorConfig::Simulated {
                seed,
                temperature,
                humidity,
                pressure,
                noise,
                failure_prob,
            } => Some(SimulationParams {
                seed,
                reading: Reading {
                    temperature,
                    humidity,
                    pressure,
                },
                noise,
                failure_prob,
            }),
            SensorConfig::Iio { .. } => None,
        }
    }
}

/// Outlier rejection parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    /// Multiplier applied to the median jump to get the rejection threshold.
    pub multiplier: f64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// Chart output parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub output: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("graph.png"),
            width: 1200,
            height: 800,
        }
    }
}

fn default_humidity_device() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices/iio:device0")
}

fn default_pressure_device() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices/iio:device1")
}

fn default_read_attempts() -> usize {
    15
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_temperature() -> f64 {
    22.0
}

fn default_humidity() -> f64 {
    45.0
}

fn default_pressure() -> f64 {
    1013.25
}

fn default_noise() -> f64 {
    0.5
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded; missing fields take their defaults.
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.sensor {
            SensorConfig::Iio {
                read_attempts,
                retry_delay_ms,
                ..
            } => {
                check_num(*read_attempts, 1..=100).context("invalid number of read attempts")?;
                check_num(*retry_delay_ms, 0..=60_000).context("invalid retry delay")?;
            }
            SensorConfig::Simulated {
                temperature,
                humidity,
                pressure,
                noise,
                failure_prob,
                ..
            } => {
                check_num(*temperature, -40.0..=80.0).context("invalid simulated temperature")?;
                check_num(*humidity, 0.0..=100.0).context("invalid simulated humidity")?;
                check_num(*pressure, 300.0..=1100.0).context("invalid simulated pressure")?;
                check_num(*noise, 0.0..10.0).context("invalid noise level")?;
                check_num(*failure_prob, 0.0..=1.0).context("invalid failure probability")?;
            }
        }

        check_multiplier(self.process.multiplier)?;

        check_num(self.render.width, 200..=10_000).context("invalid image width")?;
        check_num(self.render.height, 200..=10_000).context("invalid image height")?;

        Ok(())
    }
}

pub fn check_multiplier(multiplier: f64) -> Result<()> {
    if multiplier <= 0.0 {
        bail!("multiplier must be positive, but is {multiplier}");
    }
    check_num(multiplier, 0.0..1000.0).context("invalid outlier multiplier")
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
