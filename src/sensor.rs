//! Sensor backends and sample acquisition.

use crate::error::SensorError;
use crate::model::{Reading, Record};
use anyhow::{Context, Result};
use chrono::Utc;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Normal};
use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

const TEMPERATURE_RANGE: RangeInclusive<f64> = -40.0..=80.0;
const HUMIDITY_RANGE: RangeInclusive<f64> = 0.0..=100.0;
const PRESSURE_RANGE: RangeInclusive<f64> = 300.0..=1100.0;

/// Source of instantaneous readings.
pub trait Sensor {
    fn read(&mut self) -> Result<Reading, SensorError>;
}

/// Read the sensor once and stamp the reading with the current time.
///
/// Failed or implausible reads are not retried.
pub fn acquire(sensor: &mut dyn Sensor) -> Result<Record, SensorError> {
    let reading = sensor.read()?;
    check_range("temperature", reading.temperature, TEMPERATURE_RANGE)?;
    check_range("humidity", reading.humidity, HUMIDITY_RANGE)?;
    check_range("pressure", reading.pressure, PRESSURE_RANGE)?;

    Ok(Record::new(Utc::now().timestamp(), reading))
}

fn check_range(
    channel: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<(), SensorError> {
    if !range.contains(&value) {
        return Err(SensorError::OutOfRange {
            channel,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(())
}

/// Sensors exposed through the Linux Industrial I/O sysfs interface.
///
/// Temperature and humidity come from a DHT-style device, pressure from a
/// BMP-style device. Reads of a device are retried up to `read_attempts`
/// times since one-wire humidity sensors fail intermittently.
pub struct IioSensor {
    humidity_device: PathBuf,
    pressure_device: PathBuf,
    read_attempts: usize,
    retry_delay: Duration,
}

impl IioSensor {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        humidity_device: P,
        pressure_device: Q,
        read_attempts: usize,
        retry_delay: Duration,
    ) -> Self {
        Self {
            humidity_device: humidity_device.as_ref().to_path_buf(),
            pressure_device: pressure_device.as_ref().to_path_buf(),
            read_attempts: read_attempts.max(1),
            retry_delay,
        }
    }

    fn read_with_retry(&self, file: &Path) -> Result<f64, SensorError> {
        let mut attempt = 1;
        loop {
            match read_attribute(file) {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.read_attempts => {
                    log::warn!("attempt {attempt}/{}: {error}", self.read_attempts);
                    attempt += 1;
                    thread::sleep(self.retry_delay);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Sensor for IioSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        // m°C, m%RH and kPa respectively
        let temperature = self.read_with_retry(&self.humidity_device.join("in_temp_input"))?;
        let humidity =
            self.read_with_retry(&self.humidity_device.join("in_humidityrelative_input"))?;
        let pressure = self.read_with_retry(&self.pressure_device.join("in_pressure_input"))?;

        Ok(Reading {
            temperature: temperature / 1000.0,
            humidity: humidity / 1000.0,
            pressure: pressure * 10.0,
        })
    }
}

fn read_attribute(file: &Path) -> Result<f64, SensorError> {
    let text = fs::read_to_string(file).map_err(|source| SensorError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SensorError::Parse {
            path: file.to_path_buf(),
            value: text.trim().to_string(),
        }),
    }
}

/// Parameters of [`SimulatedSensor`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub seed: Option<u64>,
    pub reading: Reading,
    pub noise: f64,
    pub failure_prob: f64,
}

/// Gaussian noise around a fixed reading.
pub struct SimulatedSensor {
    base: Reading,
    noise_dist: Normal<f64>,
    failure_dist: Bernoulli,
    rng: ChaCha12Rng,
}

impl SimulatedSensor {
    pub fn new(params: &SimulationParams) -> Result<Self> {
        let rng = match params.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
        };
        let noise_dist = Normal::new(0.0, params.noise).context("invalid noise level")?;
        let failure_dist =
            Bernoulli::new(params.failure_prob).context("invalid failure probability")?;

        Ok(Self {
            base: params.reading,
            noise_dist,
            failure_dist,
            rng,
        })
    }
}

impl Sensor for SimulatedSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        if self.failure_dist.sample(&mut self.rng) {
            return Err(SensorError::ReadFailed("simulated humidity"));
        }

        let temperature = self.base.temperature + self.noise_dist.sample(&mut self.rng);
        // humidity and pressure swing wider than temperature
        let humidity = self.base.humidity + 4.0 * self.noise_dist.sample(&mut self.rng);
        let pressure = self.base.pressure + 2.0 * self.noise_dist.sample(&mut self.rng);

        Ok(Reading {
            temperature,
            humidity: humidity.clamp(0.0, 100.0),
            pressure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSensor(Reading);

    impl Sensor for FixedSensor {
        fn read(&mut self) -> Result<Reading, SensorError> {
            Ok(self.0)
        }
    }

    fn sim_params(seed: u64) -> SimulationParams {
        SimulationParams {
            seed: Some(seed),
            reading: Reading {
                temperature: 22.0,
                humidity: 45.0,
                pressure: 1013.25,
            },
            noise: 0.5,
            failure_prob: 0.0,
        }
    }

    #[test]
    fn acquire_stamps_current_time() {
        let reading = Reading {
            temperature: 21.5,
            humidity: 40.0,
            pressure: 1010.0,
        };
        let before = Utc::now().timestamp();
        let record = acquire(&mut FixedSensor(reading)).unwrap();
        let after = Utc::now().timestamp();

        assert!((before..=after).contains(&record.timestamp));
        assert_eq!(record.temperature, 21.5);
        assert_eq!(record.humidity, 40.0);
        assert_eq!(record.pressure, 1010.0);
    }

    #[test]
    fn acquire_rejects_implausible_values() {
        let reading = Reading {
            temperature: 21.5,
            humidity: 140.0,
            pressure: 1010.0,
        };
        let err = acquire(&mut FixedSensor(reading)).unwrap_err();
        assert!(matches!(
            err,
            SensorError::OutOfRange {
                channel: "humidity",
                ..
            }
        ));

        let reading = Reading {
            temperature: f64::NAN,
            humidity: 40.0,
            pressure: 1010.0,
        };
        assert!(acquire(&mut FixedSensor(reading)).is_err());
    }

    #[test]
    fn iio_sensor_converts_units() {
        let dir = tempfile::tempdir().unwrap();
        let dht = dir.path().join("iio:device0");
        let bmp = dir.path().join("iio:device1");
        fs::create_dir_all(&dht).unwrap();
        fs::create_dir_all(&bmp).unwrap();
        fs::write(dht.join("in_temp_input"), "23400\n").unwrap();
        fs::write(dht.join("in_humidityrelative_input"), "51200\n").unwrap();
        fs::write(bmp.join("in_pressure_input"), "101.325000000\n").unwrap();

        let mut sensor = IioSensor::new(&dht, &bmp, 1, Duration::ZERO);
        let reading = sensor.read().unwrap();
        assert!((reading.temperature - 23.4).abs() < 1e-9);
        assert!((reading.humidity - 51.2).abs() < 1e-9);
        assert!((reading.pressure - 1013.25).abs() < 1e-9);
    }

    #[test]
    fn iio_sensor_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut sensor = IioSensor::new(dir.path(), dir.path(), 3, Duration::ZERO);
        assert!(matches!(sensor.read(), Err(SensorError::Io { .. })));

        fs::write(dir.path().join("in_temp_input"), "garbage").unwrap();
        assert!(matches!(sensor.read(), Err(SensorError::Parse { .. })));
    }

    #[test]
    fn simulated_sensor_is_reproducible() {
        let mut a = SimulatedSensor::new(&sim_params(7)).unwrap();
        let mut b = SimulatedSensor::new(&sim_params(7)).unwrap();
        for _ in 0..10 {
            let reading = a.read().unwrap();
            assert_eq!(reading, b.read().unwrap());
            assert!((reading.temperature - 22.0).abs() < 5.0);
        }
    }

    #[test]
    fn simulated_sensor_can_fail() {
        let mut params = sim_params(1);
        params.failure_prob = 1.0;
        let mut sensor = SimulatedSensor::new(&params).unwrap();
        assert!(matches!(
            acquire(&mut sensor),
            Err(SensorError::ReadFailed(_))
        ));
    }
}
