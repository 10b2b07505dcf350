use crate::config::{Config, SensorConfig, check_multiplier};
use crate::model::{Channel, CleanedSeries};
use crate::render::{PngRenderer, Renderer};
use crate::sensor::{IioSensor, Sensor, SimulatedSensor, acquire};
use crate::series;
use crate::stats::Accumulator;
use anyhow::{Context, Result};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

pub struct Manager {
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        let cfg = match config_file {
            Some(file) => Config::from_file(file).context("failed to construct cfg")?,
            None => Config::default(),
        };
        log::info!("{cfg:#?}");

        Ok(Self { cfg })
    }

    /// Read one sample and print it as a log line on stdout.
    pub fn acquire_sample(&self) -> Result<()> {
        let mut sensor = self.build_sensor().context("failed to construct sensor")?;

        let record = acquire(sensor.as_mut()).context("failed to acquire sample")?;

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", record.to_line()).context("failed to write sample")?;
        stdout.flush().context("failed to flush stdout")?;

        Ok(())
    }

    /// Clean the records of a log file and render the chart.
    pub fn plot_log<P: AsRef<Path>>(
        &self,
        log_file: P,
        multiplier: Option<f64>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let log_file = log_file.as_ref();
        let multiplier = multiplier.unwrap_or(self.cfg.process.multiplier);
        check_multiplier(multiplier)?;
        let output = output.unwrap_or_else(|| self.cfg.render.output.clone());

        let series = series::load(log_file, multiplier)
            .with_context(|| format!("failed to load {log_file:?}"))?;
        log_summary(&series);

        let renderer = PngRenderer::new(self.cfg.render.width, self.cfg.render.height);
        renderer
            .render(&series, &output)
            .context("failed to render chart")?;
        log::info!("saved {output:?}");

        Ok(())
    }

    fn build_sensor(&self) -> Result<Box<dyn Sensor>> {
        let sensor: Box<dyn Sensor> = match &self.cfg.sensor {
            SensorConfig::Iio {
                humidity_device,
                pressure_device,
                read_attempts,
                retry_delay_ms,
            } => Box::new(IioSensor::new(
                humidity_device,
                pressure_device,
                *read_attempts,
                Duration::from_millis(*retry_delay_ms),
            )),
            simulated @ SensorConfig::Simulated { .. } => {
                let params = simulated
                    .simulation_params()
                    .context("missing simulation parameters")?;
                Box::new(SimulatedSensor::new(&params)?)
            }
        };
        Ok(sensor)
    }
}

fn log_summary(series: &CleanedSeries) {
    let n_kept = series.len();
    let n_rejected = series.n_rejected;
    log::info!(
        "kept {n_kept} of {} records ({n_rejected} rejected as outliers)",
        n_kept + n_rejected
    );
    if !series.is_empty() {
        let (first, last) = (&series.rows[0], &series.rows[n_kept - 1]);
        log::info!("from {} to {}", first.calendar, last.calendar);
    }

    for channel in Channel::ALL {
        let report = series.channel(channel).into_iter().collect::<Accumulator>().report();
        log::info!(
            "{}: mean {:.2}, std dev {:.2}",
            channel.name(),
            report.mean,
            report.std_dev
        );
    }
    let report = series.heat_index().into_iter().collect::<Accumulator>().report();
    log::info!(
        "heat index: mean {:.2}, std dev {:.2}",
        report.mean,
        report.std_dev
    );
}
