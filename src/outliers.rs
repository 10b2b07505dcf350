//! First-difference outlier rejection.
//!
//! A point is an outlier when its jump from the previous point exceeds `m`
//! times the median jump of the whole series. The first point has no
//! predecessor and reuses the jump of the second point.

use crate::model::{Channel, Record};
use crate::stats::median;

/// Default multiplier applied to the median jump.
pub const DEFAULT_MULTIPLIER: f64 = 3.0;

/// Flag the outliers of a single channel.
///
/// Series with fewer than two values have no outliers.
pub fn outlier_mask(vals: &[f64], multiplier: f64) -> Vec<bool> {
    let n_vals = vals.len();
    if n_vals <= 1 {
        return vec![false; n_vals];
    }

    let mut diffs = Vec::with_capacity(n_vals);
    diffs.push(0.0);
    diffs.extend(vals.windows(2).map(|pair| (pair[1] - pair[0]).abs()));
    diffs[0] = diffs[1];

    let threshold = multiplier * median(&diffs);
    log::debug!("outlier threshold {threshold} (multiplier {multiplier})");

    diffs.iter().map(|&diff| diff > threshold).collect()
}

/// Flag every record that is an outlier on at least one channel.
pub fn combined_mask(records: &[Record], multiplier: f64) -> Vec<bool> {
    let mut mask = vec![false; records.len()];
    for channel in Channel::ALL {
        let vals: Vec<f64> = records.iter().map(|rec| channel.value(rec)).collect();
        let channel_mask = outlier_mask(&vals, multiplier);

        let n_flagged = channel_mask.iter().filter(|&&flag| flag).count();
        log::debug!("{n_flagged} {} outliers", channel.name());

        for (flag, channel_flag) in mask.iter_mut().zip(channel_mask) {
            *flag |= channel_flag;
        }
    }
    mask
}
