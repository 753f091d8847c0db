//! Lag and rolling-window features for a single sub-region history.
//!
//! The rolling mean is shift-then-roll: the window covers the three periods
//! before the target and never the target itself. Missing history stays
//! `None`; nothing is zero-filled.
use crate::errors::ForecastError;
use crate::index::History;
use crate::types::FeatureVector;
use crate::util::average;

pub const ROLLING_WINDOW: usize = 3;

/// Features for row `i` of `history`, or `None` when `i` is out of range.
pub fn build_at(history: &History<'_>, i: usize) -> Option<FeatureVector> {
    let records = history.records();
    let target = records.get(i)?;
    let load_at = |k: usize| records[k].service_load as f64;

    let lag_1 = (i >= 1).then(|| load_at(i - 1));
    let lag_2 = (i >= 2).then(|| load_at(i - 2));
    let rolling_3_mean = if i >= ROLLING_WINDOW {
        let window: Vec<f64> = records[i - ROLLING_WINDOW..i]
            .iter()
            .map(|o| o.service_load as f64)
            .collect();
        average(&window)
    } else {
        None
    };

    Some(FeatureVector {
        period: target.period,
        month_num: target.period.month,
        total_enroll: target.total_enroll,
        total_updates: target.total_updates,
        service_load: target.service_load,
        lag_1,
        lag_2,
        rolling_3_mean,
    })
}

/// Features for the most recent period, the normal prediction target.
pub fn build_latest(history: &History<'_>) -> Result<FeatureVector, ForecastError> {
    match history.len().checked_sub(1) {
        Some(last) => build_at(history, last).ok_or_else(|| empty(history)),
        None => Err(empty(history)),
    }
}

/// Features for every row of the history, oldest first.
pub fn feature_table(history: &History<'_>) -> Vec<FeatureVector> {
    (0..history.len()).filter_map(|i| build_at(history, i)).collect()
}

fn empty(history: &History<'_>) -> ForecastError {
    ForecastError::EmptyHistory {
        region: history.region.to_string(),
        sub_region: history.sub_region.to_string(),
    }
}
