use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(alias = "state", alias = "State", alias = "Region")]
    pub region: Option<String>,
    #[serde(alias = "district", alias = "District", alias = "SubRegion")]
    pub sub_region: Option<String>,
    #[serde(alias = "month", alias = "Month", alias = "Period")]
    pub period: Option<String>,
    #[serde(alias = "TotalEnroll")]
    pub total_enroll: Option<String>,
    #[serde(alias = "TotalUpdates")]
    pub total_updates: Option<String>,
    #[serde(alias = "ServiceLoad")]
    pub service_load: Option<String>,
}

/// A calendar month. Ordered chronologically; displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub region: String,
    pub sub_region: String,
    pub period: Period,
    pub total_enroll: u64,
    pub total_updates: u64,
    pub service_load: u64,
}

/// Features derived for one row of a history. Lag and rolling values only
/// look at strictly earlier periods; `None` means the history is too short.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub period: Period,
    pub month_num: u32,
    pub total_enroll: u64,
    pub total_updates: u64,
    pub service_load: u64,
    pub lag_1: Option<f64>,
    pub lag_2: Option<f64>,
    pub rolling_3_mean: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Model,
    Fallback,
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionSource::Model => f.write_str("model"),
            PredictionSource::Fallback => f.write_str("fallback (insufficient history)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub source: PredictionSource,
    pub current_load: u64,
    /// `value - current_load`.
    pub diff: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub sub_region: String,
    pub latest_load: u64,
}

#[derive(Debug, Tabled, Clone)]
pub struct LatestRow {
    #[tabled(rename = "State")]
    pub region: String,
    #[tabled(rename = "District")]
    pub sub_region: String,
    #[tabled(rename = "Month")]
    pub period: String,
    #[tabled(rename = "TotalEnroll")]
    pub total_enroll: String,
    #[tabled(rename = "TotalUpdates")]
    pub total_updates: String,
    #[tabled(rename = "ServiceLoad")]
    pub service_load: String,
    #[tabled(rename = "Lag1")]
    pub lag_1: String,
    #[tabled(rename = "Lag2")]
    pub lag_2: String,
    #[tabled(rename = "Rolling3Mean")]
    pub rolling_3_mean: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct RankingRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "District")]
    pub sub_region: String,
    #[tabled(rename = "ServiceLoad")]
    pub latest_load: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ChartRow {
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
