//! Predictive model seam.
//!
//! The model is trained elsewhere and shipped as an artifact; this crate only
//! runs inference. The bundled implementation is a linear regression stored
//! as JSON.
use crate::errors::ModelError;
use serde::Deserialize;
use tracing::info;

/// One feature record, in the column order the model was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub total_enroll: f64,
    pub total_updates: f64,
    pub service_load: f64,
    pub month_num: f64,
    pub lag_1: f64,
    pub lag_2: f64,
    pub rolling_3_mean: f64,
}

impl ModelInput {
    fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("total_enroll", self.total_enroll),
            ("total_updates", self.total_updates),
            ("service_load", self.service_load),
            ("month_num", self.month_num),
            ("lag_1", self.lag_1),
            ("lag_2", self.lag_2),
            ("rolling_3_mean", self.rolling_3_mean),
        ]
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, v) in self.fields() {
            if !v.is_finite() {
                return Err(ModelError::MalformedInput(format!("{} is {}", name, v)));
            }
        }
        if !(1.0..=12.0).contains(&self.month_num) {
            return Err(ModelError::MalformedInput(format!(
                "month_num {} outside 1..=12",
                self.month_num
            )));
        }
        Ok(())
    }
}

pub trait DemandModel {
    fn predict(&self, input: &ModelInput) -> Result<f64, ModelError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coefficients {
    pub total_enroll: f64,
    pub total_updates: f64,
    pub service_load: f64,
    pub month_num: f64,
    pub lag_1: f64,
    pub lag_2: f64,
    pub rolling_3_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Coefficients,
}

impl LinearModel {
    pub fn load(path: &str) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_string(),
            source,
        })?;
        let model = Self::from_json(path, &raw)?;
        info!(path, intercept = model.intercept, "demand model loaded");
        Ok(model)
    }

    pub fn from_json(origin: &str, raw: &str) -> Result<Self, ModelError> {
        serde_json::from_str(raw).map_err(|source| ModelError::Artifact {
            path: origin.to_string(),
            source,
        })
    }
}

impl DemandModel for LinearModel {
    fn predict(&self, input: &ModelInput) -> Result<f64, ModelError> {
        input.validate()?;
        let c = &self.coefficients;
        let y = self.intercept
            + c.total_enroll * input.total_enroll
            + c.total_updates * input.total_updates
            + c.service_load * input.service_load
            + c.month_num * input.month_num
            + c.lag_1 * input.lag_1
            + c.lag_2 * input.lag_2
            + c.rolling_3_mean * input.rolling_3_mean;
        if !y.is_finite() {
            return Err(ModelError::InvalidOutput);
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ARTIFACT: &str = r#"{
        "intercept": 5.0,
        "coefficients": {
            "total_enroll": 0.0, "total_updates": 0.0, "service_load": 0.5,
            "month_num": 1.0, "lag_1": 0.25, "lag_2": 0.0, "rolling_3_mean": 0.25
        }
    }"#;

    fn input() -> ModelInput {
        ModelInput {
            total_enroll: 50.0,
            total_updates: 55.0,
            service_load: 105.0,
            month_num: 4.0,
            lag_1: 90.0,
            lag_2: 110.0,
            rolling_3_mean: 100.0,
        }
    }

    #[test]
    fn linear_prediction_is_the_weighted_sum() {
        let m = LinearModel::from_json("inline", ARTIFACT).unwrap();
        // 5 + 52.5 + 4 + 22.5 + 25
        assert_eq!(m.predict(&input()).unwrap(), 109.0);
    }

    #[test]
    fn loads_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(ARTIFACT.as_bytes()).unwrap();
        let m = LinearModel::load(f.path().to_str().unwrap()).unwrap();
        assert_eq!(m.intercept, 5.0);
    }

    #[test]
    fn missing_artifact_and_missing_coefficient_are_model_errors() {
        assert!(matches!(LinearModel::load("/no/such/model.json"), Err(ModelError::Io { .. })));
        let partial = r#"{"intercept": 1.0, "coefficients": {"lag_1": 1.0}}"#;
        assert!(matches!(
            LinearModel::from_json("inline", partial),
            Err(ModelError::Artifact { .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        let m = LinearModel::from_json("inline", ARTIFACT).unwrap();
        let mut bad = input();
        bad.lag_2 = f64::NAN;
        assert!(matches!(m.predict(&bad), Err(ModelError::MalformedInput(_))));
        let mut bad = input();
        bad.month_num = 13.0;
        assert!(matches!(m.predict(&bad), Err(ModelError::MalformedInput(_))));
    }
}
