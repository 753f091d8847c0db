use crate::errors::ModelError;
use crate::model::{DemandModel, ModelInput};
use crate::types::{FeatureVector, Prediction, PredictionSource};
use tracing::{debug, info};

/// Wraps the model with the insufficient-history fallback: when any lag or
/// rolling feature is undefined, the current load is returned unchanged and
/// tagged `Fallback`. Model failures still surface as `ModelError`.
pub struct PredictionService<'a, M: DemandModel + ?Sized> {
    model: &'a M,
}

impl<'a, M: DemandModel + ?Sized> PredictionService<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let current = features.service_load;
        let (value, source) = match model_input(features) {
            Some(input) => {
                let v = self.model.predict(&input)?;
                debug!(?input, prediction = v, "model prediction");
                (v, PredictionSource::Model)
            }
            None => {
                info!(period = %features.period, "insufficient history, using current load");
                (current as f64, PredictionSource::Fallback)
            }
        };
        Ok(Prediction {
            value,
            source,
            current_load: current,
            diff: value - current as f64,
        })
    }
}

fn model_input(f: &FeatureVector) -> Option<ModelInput> {
    Some(ModelInput {
        total_enroll: f.total_enroll as f64,
        total_updates: f.total_updates as f64,
        service_load: f.service_load as f64,
        month_num: f.month_num as f64,
        lag_1: f.lag_1?,
        lag_2: f.lag_2?,
        rolling_3_mean: f.rolling_3_mean?,
    })
}
