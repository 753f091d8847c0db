//! Selection state for one interactive session.
//!
//! Derived values (history, features, prediction, recommendation) are
//! recomputed from the index on every request. The only state kept between
//! steps is the selection and the last prediction, and any selection change
//! drops the prediction.
use crate::errors::ForecastError;
use crate::features;
use crate::index::{DatasetIndex, History};
use crate::model::DemandModel;
use crate::prediction::PredictionService;
use crate::ranking::top_sub_regions;
use crate::recommend::Recommendation;
use crate::reports::{self, Report};
use crate::types::{FeatureVector, Observation, Prediction, RankingEntry};
use chrono::NaiveDateTime;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoPrediction,
    Predicted,
}

#[derive(Debug)]
pub enum ReportOutcome {
    Ready(Report),
    /// No prediction yet; the report cannot be offered.
    Unavailable,
}

/// What the user sees for the selected district.
#[derive(Debug)]
pub struct DistrictView<'a> {
    pub history: History<'a>,
    pub latest: &'a Observation,
    pub features: Vec<FeatureVector>,
}

pub struct Session<'a, M: DemandModel + ?Sized> {
    index: &'a DatasetIndex,
    service: PredictionService<'a, M>,
    top_k: usize,
    region: Option<String>,
    sub_region: Option<String>,
    prediction: Option<Prediction>,
}

impl<'a, M: DemandModel + ?Sized> Session<'a, M> {
    pub fn new(index: &'a DatasetIndex, model: &'a M, top_k: usize) -> Self {
        Self {
            index,
            service: PredictionService::new(model),
            top_k,
            region: None,
            sub_region: None,
            prediction: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.prediction.is_some() {
            SessionState::Predicted
        } else {
            SessionState::NoPrediction
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn sub_region(&self) -> Option<&str> {
        self.sub_region.as_deref()
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn select_region(&mut self, region: &str) -> Result<(), ForecastError> {
        if !self.index.has_region(region) {
            return Err(ForecastError::RegionNotFound(region.to_string()));
        }
        debug!(region, "region selected");
        self.region = Some(region.to_string());
        self.sub_region = None;
        self.prediction = None;
        Ok(())
    }

    pub fn select_sub_region(&mut self, sub_region: &str) -> Result<(), ForecastError> {
        let region = self.region.as_deref().ok_or(ForecastError::NoSelection("state"))?;
        self.index.latest_of(region, sub_region)?;
        debug!(region, sub_region, "sub-region selected");
        self.sub_region = Some(sub_region.to_string());
        self.prediction = None;
        Ok(())
    }

    fn selected_history(&self) -> Result<History<'a>, ForecastError> {
        let region = self.region.as_deref().ok_or(ForecastError::NoSelection("state"))?;
        let sub = self
            .sub_region
            .as_deref()
            .ok_or(ForecastError::NoSelection("district"))?;
        self.index.history_of(region, sub)
    }

    pub fn view(&self) -> Result<DistrictView<'a>, ForecastError> {
        let history = self.selected_history()?;
        let latest = history.latest().ok_or_else(|| ForecastError::EmptyHistory {
            region: history.region.to_string(),
            sub_region: history.sub_region.to_string(),
        })?;
        Ok(DistrictView {
            history,
            latest,
            features: features::feature_table(&history),
        })
    }

    pub fn predict(&mut self) -> Result<&Prediction, ForecastError> {
        let history = self.selected_history()?;
        let fv = features::build_latest(&history)?;
        let p = self.service.predict(&fv)?;
        info!(
            region = history.region,
            sub_region = history.sub_region,
            value = p.value,
            source = ?p.source,
            "prediction made"
        );
        Ok(self.prediction.insert(p))
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        self.prediction.as_ref().map(Recommendation::for_prediction)
    }

    /// Top districts of the selected state; needs no prediction.
    pub fn ranking(&self) -> Result<Vec<RankingEntry>, ForecastError> {
        let region = self.region.as_deref().ok_or(ForecastError::NoSelection("state"))?;
        top_sub_regions(self.index, region, self.top_k)
    }

    pub fn generate_report(&self, now: NaiveDateTime) -> Result<ReportOutcome, ForecastError> {
        let Some(prediction) = self.prediction.as_ref() else {
            return Ok(ReportOutcome::Unavailable);
        };
        let history = self.selected_history()?;
        let ranking = self.ranking()?;
        let report = reports::assemble(&history, Some(prediction), &ranking, now)?;
        info!(pages = report.body.pages.len(), "report assembled");
        Ok(ReportOutcome::Ready(report))
    }
}
