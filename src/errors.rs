use thiserror::Error;

/// Failures while reading the monthly dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset {0} contains no usable rows")]
    Empty(String),
}

/// Failures of the predictive model, kept apart from the insufficient-history
/// fallback so "no model" and "not enough data" are never confused.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to open model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path} is malformed: {source}")]
    Artifact {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed model input: {0}")]
    MalformedInput(String),

    #[error("model produced a non-finite prediction")]
    InvalidOutput,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("region '{0}' not found in dataset")]
    RegionNotFound(String),

    #[error("sub-region '{sub_region}' not found in region '{region}'")]
    SubRegionNotFound { region: String, sub_region: String },

    #[error("no observations for '{sub_region}' in '{region}'")]
    EmptyHistory { region: String, sub_region: String },

    #[error("no {0} selected")]
    NoSelection(&'static str),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ForecastError {
    /// User-input conditions that should be shown as a blocking message
    /// rather than treated as a system fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ForecastError::RegionNotFound(_)
                | ForecastError::SubRegionNotFound { .. }
                | ForecastError::EmptyHistory { .. }
        )
    }
}
