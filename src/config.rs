use crate::ranking::DEFAULT_TOP_K;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rust_forecast")]
#[command(about = "District-wise service load forecasting and report generation")]
pub struct Args {
    /// Monthly dataset (CSV)
    #[arg(short, long, default_value = "Monthly_Demand_Dataset.csv")]
    pub dataset: String,

    /// Demand model artifact (JSON)
    #[arg(short, long, default_value = "Demand_Prediction_Model.json")]
    pub model: String,

    /// Directory reports are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name prefix for generated reports
    #[arg(long, default_value = "UIDAI_Report")]
    pub report_prefix: String,

    /// Number of districts in the state ranking
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Logging level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset_path: String,
    pub model_path: String,
    pub output_dir: PathBuf,
    pub report_prefix: String,
    pub top_k: usize,
    pub log_level: tracing::Level,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let log_level = match args.log_level.to_ascii_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        };
        Self {
            dataset_path: args.dataset,
            model_path: args.model,
            output_dir: args.output_dir,
            report_prefix: args.report_prefix,
            top_k: args.top_k.max(1),
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_file_names() {
        let cfg = AppConfig::from(Args::parse_from(["rust_forecast"]));
        assert_eq!(cfg.dataset_path, "Monthly_Demand_Dataset.csv");
        assert_eq!(cfg.model_path, "Demand_Prediction_Model.json");
        assert_eq!(cfg.report_prefix, "UIDAI_Report");
        assert_eq!(cfg.top_k, 10);
        assert_eq!(cfg.log_level, tracing::Level::INFO);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "rust_forecast",
            "--dataset",
            "d.csv",
            "--top-k",
            "0",
            "--log-level",
            "DEBUG",
        ]);
        let cfg = AppConfig::from(args);
        assert_eq!(cfg.dataset_path, "d.csv");
        assert_eq!(cfg.top_k, 1);
        assert_eq!(cfg.log_level, tracing::Level::DEBUG);
    }
}
