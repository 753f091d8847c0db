// Entry point and interactive CLI flow.
//
// The menu stands in for the dashboard: it collects the state/district
// selection and the predict/report triggers, and forwards them to the
// session. The dataset and model are loaded once and reused for the
// lifetime of the process.
mod config;
mod errors;
mod features;
mod index;
mod loader;
mod model;
mod output;
mod prediction;
mod ranking;
mod recommend;
mod reports;
mod session;
mod types;
mod util;

use clap::Parser;
use config::{AppConfig, Args};
use errors::ForecastError;
use index::DatasetIndex;
use model::LinearModel;
use once_cell::sync::OnceCell;
use session::{ReportOutcome, Session, SessionState};
use std::error::Error;
use std::io::{self, Write};
use tracing::{error, info};
use types::{LatestRow, RankingRow};

static DATASET: OnceCell<DatasetIndex> = OnceCell::new();
static MODEL: OnceCell<LinearModel> = OnceCell::new();

fn dataset(cfg: &AppConfig) -> Result<&'static DatasetIndex, Box<dyn Error>> {
    let idx = DATASET.get_or_try_init(|| -> Result<DatasetIndex, Box<dyn Error>> {
        let (data, report) = loader::load_and_clean(&cfg.dataset_path)?;
        println!(
            "Processing dataset... ({} rows read, {} loaded)",
            util::format_int(report.total_rows as u64),
            util::format_int(report.loaded_rows as u64)
        );
        if report.parse_errors > 0 || report.duplicates > 0 {
            println!(
                "Note: {} rows skipped due to parse/validation errors, {} duplicate months dropped.",
                util::format_int(report.parse_errors as u64),
                util::format_int(report.duplicates as u64)
            );
        }
        let idx = DatasetIndex::new(data);
        info!(records = idx.len(), regions = idx.regions().len(), "dataset indexed");
        Ok(idx)
    })?;
    Ok(idx)
}

fn model(cfg: &AppConfig) -> Result<&'static LinearModel, Box<dyn Error>> {
    Ok(MODEL.get_or_try_init(|| LinearModel::load(&cfg.model_path))?)
}

fn prompt(label: &str) -> Option<String> {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Let the user pick from a numbered list, or type a name directly.
fn pick(label: &str, options: &[&str]) -> Option<String> {
    for (i, name) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, name);
    }
    let input = prompt(label)?;
    match input.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Some(options[n - 1].to_string()),
        _ => Some(input),
    }
}

/// NotFound is a user-input condition: show it and carry on.
fn report_error(e: &ForecastError) {
    if e.is_not_found() {
        println!("No data found: {}\n", e);
    } else {
        error!(error = %e, "request failed");
        println!("Error: {}\n", e);
    }
}

fn handle_latest(session: &Session<'_, LinearModel>) {
    match session.view() {
        Ok(view) => {
            let o = view.latest;
            println!("Latest Available Data");
            println!("State: {}  District: {}", o.region, o.sub_region);
            println!("Last Month: {}  Current Service Load: {}", o.period, o.service_load);
            if let Some(first) = view.history.records().first() {
                println!(
                    "History: {} months ({} to {})\n",
                    view.history.len(),
                    first.period,
                    o.period
                );
            }
            let rows: Vec<LatestRow> = view
                .features
                .iter()
                .rev()
                .take(1)
                .map(|f| LatestRow {
                    region: o.region.clone(),
                    sub_region: o.sub_region.clone(),
                    period: f.period.to_string(),
                    total_enroll: util::format_int(f.total_enroll),
                    total_updates: util::format_int(f.total_updates),
                    service_load: util::format_int(f.service_load),
                    lag_1: util::format_optional(f.lag_1, 0),
                    lag_2: util::format_optional(f.lag_2, 0),
                    rolling_3_mean: util::format_optional(f.rolling_3_mean, 2),
                })
                .collect();
            output::preview_table_rows(&rows, 1);
        }
        Err(e) => report_error(&e),
    }
}

fn handle_predict(session: &mut Session<'_, LinearModel>) {
    let p = match session.predict() {
        Ok(p) => p.clone(),
        Err(e) => return report_error(&e),
    };
    println!("Predicted Next Month Work Load: {}", util::round_display(p.value));
    println!("Prediction Source: {}", p.source);
    if let Some(rec) = session.recommendation() {
        println!("{}", rec.headline(p.diff));
        println!("Recommendation: {}\n", rec.text());
    }
}

fn handle_ranking(session: &Session<'_, LinearModel>) {
    match session.ranking() {
        Ok(entries) => {
            println!(
                "Top {} Districts in {} (Latest Month Service Load)\n",
                entries.len(),
                session.region().unwrap_or_default()
            );
            let rows: Vec<RankingRow> = entries
                .into_iter()
                .enumerate()
                .map(|(i, e)| RankingRow {
                    rank: i + 1,
                    sub_region: e.sub_region,
                    latest_load: util::format_int(e.latest_load),
                })
                .collect();
            output::preview_table_rows(&rows, rows.len());
        }
        Err(e) => report_error(&e),
    }
}

fn handle_report(session: &Session<'_, LinearModel>, cfg: &AppConfig) {
    if session.state() == SessionState::NoPrediction {
        println!("First run [4] Predict Next Month Work Load, then the report becomes available.\n");
        return;
    }
    let now = chrono::Local::now().naive_local();
    match session.generate_report(now) {
        Ok(ReportOutcome::Ready(report)) => {
            output::print_report(&report);
            if let Some(rec) = report.body.recommendation() {
                println!("{}", rec.headline);
            }
            match output::write_report(&cfg.output_dir, &cfg.report_prefix, &report) {
                Ok(path) => {
                    info!(path = %path.display(), "report written");
                    println!("(Full report exported to {})\n", path.display());
                }
                Err(e) => eprintln!("Write error: {}", e),
            }
        }
        Ok(ReportOutcome::Unavailable) => println!("Report unavailable: no prediction yet.\n"),
        Err(e) => report_error(&e),
    }
}

fn run(cfg: &AppConfig) -> Result<(), Box<dyn Error>> {
    let index = dataset(cfg)?;
    let model = model(cfg)?;
    let mut session = Session::new(index, model, cfg.top_k);

    loop {
        let selection = match (session.region(), session.sub_region()) {
            (Some(r), Some(d)) => format!("{} / {}", r, d),
            (Some(r), None) => r.to_string(),
            _ => "none".to_string(),
        };
        match session.prediction() {
            Some(p) => println!(
                "District Service Load Forecast  (selected: {}, predicted: {})",
                selection,
                util::round_display(p.value)
            ),
            None => println!("District Service Load Forecast  (selected: {})", selection),
        }
        println!("[1] Select State");
        println!("[2] Select District");
        println!("[3] Show Latest Data");
        println!("[4] Predict Next Month Work Load");
        println!("[5] Top Districts in State");
        println!("[6] Generate Report");
        println!("[0] Exit\n");
        let Some(choice) = prompt("Enter choice") else { break };
        match choice.as_str() {
            "1" => {
                let Some(name) = pick("State", &index.regions()) else { break };
                if let Err(e) = session.select_region(&name) {
                    report_error(&e);
                }
            }
            "2" => {
                let subs = match session.region() {
                    Some(r) => index.sub_regions_of(r),
                    None => Err(ForecastError::NoSelection("state")),
                };
                match subs {
                    Ok(subs) => {
                        let Some(name) = pick("District", &subs) else { break };
                        if let Err(e) = session.select_sub_region(&name) {
                            report_error(&e);
                        }
                    }
                    Err(e) => report_error(&e),
                }
            }
            "3" => handle_latest(&session),
            "4" => handle_predict(&mut session),
            "5" => handle_ranking(&session),
            "6" => handle_report(&session, cfg),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-6.\n"),
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cfg = AppConfig::from(Args::parse());
    tracing_subscriber::fmt().with_max_level(cfg.log_level).init();

    if let Err(e) = run(&cfg) {
        error!(error = %e, "startup failed");
        return Err(e);
    }
    Ok(())
}
