//! Report assembly: summary, recommendation and chart blocks composed in a
//! fixed order and laid out onto A4 pages.
//!
//! Layout is a budget check ahead of each block. A block that does not fit
//! in the space left on the page starts a new page; blocks are never split.
use crate::errors::ForecastError;
use crate::index::History;
use crate::recommend::Recommendation;
use crate::types::{Period, Prediction, PredictionSource, RankingEntry};
use crate::util::{round_display, truncate_chars};
use chrono::NaiveDateTime;
use serde::Serialize;

pub const REPORT_TITLE: &str = "Service Load Forecast Report (Auto Generated)";
pub const RECOMMENDATION_MAX_CHARS: usize = 95;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// A4 portrait in points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const PAGE_MARGIN: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Trend,
    Comparison,
    Ranking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Chart data handed to whatever rasterizes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBlock {
    pub region: String,
    pub sub_region: String,
    pub last_period: Period,
    pub total_enroll: u64,
    pub total_updates: u64,
    pub current_load: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionBlock {
    pub predicted: f64,
    pub diff: f64,
    pub source: PredictionSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationBlock {
    pub recommendation: Recommendation,
    pub headline: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Header { title: String },
    Summary(SummaryBlock),
    Prediction(PredictionBlock),
    PredictionPending,
    Recommendation(RecommendationBlock),
    Chart(ChartArtifact),
}

impl Block {
    /// Vertical space the block needs, in points.
    pub fn height(&self) -> f64 {
        match self {
            Block::Header { .. } => 50.0,
            Block::Summary(_) => 113.0,
            Block::Prediction(_) => 50.0,
            Block::PredictionPending => 20.0,
            Block::Recommendation(_) => 40.0,
            Block::Chart(c) => match c.kind {
                ChartKind::Trend | ChartKind::Comparison => 200.0,
                ChartKind::Ranking => 250.0,
            },
        }
    }

    /// Text lines of the block. Charts contribute their caption only.
    pub fn lines(&self, generated_at: &str) -> Vec<String> {
        match self {
            Block::Header { title } => {
                vec![title.clone(), format!("Generated On: {}", generated_at)]
            }
            Block::Summary(s) => vec![
                "Prediction Summary".to_string(),
                format!("State: {}", s.region),
                format!("District: {}", s.sub_region),
                format!("Last Month in Dataset: {}", s.last_period),
                format!("Total Enrollments: {}", s.total_enroll),
                format!("Total Updates: {}", s.total_updates),
                format!("Current Service Load: {}", s.current_load),
            ],
            Block::Prediction(p) => vec![
                format!("Predicted Next Month Work Load: {}", round_display(p.predicted)),
                format!("Difference (Predicted - Current): {}", round_display(p.diff)),
                format!("Prediction Source: {}", p.source),
            ],
            Block::PredictionPending => {
                vec!["Prediction not generated yet. Please predict first.".to_string()]
            }
            Block::Recommendation(r) => vec!["Recommendation:".to_string(), r.text.clone()],
            Block::Chart(c) => vec![c.title.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    /// Distance from the top edge of the page to the block's top.
    pub top: f64,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub blocks: Vec<PlacedBlock>,
}

/// Everything in a report except the generation time, so two reports built
/// from the same inputs compare equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBody {
    pub region: String,
    pub sub_region: String,
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: String,
    #[serde(flatten)]
    pub body: ReportBody,
}

impl ReportBody {
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|p| p.blocks.iter().map(|b| &b.block))
    }

    pub fn recommendation(&self) -> Option<&RecommendationBlock> {
        self.blocks().find_map(|b| match b {
            Block::Recommendation(r) => Some(r),
            _ => None,
        })
    }
}

impl Report {
    /// `<prefix>_<region>_<sub_region>.<ext>`, with path separators in the
    /// names replaced so the result is a single file name.
    pub fn file_name(&self, prefix: &str, ext: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            prefix,
            file_safe(&self.body.region),
            file_safe(&self.body.sub_region),
            ext
        )
    }
}

fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

pub fn trend_chart(history: &History<'_>) -> ChartArtifact {
    ChartArtifact {
        kind: ChartKind::Trend,
        title: format!(
            "Graph 1: Service Load Trend: {}, {}",
            history.sub_region, history.region
        ),
        x_label: "Month".to_string(),
        y_label: "Service Load".to_string(),
        points: history
            .records()
            .iter()
            .map(|o| ChartPoint {
                label: o.period.to_string(),
                value: o.service_load as f64,
            })
            .collect(),
    }
}

pub fn comparison_chart(prediction: &Prediction) -> ChartArtifact {
    ChartArtifact {
        kind: ChartKind::Comparison,
        title: "Graph 2: Current vs Predicted Next Month".to_string(),
        x_label: String::new(),
        y_label: "Service Load".to_string(),
        points: vec![
            ChartPoint {
                label: "Current Month".to_string(),
                value: prediction.current_load as f64,
            },
            ChartPoint {
                label: "Predicted Next Month".to_string(),
                value: prediction.value,
            },
        ],
    }
}

pub fn ranking_chart(region: &str, ranking: &[RankingEntry]) -> ChartArtifact {
    ChartArtifact {
        kind: ChartKind::Ranking,
        title: format!("Graph 3: Top {} Districts in {}", ranking.len(), region),
        x_label: "Service Load".to_string(),
        y_label: String::new(),
        points: ranking
            .iter()
            .map(|e| ChartPoint {
                label: e.sub_region.clone(),
                value: e.latest_load as f64,
            })
            .collect(),
    }
}

/// Blocks in document order: header, summary, prediction line, recommendation,
/// trend chart, comparison chart, ranking chart. The recommendation and the
/// comparison chart only exist when a prediction was made.
pub fn compose_blocks(
    history: &History<'_>,
    prediction: Option<&Prediction>,
    ranking: &[RankingEntry],
) -> Result<Vec<Block>, ForecastError> {
    let latest = history.latest().ok_or_else(|| ForecastError::EmptyHistory {
        region: history.region.to_string(),
        sub_region: history.sub_region.to_string(),
    })?;

    let mut blocks = vec![
        Block::Header { title: REPORT_TITLE.to_string() },
        Block::Summary(SummaryBlock {
            region: history.region.to_string(),
            sub_region: history.sub_region.to_string(),
            last_period: latest.period,
            total_enroll: latest.total_enroll,
            total_updates: latest.total_updates,
            current_load: latest.service_load,
        }),
    ];

    match prediction {
        Some(p) => {
            let rec = Recommendation::for_prediction(p);
            blocks.push(Block::Prediction(PredictionBlock {
                predicted: p.value,
                diff: p.diff,
                source: p.source,
            }));
            blocks.push(Block::Recommendation(RecommendationBlock {
                recommendation: rec,
                headline: rec.headline(p.diff),
                text: truncate_chars(rec.text(), RECOMMENDATION_MAX_CHARS),
            }));
        }
        None => blocks.push(Block::PredictionPending),
    }

    blocks.push(Block::Chart(trend_chart(history)));
    if let Some(p) = prediction {
        blocks.push(Block::Chart(comparison_chart(p)));
    }
    blocks.push(Block::Chart(ranking_chart(history.region, ranking)));
    Ok(blocks)
}

pub fn paginate(blocks: Vec<Block>) -> Vec<Page> {
    let top = PAGE_MARGIN;
    let bottom = PAGE_HEIGHT - PAGE_MARGIN;
    let mut pages = vec![Page { number: 1, blocks: Vec::new() }];
    let mut cursor = top;

    for block in blocks {
        let height = block.height();
        let page_has_content = pages.last().map_or(false, |p| !p.blocks.is_empty());
        if cursor + height > bottom && page_has_content {
            let number = pages.len() + 1;
            pages.push(Page { number, blocks: Vec::new() });
            cursor = top;
        }
        if let Some(page) = pages.last_mut() {
            page.blocks.push(PlacedBlock { top: cursor, block });
        }
        cursor += height;
    }
    pages
}

pub fn assemble(
    history: &History<'_>,
    prediction: Option<&Prediction>,
    ranking: &[RankingEntry],
    generated_at: NaiveDateTime,
) -> Result<Report, ForecastError> {
    let blocks = compose_blocks(history, prediction, ranking)?;
    Ok(Report {
        generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
        body: ReportBody {
            region: history.region.to_string(),
            sub_region: history.sub_region.to_string(),
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            pages: paginate(blocks),
        },
    })
}
