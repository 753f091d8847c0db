use crate::reports::{Block, ChartArtifact, Report};
use crate::types::ChartRow;
use crate::util::format_number;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the laid-out report as `<prefix>_<region>_<sub_region>.json` in `dir`.
pub fn write_report(dir: &Path, prefix: &str, report: &Report) -> Result<PathBuf, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report.file_name(prefix, "json"));
    write_json(&path, report)?;
    Ok(path)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn chart_rows(chart: &ChartArtifact) -> Vec<ChartRow> {
    chart
        .points
        .iter()
        .map(|p| ChartRow {
            label: p.label.clone(),
            value: format_number(p.value, 0),
        })
        .collect()
}

/// Console rendering of a report, page by page. Chart data is shown as a table.
pub fn print_report(report: &Report) {
    for page in &report.body.pages {
        println!("--- Page {} ---", page.number);
        for placed in &page.blocks {
            for line in placed.block.lines(&report.generated_at) {
                println!("{}", line);
            }
            if let Block::Chart(chart) = &placed.block {
                let rows = chart_rows(chart);
                preview_table_rows(&rows, rows.len());
            } else {
                println!();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::obs;
    use crate::index::History;
    use crate::reports::assemble;
    use chrono::NaiveDate;

    #[test]
    fn report_is_written_under_the_conventional_name() {
        let recs = vec![obs("StateA", "Dist1", 1, 5)];
        let h = History::new("StateA", "Dist1", &recs);
        let at = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
        let report = assemble(&h, None, &[], at).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "UIDAI_Report", &report).unwrap();
        assert_eq!(path.file_name().unwrap(), "UIDAI_Report_StateA_Dist1.json");

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["generated_at"], "2024-01-02 03:04:05");
        assert_eq!(written["region"], "StateA");
        assert_eq!(written["pages"][0]["blocks"][0]["block"]["block"], "header");
    }

    #[test]
    fn chart_rows_round_values() {
        let recs = vec![obs("S", "D", 1, 1234)];
        let h = History::new("S", "D", &recs);
        let rows = chart_rows(&crate::reports::trend_chart(&h));
        assert_eq!(rows[0].label, "2024-01");
        assert_eq!(rows[0].value, "1,234");
    }
}
