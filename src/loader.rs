use crate::errors::LoadError;
use crate::types::{Observation, RawRow};
use crate::util::{parse_count_safe, parse_period_safe};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub duplicates: usize,
}

pub fn load_and_clean(path: &str) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let (data, report) = clean_rows(rdr)?;
    if data.is_empty() {
        return Err(LoadError::Empty(path.to_string()));
    }
    info!(
        path,
        total = report.total_rows,
        loaded = report.loaded_rows,
        parse_errors = report.parse_errors,
        duplicates = report.duplicates,
        "monthly dataset loaded"
    );
    Ok((data, report))
}

/// Rows come back in file order. The first row for a given
/// (region, sub_region, period) wins; later ones are counted as duplicates.
fn clean_rows<R: Read>(
    mut rdr: csv::Reader<R>,
) -> Result<(Vec<Observation>, LoadReport), LoadError> {
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut duplicates = 0usize;
    let mut seen = HashSet::new();
    let mut out: Vec<Observation> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = total_rows, error = %e, "unreadable row skipped");
                parse_errors += 1;
                continue;
            }
        };

        let region = match row.region.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => { parse_errors += 1; continue; }
        };
        let sub_region = match row.sub_region.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => { parse_errors += 1; continue; }
        };
        let period = match parse_period_safe(row.period.as_deref()) { Some(p) => p, None => { parse_errors += 1; continue; } };
        let total_enroll = match parse_count_safe(row.total_enroll.as_deref()) { Some(v) => v, None => { parse_errors += 1; continue; } };
        let total_updates = match parse_count_safe(row.total_updates.as_deref()) { Some(v) => v, None => { parse_errors += 1; continue; } };
        let service_load = match parse_count_safe(row.service_load.as_deref()) { Some(v) => v, None => { parse_errors += 1; continue; } };

        if !seen.insert((region.clone(), sub_region.clone(), period)) {
            debug!(%region, %sub_region, %period, "duplicate period dropped");
            duplicates += 1;
            continue;
        }

        out.push(Observation {
            region,
            sub_region,
            period,
            total_enroll,
            total_updates,
            service_load,
        });
    }

    let loaded_rows = out.len();
    let report = LoadReport { total_rows, loaded_rows, parse_errors, duplicates };
    Ok((out, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Period;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn loads_state_district_month_headers() {
        let f = write_csv(
            "state,district,month,total_enroll,total_updates,service_load\n\
             StateA,Dist1,2024-01,40,60,100\n\
             StateA,Dist1,2024-02-01,50.0,60,110\n",
        );
        let (data, report) = load_and_clean(f.path().to_str().unwrap()).unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(data[1].period, Period { year: 2024, month: 2 });
        assert_eq!(data[1].total_enroll, 50);
        assert_eq!(data[0].service_load, 100);
    }

    #[test]
    fn accepts_generic_headers() {
        let f = write_csv(
            "region,sub_region,period,total_enroll,total_updates,service_load\n\
             R,S,2023-12,1,2,3\n",
        );
        let (data, _) = load_and_clean(f.path().to_str().unwrap()).unwrap();
        assert_eq!(data[0].region, "R");
        assert_eq!(data[0].sub_region, "S");
    }

    #[test]
    fn skips_bad_rows_and_duplicates() {
        let f = write_csv(
            "state,district,month,total_enroll,total_updates,service_load\n\
             StateA,Dist1,2024-01,1,1,10\n\
             StateA,Dist1,2024-01,1,1,99\n\
             StateA,,2024-02,1,1,10\n\
             StateA,Dist1,not-a-month,1,1,10\n\
             StateA,Dist1,2024-03,1,1,-4\n",
        );
        let (data, report) = load_and_clean(f.path().to_str().unwrap()).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].service_load, 10);
        assert_eq!(
            report,
            LoadReport { total_rows: 5, loaded_rows: 1, parse_errors: 3, duplicates: 1 }
        );
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let f = write_csv("state,district,month,total_enroll,total_updates,service_load\n");
        let err = load_and_clean(f.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, LoadError::Empty(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            load_and_clean("/definitely/not/here.csv"),
            Err(LoadError::Csv(_))
        ));
    }
}
