use crate::errors::ForecastError;
use crate::index::DatasetIndex;
use crate::types::RankingEntry;

pub const DEFAULT_TOP_K: usize = 10;

/// Latest-period load of every sub-region in `region`, highest first,
/// truncated to `k`. The latest observation is the max-period one, not the
/// max-load one. Ties keep the order sub-regions first appeared in the input.
pub fn top_sub_regions(
    index: &DatasetIndex,
    region: &str,
    k: usize,
) -> Result<Vec<RankingEntry>, ForecastError> {
    let mut entries: Vec<RankingEntry> = index
        .histories_in_input_order(region)?
        .into_iter()
        .filter_map(|h| {
            h.latest().map(|o| RankingEntry {
                sub_region: h.sub_region.to_string(),
                latest_load: o.service_load,
            })
        })
        .collect();
    // `sort_by` is stable.
    entries.sort_by(|a, b| b.latest_load.cmp(&a.latest_load));
    entries.truncate(k);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::obs;

    #[test]
    fn ranks_by_latest_period_not_peak_load() {
        let idx = DatasetIndex::new(vec![
            obs("S", "A", 2, 5),
            obs("S", "A", 1, 500),
            obs("S", "B", 1, 50),
        ]);
        let top = top_sub_regions(&idx, "S", 10).unwrap();
        assert_eq!(
            top,
            vec![
                RankingEntry { sub_region: "B".into(), latest_load: 50 },
                RankingEntry { sub_region: "A".into(), latest_load: 5 },
            ]
        );
    }

    #[test]
    fn truncates_to_k_and_sorts_descending() {
        let rows = (0..15).map(|i| obs("S", &format!("D{:02}", i), 1, i * 10)).collect();
        let idx = DatasetIndex::new(rows);
        let top = top_sub_regions(&idx, "S", DEFAULT_TOP_K).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].sub_region, "D14");
        assert!(top.windows(2).all(|w| w[0].latest_load > w[1].latest_load));
    }

    #[test]
    fn ties_keep_input_order() {
        let idx = DatasetIndex::new(vec![
            obs("S", "Zeta", 1, 7),
            obs("S", "Alpha", 1, 7),
            obs("S", "Mid", 1, 9),
        ]);
        let names: Vec<String> = top_sub_regions(&idx, "S", 10)
            .unwrap()
            .into_iter()
            .map(|e| e.sub_region)
            .collect();
        assert_eq!(names, vec!["Mid", "Zeta", "Alpha"]);
    }

    #[test]
    fn other_regions_are_excluded_and_unknown_region_fails() {
        let idx = DatasetIndex::new(vec![obs("S", "A", 1, 1), obs("T", "B", 1, 100)]);
        assert_eq!(top_sub_regions(&idx, "S", 10).unwrap().len(), 1);
        assert!(top_sub_regions(&idx, "Nope", 10).unwrap_err().is_not_found());
    }
}
