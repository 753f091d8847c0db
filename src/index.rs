//! In-memory index over the monthly dataset.
//!
//! Records are sorted once at build time by (region, sub-region, period) so
//! every history lookup is a contiguous slice and no query re-sorts.
use crate::errors::ForecastError;
use crate::types::Observation;
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone)]
struct Span {
    rows: Range<usize>,
    /// Position of the sub-region's first row in the input, used to keep
    /// input order when rankings tie.
    first_seen: usize,
}

#[derive(Debug)]
pub struct DatasetIndex {
    records: Vec<Observation>,
    spans: BTreeMap<String, BTreeMap<String, Span>>,
}

/// Ordered observations of one (region, sub-region), oldest first.
#[derive(Debug, Clone, Copy)]
pub struct History<'a> {
    pub region: &'a str,
    pub sub_region: &'a str,
    records: &'a [Observation],
}

impl<'a> History<'a> {
    pub fn new(region: &'a str, sub_region: &'a str, records: &'a [Observation]) -> Self {
        Self { region, sub_region, records }
    }

    pub fn records(&self) -> &'a [Observation] {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn latest(&self) -> Option<&'a Observation> {
        self.records.last()
    }
}

impl DatasetIndex {
    pub fn new(records: Vec<Observation>) -> Self {
        let mut order: Vec<(usize, Observation)> = records.into_iter().enumerate().collect();
        // Stable, so equal keys (which the loader already rejects) keep input order.
        order.sort_by(|(_, a), (_, b)| {
            (a.region.as_str(), a.sub_region.as_str(), a.period)
                .cmp(&(b.region.as_str(), b.sub_region.as_str(), b.period))
        });

        let mut spans: BTreeMap<String, BTreeMap<String, Span>> = BTreeMap::new();
        let mut sorted = Vec::with_capacity(order.len());
        for (pos, (input_pos, rec)) in order.into_iter().enumerate() {
            let span = spans
                .entry(rec.region.clone())
                .or_default()
                .entry(rec.sub_region.clone())
                .or_insert_with(|| Span { rows: pos..pos, first_seen: input_pos });
            span.rows.end = pos + 1;
            span.first_seen = span.first_seen.min(input_pos);
            sorted.push(rec);
        }

        Self { records: sorted, spans }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn regions(&self) -> Vec<&str> {
        self.spans.keys().map(String::as_str).collect()
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.spans.contains_key(region)
    }

    /// Sub-region names of `region`, alphabetically.
    pub fn sub_regions_of(&self, region: &str) -> Result<Vec<&str>, ForecastError> {
        let subs = self
            .spans
            .get(region)
            .ok_or_else(|| ForecastError::RegionNotFound(region.to_string()))?;
        Ok(subs.keys().map(String::as_str).collect())
    }

    pub fn history_of(&self, region: &str, sub_region: &str) -> Result<History<'_>, ForecastError> {
        let subs = self
            .spans
            .get(region)
            .ok_or_else(|| ForecastError::RegionNotFound(region.to_string()))?;
        let (name, span) = subs.get_key_value(sub_region).ok_or_else(|| {
            ForecastError::SubRegionNotFound {
                region: region.to_string(),
                sub_region: sub_region.to_string(),
            }
        })?;
        Ok(History::new(
            &self.records[span.rows.start].region,
            name,
            &self.records[span.rows.clone()],
        ))
    }

    pub fn latest_of(&self, region: &str, sub_region: &str) -> Result<&Observation, ForecastError> {
        self.history_of(region, sub_region)?
            .latest()
            .ok_or_else(|| ForecastError::EmptyHistory {
                region: region.to_string(),
                sub_region: sub_region.to_string(),
            })
    }

    /// Histories of every sub-region in `region`, in the order the
    /// sub-regions first appeared in the input.
    pub fn histories_in_input_order(&self, region: &str) -> Result<Vec<History<'_>>, ForecastError> {
        let subs = self
            .spans
            .get(region)
            .ok_or_else(|| ForecastError::RegionNotFound(region.to_string()))?;
        let mut spans: Vec<(&String, &Span)> = subs.iter().collect();
        spans.sort_by_key(|(_, s)| s.first_seen);
        Ok(spans
            .into_iter()
            .map(|(name, s)| {
                History::new(&self.records[s.rows.start].region, name, &self.records[s.rows.clone()])
            })
            .collect())
    }
}
