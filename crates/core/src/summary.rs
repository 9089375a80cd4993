use crate::domain::signal::{StartupSignal, HIGH_SCORE_THRESHOLD};
use serde::Serialize;
use std::collections::BTreeMap;

pub const HISTOGRAM_BINS: usize = 10;

/// Headline metrics and chart data for a (filtered) list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub average_score: f64,
    pub high_score_count: usize,
    pub sector_distribution: BTreeMap<String, usize>,
    pub signal_type_distribution: BTreeMap<String, usize>,
    /// Bin `i` counts scores in `[10 * i, 10 * i + 10)`; 100 lands in the last bin.
    pub score_histogram: [usize; HISTOGRAM_BINS],
}

impl Summary {
    pub fn of(signals: &[StartupSignal]) -> Self {
        let mut score_histogram = [0usize; HISTOGRAM_BINS];
        for s in signals {
            score_histogram[histogram_bin(s.score)] += 1;
        }

        Self {
            total: signals.len(),
            average_score: average_score(signals),
            high_score_count: signals
                .iter()
                .filter(|s| s.score >= HIGH_SCORE_THRESHOLD)
                .count(),
            sector_distribution: distribution(signals.iter().map(|s| s.sector.as_str())),
            signal_type_distribution: distribution(signals.iter().map(|s| s.signal_type.as_str())),
            score_histogram,
        }
    }
}

pub fn average_score(signals: &[StartupSignal]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let sum: i64 = signals.iter().map(|s| i64::from(s.score)).sum();
    sum as f64 / signals.len() as f64
}

/// Counts per value; blank values are reported as `Unknown`.
pub fn distribution<'a, I>(values: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = BTreeMap::new();
    for v in values {
        let key = match v.trim() {
            "" => "Unknown",
            other => other,
        };
        *out.entry(key.to_string()).or_insert(0) += 1;
    }
    out
}

fn histogram_bin(score: i32) -> usize {
    let clamped = score.clamp(0, 100) as usize;
    (clamped / 10).min(HISTOGRAM_BINS - 1)
}
