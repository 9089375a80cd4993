use crate::domain::signal::StartupSignal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dropdown value meaning "no constraint".
pub const ANY: &str = "All";

/// Predicates applied with logical AND. Unset, blank, or `"All"` categorical
/// predicates do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFilter {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub funding_stage: Option<String>,
    #[serde(default)]
    pub signal_type: Option<String>,
    #[serde(default)]
    pub min_score: i32,
}

impl SignalFilter {
    pub fn is_unconstrained(&self) -> bool {
        active(&self.sector).is_none()
            && active(&self.funding_stage).is_none()
            && active(&self.signal_type).is_none()
            && self.min_score <= 0
    }

    pub fn matches(&self, signal: &StartupSignal) -> bool {
        field_matches(&self.sector, &signal.sector)
            && field_matches(&self.funding_stage, &signal.funding_stage)
            && field_matches(&self.signal_type, &signal.signal_type)
            && signal.score >= self.min_score
    }

    pub fn apply(&self, signals: &[StartupSignal]) -> Vec<StartupSignal> {
        signals.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

fn active(predicate: &Option<String>) -> Option<&str> {
    predicate
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(ANY))
}

fn field_matches(predicate: &Option<String>, value: &str) -> bool {
    match active(predicate) {
        Some(wanted) => value.trim().to_lowercase() == wanted.to_lowercase(),
        None => true,
    }
}

/// Distinct values per categorical field, sorted, for filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub sectors: Vec<String>,
    pub funding_stages: Vec<String>,
    pub signal_types: Vec<String>,
}

impl Facets {
    pub fn of(signals: &[StartupSignal]) -> Self {
        Self {
            sectors: unique(signals, |s| &s.sector),
            funding_stages: unique(signals, |s| &s.funding_stage),
            signal_types: unique(signals, |s| &s.signal_type),
        }
    }
}

fn unique<F>(signals: &[StartupSignal], field: F) -> Vec<String>
where
    F: Fn(&StartupSignal) -> &String,
{
    signals
        .iter()
        .map(|s| field(s).trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_signals;
    use chrono::Utc;

    fn sample() -> Vec<StartupSignal> {
        fallback_signals(Utc::now())
    }

    #[test]
    fn unset_filter_is_identity() {
        let signals = sample();
        let filter = SignalFilter::default();
        assert!(filter.is_unconstrained());
        assert_eq!(filter.apply(&signals), signals);
    }

    #[test]
    fn all_literal_means_unset() {
        let signals = sample();
        let filter = SignalFilter {
            sector: Some(ANY.to_string()),
            funding_stage: Some("all".to_string()),
            signal_type: Some("  ".to_string()),
            min_score: 0,
        };
        assert!(filter.is_unconstrained());
        assert_eq!(filter.apply(&signals).len(), signals.len());
    }

    #[test]
    fn missing_sector_yields_empty_result() {
        let signals: Vec<_> = sample().into_iter().filter(|s| s.sector != "Fintech").collect();
        let filter = SignalFilter {
            sector: Some("Fintech".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(&signals).is_empty());
    }

    #[test]
    fn categorical_match_is_case_insensitive() {
        let signals = sample();
        let filter = SignalFilter {
            funding_stage: Some("series a".to_string()),
            ..Default::default()
        };
        let out = filter.apply(&signals);
        assert!(!out.is_empty());
        assert!(out.iter().all(|s| s.funding_stage == "Series A"));
    }

    #[test]
    fn predicates_combine_with_and() {
        let signals = sample();
        let filter = SignalFilter {
            funding_stage: Some("Seed".to_string()),
            signal_type: Some("Partnership".to_string()),
            min_score: 70,
            ..Default::default()
        };
        let out = filter.apply(&signals);
        assert!(!out.is_empty());
        for s in &out {
            assert_eq!(s.funding_stage, "Seed");
            assert_eq!(s.signal_type, "Partnership");
            assert!(s.score >= 70);
        }
    }

    #[test]
    fn min_score_is_inclusive() {
        let signals = sample();
        let threshold = signals[0].score;
        let filter = SignalFilter {
            min_score: threshold,
            ..Default::default()
        };
        assert!(filter.apply(&signals).iter().any(|s| s.score == threshold));

        let above = SignalFilter {
            min_score: 101,
            ..Default::default()
        };
        assert!(above.apply(&signals).is_empty());
    }

    #[test]
    fn facets_are_sorted_and_distinct() {
        let facets = Facets::of(&sample());
        let mut sorted = facets.funding_stages.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(facets.funding_stages, sorted);
        assert!(facets.sectors.contains(&"Fintech".to_string()));
        assert!(facets.signal_types.contains(&"Partnership".to_string()));
    }
}
