//! Additive growth score.
//!
//! `score = 50 + stage bonus + signal bonus + sector bonus`, clamped to
//! `0..=100`. Each bonus comes from a fixed rule table. A rule matches when
//! its phrase occurs anywhere in the lower-cased field (so "Series A1" is a
//! Series A and "Retail" carries the `ai` bonus), first match wins, and a
//! value that matches nothing contributes 0.

use crate::domain::signal::{SignalDraft, StartupSignal};

pub const BASE_SCORE: i32 = 50;
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub phrase: &'static str,
    pub bonus: i32,
}

const fn rule(phrase: &'static str, bonus: i32) -> Rule {
    Rule { phrase, bonus }
}

pub const STAGE_RULES: &[Rule] = &[
    rule("seed", 10),
    rule("series a", 15),
    rule("series b", 20),
];

pub const SIGNAL_RULES: &[Rule] = &[
    rule("funding", 15),
    rule("partnership", 12),
    rule("acquisition", 20),
];

pub const SECTOR_RULES: &[Rule] = &[
    rule("ai", 8),
    rule("artificial intelligence", 8),
    rule("cybersecurity", 10),
    rule("healthcare", 7),
];

pub fn growth_score(draft: &SignalDraft) -> i32 {
    score_fields(&draft.funding_stage, &draft.signal_type, &draft.sector)
}

pub fn score_fields(funding_stage: &str, signal_type: &str, sector: &str) -> i32 {
    let raw = BASE_SCORE
        + bonus(STAGE_RULES, funding_stage)
        + bonus(SIGNAL_RULES, signal_type)
        + bonus(SECTOR_RULES, sector);
    raw.clamp(MIN_SCORE, MAX_SCORE)
}

pub fn bonus(rules: &[Rule], value: &str) -> i32 {
    let value = value.to_lowercase();
    rules
        .iter()
        .find(|r| value.contains(r.phrase))
        .map(|r| r.bonus)
        .unwrap_or(0)
}

/// Highest score first; ties keep a stable alphabetical order by name.
pub fn rank(signals: &mut [StartupSignal]) {
    signals.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
}
