use crate::domain::signal::StartupSignal;
use crate::summary::{average_score, distribution};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: i64 = 100;
pub const MAX_HISTORY_LIMIT: i64 = 1000;
pub const DEFAULT_TREND_DAYS: i64 = 30;

type StartupRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i32,
    DateTime<Utc>,
);

/// Inserts one fetch cycle in a single transaction. Returns rows written.
pub async fn store_signals(pool: &sqlx::PgPool, signals: &[StartupSignal]) -> anyhow::Result<u64> {
    if signals.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let mut qb = sqlx::QueryBuilder::new(
        "INSERT INTO startups (id, name, description, growth_reason, source_link, sector, funding_stage, signal_type, score, \"timestamp\") ",
    );
    qb.push_values(signals, |mut b, s| {
        b.push_bind(Uuid::new_v4())
            .push_bind(s.name.as_str())
            .push_bind(s.description.as_str())
            .push_bind(s.growth_reason.as_str())
            .push_bind(s.source_link.as_str())
            .push_bind(s.sector.as_str())
            .push_bind(s.funding_stage.as_str())
            .push_bind(s.signal_type.as_str())
            .push_bind(s.score)
            .push_bind(s.fetched_at);
    });

    let res = qb
        .build()
        .persistent(false)
        .execute(&mut *tx)
        .await
        .context("insert startups failed")?;

    tx.commit().await.context("commit transaction failed")?;

    tracing::debug!(rows = res.rows_affected(), "stored startup signals");
    Ok(res.rows_affected())
}

/// Newest rows first.
pub async fn recent_signals(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<Vec<StartupSignal>> {
    let limit = clamp_limit(limit);
    let rows = sqlx::query_as::<_, StartupRow>(
        "SELECT name, description, growth_reason, source_link, sector, funding_stage, signal_type, score, \"timestamp\" \
         FROM startups \
         ORDER BY \"timestamp\" DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("select recent startups failed")?;

    Ok(rows.into_iter().map(row_to_signal).collect())
}

pub async fn signals_since(
    pool: &sqlx::PgPool,
    cutoff: DateTime<Utc>,
) -> anyhow::Result<Vec<StartupSignal>> {
    let rows = sqlx::query_as::<_, StartupRow>(
        "SELECT name, description, growth_reason, source_link, sector, funding_stage, signal_type, score, \"timestamp\" \
         FROM startups \
         WHERE \"timestamp\" >= $1",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await
    .context("select startups since cutoff failed")?;

    Ok(rows.into_iter().map(row_to_signal).collect())
}

/// Start of a `days`-long window ending at `now`. Rejects windows shorter than
/// a day or too long to represent.
pub fn trend_cutoff(now: DateTime<Utc>, days: i64) -> anyhow::Result<DateTime<Utc>> {
    anyhow::ensure!(days >= 1, "trend window must be at least 1 day (got {days})");
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .with_context(|| format!("trend window of {days} days is out of range"))
}

pub async fn trends(pool: &sqlx::PgPool, days: i64) -> anyhow::Result<TrendSummary> {
    let cutoff = trend_cutoff(Utc::now(), days)?;
    let signals = signals_since(pool, cutoff).await?;
    Ok(TrendSummary::from_signals(&signals, days))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub total_startups: usize,
    pub average_score: f64,
    pub sector_distribution: BTreeMap<String, usize>,
    pub signal_type_distribution: BTreeMap<String, usize>,
    pub period_days: i64,
}

impl TrendSummary {
    pub fn from_signals(signals: &[StartupSignal], period_days: i64) -> Self {
        Self {
            total_startups: signals.len(),
            average_score: average_score(signals),
            sector_distribution: distribution(signals.iter().map(|s| s.sector.as_str())),
            signal_type_distribution: distribution(signals.iter().map(|s| s.signal_type.as_str())),
            period_days,
        }
    }
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_HISTORY_LIMIT)
}

fn row_to_signal(row: StartupRow) -> StartupSignal {
    let (name, description, growth_reason, source_link, sector, funding_stage, signal_type, score, fetched_at) =
        row;
    StartupSignal {
        name,
        description: description.unwrap_or_default(),
        growth_reason: growth_reason.unwrap_or_default(),
        source_link: source_link.unwrap_or_default(),
        sector: sector.unwrap_or_default(),
        funding_stage: funding_stage.unwrap_or_default(),
        signal_type: signal_type.unwrap_or_default(),
        score,
        fetched_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_signals;

    #[test]
    fn trend_summary_counts_distributions() {
        let signals = fallback_signals(Utc::now());
        let trend = TrendSummary::from_signals(&signals, 7);

        assert_eq!(trend.total_startups, signals.len());
        assert_eq!(trend.period_days, 7);
        assert_eq!(trend.sector_distribution.get("Fintech"), Some(&1));
        assert_eq!(trend.signal_type_distribution.values().sum::<usize>(), signals.len());
        assert!(trend.average_score > 0.0);
    }

    #[test]
    fn empty_window_is_zeroed() {
        let trend = TrendSummary::from_signals(&[], DEFAULT_TREND_DAYS);
        assert_eq!(trend.total_startups, 0);
        assert_eq!(trend.average_score, 0.0);
    }

    #[test]
    fn null_columns_become_empty_text() {
        let at = Utc::now();
        let signal = row_to_signal(("Acme".to_string(), None, None, None, Some("AI".to_string()), None, None, 58, at));
        assert_eq!(signal.name, "Acme");
        assert_eq!(signal.sector, "AI");
        assert!(signal.description.is_empty());
        assert_eq!(signal.score, 58);
    }

    #[test]
    fn trend_cutoff_rejects_out_of_range_windows() {
        let now = Utc::now();
        assert_eq!(trend_cutoff(now, 7).unwrap(), now - Duration::days(7));
        assert!(trend_cutoff(now, 0).is_err());
        assert!(trend_cutoff(now, -3).is_err());
        assert!(trend_cutoff(now, 1_000_000_000).is_err());
        assert!(trend_cutoff(now, i64::MAX).is_err());
    }

    #[test]
    fn history_limit_is_clamped() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-5), 1);
        assert_eq!(clamp_limit(DEFAULT_HISTORY_LIMIT), DEFAULT_HISTORY_LIMIT);
        assert_eq!(clamp_limit(50_000), MAX_HISTORY_LIMIT);
    }
}
