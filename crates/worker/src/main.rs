use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalminer_core::domain::signal::StartupSignal;
use signalminer_core::fetcher::SignalFetcher;
use signalminer_core::filter::SignalFilter;
use signalminer_core::storage::startups;
use signalminer_core::summary::Summary;

#[derive(Debug, Parser)]
#[command(name = "signalminer_worker")]
struct Args {
    /// Only keep startups in this sector ("All" for any).
    #[arg(long)]
    sector: Option<String>,

    /// Only keep startups at this funding stage ("All" for any).
    #[arg(long)]
    funding_stage: Option<String>,

    /// Only keep startups with this signal type ("All" for any).
    #[arg(long)]
    signal_type: Option<String>,

    /// Minimum growth score (0-100).
    #[arg(long, default_value_t = 0)]
    min_score: i32,

    /// Number of startups to print.
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Print the filtered list as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Also print the trend summary for the last N days (needs DATABASE_URL).
    #[arg(long)]
    trends_days: Option<i64>,

    /// Do everything except writing to the database.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0..=100).contains(&self.min_score),
            "--min-score must be 0..=100 (got {})",
            self.min_score
        );
        if let Some(days) = self.trends_days {
            startups::trend_cutoff(Utc::now(), days).context("invalid --trends-days")?;
        }
        Ok(())
    }

    fn filter(&self) -> SignalFilter {
        SignalFilter {
            sector: self.sector.clone(),
            funding_stage: self.funding_stage.clone(),
            signal_type: self.signal_type.clone(),
            min_score: self.min_score,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalminer_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    args.validate()?;

    let fetcher = SignalFetcher::from_settings(&settings);
    let outcome = fetcher.fetch().await;
    if let Some(notice) = outcome.notice() {
        tracing::warn!(notice, "using fallback data");
    }

    let filtered = args.filter().apply(&outcome.signals);
    tracing::info!(
        fetched = outcome.signals.len(),
        kept = filtered.len(),
        fallback = outcome.is_fallback(),
        "scan complete"
    );

    if args.json {
        let top: Vec<&StartupSignal> = filtered.iter().take(args.top).collect();
        println!("{}", serde_json::to_string_pretty(&top)?);
    } else {
        print_report(&filtered, args.top);
    }

    let pool = if args.dry_run {
        tracing::info!(dry_run = true, "skipping database");
        None
    } else {
        match settings.database_url.as_deref() {
            Some(db_url) => open_pool(db_url).await,
            None => None,
        }
    };

    if let Some(pool) = &pool {
        if outcome.is_fallback() {
            tracing::info!("fallback data is not persisted");
        } else {
            persist(pool, &outcome.signals).await;
        }
    }

    if let Some(days) = args.trends_days {
        match &pool {
            Some(pool) => match startups::trends(pool, days).await {
                Ok(trend) => println!("{}", serde_json::to_string_pretty(&trend)?),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "loading trends failed");
                }
            },
            None => tracing::warn!("--trends-days needs DATABASE_URL and no --dry-run"),
        }
    }

    Ok(())
}

/// Storage is optional for a scan: failures are reported, never fatal.
async fn open_pool(db_url: &str) -> Option<PgPool> {
    match signalminer_core::storage::connect(db_url).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "database unavailable; scan not persisted");
            None
        }
    }
}

async fn persist(pool: &PgPool, signals: &[StartupSignal]) -> Option<u64> {
    match startups::store_signals(pool, signals)
        .await
        .context("persisting scan failed")
    {
        Ok(rows) => {
            tracing::info!(rows, "persisted startup signals");
            Some(rows)
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "persisting startup signals failed");
            None
        }
    }
}

fn print_report(signals: &[StartupSignal], top: usize) {
    let summary = Summary::of(signals);
    println!(
        "Found {} startups (avg score {:.1}, {} scoring 80+)",
        summary.total, summary.average_score, summary.high_score_count
    );
    println!("{}", "-".repeat(50));

    for (i, s) in signals.iter().take(top).enumerate() {
        println!("{}. {}", i + 1, s.name);
        println!("   Score: {}", s.score);
        println!("   Sector: {}", s.sector);
        println!("   Stage: {}", s.funding_stage);
        println!("   Signal: {}", s.signal_type);
        println!("   Reason: {}", s.growth_reason);
        println!();
    }
}

fn init_sentry(settings: &signalminer_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
