//! Server-rendered dashboard page.

use std::collections::BTreeMap;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use signalminer_core::domain::signal::StartupSignal;
use signalminer_core::fetcher::FetchOutcome;
use signalminer_core::filter::{Facets, SignalFilter, ANY};
use signalminer_core::summary::{Summary, HISTOGRAM_BINS};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1.5rem; color: #222; }
h1 { color: #1f77b4; text-align: center; }
.notice { background: #fff3cd; border: 1px solid #ffe08a; padding: .75rem 1rem; border-radius: .5rem; }
.filters { display: flex; gap: 1rem; flex-wrap: wrap; align-items: end; margin: 1rem 0; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric { background: #f0f2f6; padding: 1rem; border-radius: .5rem; border-left: 4px solid #1f77b4; }
.charts { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; margin: 1.5rem 0; }
.bar-row { display: flex; align-items: center; gap: .5rem; font-size: .85rem; }
.bar-label { width: 9rem; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.bar { background: #1f77b4; height: .8rem; border-radius: .2rem; }
.card { display: flex; justify-content: space-between; border: 1px solid #e0e0e0; border-radius: .5rem; padding: 1rem; margin-bottom: 1rem; }
.score { font-size: 2rem; font-weight: bold; min-width: 5rem; text-align: center; }
.score-high { color: #28a745; } .score-medium { color: #ffc107; } .score-low { color: #dc3545; }
footer { text-align: center; color: #666; margin-top: 2rem; }
"#;

pub struct Page<'a> {
    pub outcome: &'a FetchOutcome,
    pub filter: &'a SignalFilter,
    pub facets: &'a Facets,
    pub filtered: &'a [StartupSignal],
    pub summary: &'a Summary,
}

pub fn render(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>SaaS Signal Miner</title>
<style>{STYLE}</style>
</head>
<body>
<h1>SaaS Signal Miner</h1>
<p style="text-align:center">Discover high-potential early-stage SaaS startups</p>
"#
    ));

    if let Some(notice) = page.outcome.notice() {
        html.push_str(&format!(r#"<div class="notice">{}</div>"#, text(notice)));
    }

    render_filters(&mut html, page.filter, page.facets);
    render_metrics(&mut html, page.summary, page.outcome);

    if !page.filtered.is_empty() {
        html.push_str(r#"<section class="charts">"#);
        render_histogram(&mut html, &page.summary.score_histogram);
        render_distribution(&mut html, "Startups by Sector", &page.summary.sector_distribution);
        render_distribution(
            &mut html,
            "Startups by Signal Type",
            &page.summary.signal_type_distribution,
        );
        html.push_str("</section>");
    }

    html.push_str("<h2>Top SaaS Startups</h2>");
    if page.filtered.is_empty() {
        html.push_str(r#"<p class="notice">No startups match the selected filters.</p>"#);
    }
    for signal in page.filtered {
        render_card(&mut html, signal);
    }

    html.push_str(
        "<footer><p>Data is cached for a few minutes. Use Refresh for the latest results.</p></footer>\n</body>\n</html>\n",
    );
    html
}

fn render_filters(html: &mut String, filter: &SignalFilter, facets: &Facets) {
    html.push_str(r#"<form class="filters" method="get" action="/">"#);
    render_select(html, "sector", "Sector", &facets.sectors, filter.sector.as_deref());
    render_select(
        html,
        "funding_stage",
        "Funding Stage",
        &facets.funding_stages,
        filter.funding_stage.as_deref(),
    );
    render_select(
        html,
        "signal_type",
        "Signal Type",
        &facets.signal_types,
        filter.signal_type.as_deref(),
    );
    html.push_str(&format!(
        r#"<label>Minimum Growth Score<br><input type="number" name="min_score" min="0" max="100" step="5" value="{}"></label>"#,
        filter.min_score
    ));
    html.push_str(r#"<button type="submit">Apply</button></form>"#);
    html.push_str(
        r#"<form method="post" action="/refresh"><button type="submit">Refresh Data</button></form>"#,
    );
}

fn render_select(html: &mut String, name: &str, label: &str, options: &[String], selected: Option<&str>) {
    let selected = selected.unwrap_or(ANY);
    html.push_str(&format!(r#"<label>{label}<br><select name="{name}">"#));
    let all = std::iter::once(ANY).chain(options.iter().map(String::as_str));
    for option in all {
        let mark = if option.eq_ignore_ascii_case(selected) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<option value="{}"{mark}>{}</option>"#,
            attr(option),
            text(option)
        ));
    }
    html.push_str("</select></label>");
}

fn render_metrics(html: &mut String, summary: &Summary, outcome: &FetchOutcome) {
    html.push_str(&format!(
        r#"<section class="metrics">
<div class="metric"><div>Total Startups</div><strong>{}</strong></div>
<div class="metric"><div>Avg Growth Score</div><strong>{:.1}</strong></div>
<div class="metric"><div>High Score (80+)</div><strong>{}</strong></div>
<div class="metric"><div>Last Updated</div><strong>{}</strong></div>
</section>"#,
        summary.total,
        summary.average_score,
        summary.high_score_count,
        outcome.fetched_at.format("%H:%M:%S UTC"),
    ));
}

fn render_histogram(html: &mut String, bins: &[usize; HISTOGRAM_BINS]) {
    let labels: Vec<String> = (0..HISTOGRAM_BINS)
        .map(|i| {
            let lo = i * 10;
            if i == HISTOGRAM_BINS - 1 {
                format!("{lo}-100")
            } else {
                format!("{lo}-{}", lo + 9)
            }
        })
        .collect();
    let rows: Vec<(&str, usize)> = labels
        .iter()
        .map(String::as_str)
        .zip(bins.iter().copied())
        .filter(|(_, n)| *n > 0)
        .collect();
    render_bars(html, "Growth Score Distribution", &rows);
}

fn render_distribution(html: &mut String, title: &str, counts: &BTreeMap<String, usize>) {
    let mut rows: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    render_bars(html, title, &rows);
}

fn render_bars(html: &mut String, title: &str, rows: &[(&str, usize)]) {
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    html.push_str(&format!("<div><h3>{}</h3>", text(title)));
    for (label, n) in rows {
        let pct = n * 100 / max;
        html.push_str(&format!(
            r#"<div class="bar-row"><span class="bar-label" title="{}">{}</span><div class="bar" style="width:{pct}%"></div><span>{n}</span></div>"#,
            attr(label),
            text(label)
        ));
    }
    html.push_str("</div>");
}

fn render_card(html: &mut String, s: &StartupSignal) {
    html.push_str(&format!(
        r#"<div class="card"><div>
<h3>{}</h3>
<p><strong>Description:</strong> {}</p>
<p><strong>Growth Reason:</strong> {}</p>
<p><strong>Sector:</strong> {} | <strong>Stage:</strong> {} | <strong>Signal:</strong> {}</p>
<p><strong>Source:</strong> {}</p>
</div><div class="score score-{}">{}<div style="font-size:.8rem;font-weight:normal">Growth Score</div></div></div>"#,
        text(&s.name),
        text(&s.description),
        text(&s.growth_reason),
        text(&s.sector),
        text(&s.funding_stage),
        text(&s.signal_type),
        source_link(&s.source_link),
        s.tier().as_str(),
        s.score,
    ));
}

/// Only http(s) links become anchors; anything else is shown as text.
fn source_link(link: &str) -> String {
    let lower = link.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            attr(link.trim()),
            text(link.trim())
        )
    } else {
        text(link).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use signalminer_core::domain::signal::SignalDraft;
    use signalminer_core::fallback::fallback_signals;
    use signalminer_core::fetcher::SignalSource;

    fn outcome(signals: Vec<StartupSignal>) -> FetchOutcome {
        FetchOutcome {
            signals,
            source: SignalSource::Live,
            fetched_at: Utc::now(),
        }
    }

    fn render_all(outcome: &FetchOutcome, filter: &SignalFilter) -> String {
        let facets = Facets::of(&outcome.signals);
        let filtered = filter.apply(&outcome.signals);
        let summary = Summary::of(&filtered);
        render(&Page {
            outcome,
            filter,
            facets: &facets,
            filtered: &filtered,
            summary: &summary,
        })
    }

    #[test]
    fn escapes_model_supplied_text() {
        let signal = SignalDraft {
            name: "<script>alert(1)</script>".to_string(),
            description: "a & b".to_string(),
            growth_reason: "r".to_string(),
            source_link: "javascript:alert(1)".to_string(),
            sector: "AI\" onmouseover=\"x".to_string(),
            funding_stage: "Seed".to_string(),
            signal_type: "News".to_string(),
        }
        .into_scored(Utc::now());

        let html = render_all(&outcome(vec![signal]), &SignalFilter::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains(r#"href="javascript"#));
        assert!(!html.contains(r#"value="AI" onmouseover"#));
        assert!(html.contains("AI&quot; onmouseover=&quot;x"));
    }

    #[test]
    fn live_outcome_has_no_notice_and_marks_selection() {
        let filter = SignalFilter {
            sector: Some("Fintech".to_string()),
            ..Default::default()
        };
        let html = render_all(&outcome(fallback_signals(Utc::now())), &filter);
        assert!(!html.contains(r#"<div class="notice">"#));
        assert!(html.contains(r#"<option value="Fintech" selected>"#));
        assert!(html.contains("FinFlow Analytics"));
        assert!(!html.contains("CloudSync Pro</h3>"));
    }

    #[test]
    fn empty_result_shows_message_and_no_charts() {
        let filter = SignalFilter {
            min_score: 101,
            ..Default::default()
        };
        let html = render_all(&outcome(fallback_signals(Utc::now())), &filter);
        assert!(html.contains("No startups match the selected filters."));
        assert!(!html.contains(r#"class="charts""#));
    }

    #[test]
    fn score_badge_uses_tier_class() {
        let html = render_all(&outcome(fallback_signals(Utc::now())), &SignalFilter::default());
        assert!(html.contains(r#"score score-high">80"#));
        assert!(html.contains("score-medium"));
    }
}
