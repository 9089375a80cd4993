//! Placeholder records served whenever the live API is unavailable.

use crate::domain::signal::{SignalDraft, StartupSignal};
use chrono::{DateTime, Utc};

// (name, description, growth_reason, source_link, sector, funding_stage, signal_type)
const FALLBACK_ROWS: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    (
        "TechFlow Analytics",
        "AI-powered business intelligence platform for SMBs",
        "Recent Series A funding of $5M, growing customer base",
        "https://techcrunch.com/techflow-analytics",
        "Business Intelligence",
        "Series A",
        "Funding",
    ),
    (
        "CloudSync Pro",
        "Enterprise-grade file synchronization solution",
        "Major partnership with Microsoft, expanding team",
        "https://venturebeat.com/cloudsync-pro",
        "Cloud Computing",
        "Seed",
        "Partnership",
    ),
    (
        "DataVault Security",
        "Zero-trust cybersecurity platform for enterprises",
        "Increased demand post-cyber attacks, new product launch",
        "https://techcrunch.com/datavault-security",
        "Cybersecurity",
        "Early Stage",
        "Market Demand",
    ),
    (
        "GreenTech Solutions",
        "Sustainability tracking software for manufacturing",
        "Regulatory compliance requirements, ESG focus",
        "https://greenbiz.com/greentech-solutions",
        "Sustainability",
        "Seed",
        "Regulatory",
    ),
    (
        "HealthAI Connect",
        "AI-powered patient care coordination platform",
        "Healthcare digitization trends, pilot with major hospital",
        "https://healthcareitnews.com/healthai-connect",
        "Healthcare",
        "Series A",
        "Industry Trend",
    ),
    (
        "EduTech Pro",
        "Personalized learning platform for K-12 education",
        "Remote learning adoption, government contracts",
        "https://edtechmagazine.com/edutech-pro",
        "Education",
        "Early Stage",
        "Government",
    ),
    (
        "FinFlow Analytics",
        "Real-time financial data analysis for traders",
        "Market volatility, institutional interest",
        "https://fintechnews.com/finflow-analytics",
        "Fintech",
        "Seed",
        "Market Opportunity",
    ),
    (
        "LogiChain Pro",
        "Supply chain optimization using blockchain",
        "Global supply chain disruptions, Fortune 500 pilots",
        "https://supplychaindive.com/logichain-pro",
        "Logistics",
        "Series A",
        "Market Disruption",
    ),
    (
        "RetailAI Insights",
        "AI-powered retail analytics and customer insights",
        "E-commerce growth, major retail partnerships",
        "https://retailwire.com/retailai-insights",
        "Retail",
        "Early Stage",
        "Partnership",
    ),
    (
        "EnergyGrid Optimizer",
        "Smart grid management and energy optimization",
        "Renewable energy transition, government incentives",
        "https://energynews.com/energygrid-optimizer",
        "Energy",
        "Seed",
        "Policy",
    ),
];

pub fn fallback_drafts() -> Vec<SignalDraft> {
    FALLBACK_ROWS
        .iter()
        .map(
            |&(name, description, growth_reason, source_link, sector, funding_stage, signal_type)| {
                SignalDraft {
                    name: name.to_string(),
                    description: description.to_string(),
                    growth_reason: growth_reason.to_string(),
                    source_link: source_link.to_string(),
                    sector: sector.to_string(),
                    funding_stage: funding_stage.to_string(),
                    signal_type: signal_type.to_string(),
                }
            },
        )
        .collect()
}

/// The fallback list, scored and ranked.
pub fn fallback_signals(fetched_at: DateTime<Utc>) -> Vec<StartupSignal> {
    let mut out: Vec<StartupSignal> = fallback_drafts()
        .into_iter()
        .map(|d| d.into_scored(fetched_at))
        .collect();
    crate::scoring::rank(&mut out);
    out
}
