use crate::domain::contract::LlmStartupSignal;
use crate::domain::signal::SignalDraft;
use anyhow::Context;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Removes a surrounding Markdown fence (```json ... ``` or ``` ... ```).
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let mut inner = trimmed;
    if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
        inner = after_first;
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

/// Finds the first JSON array in `text` that holds at least one object.
///
/// Each `[` is tried as a start position and only one complete value is read
/// from it, so prose or citation markers (`[1]`) around the array are ignored.
/// Returns `Ok(None)` when the text has no array of objects at all, and an
/// error when one is present but does not decode.
pub fn extract_json_array(text: &str) -> anyhow::Result<Option<Vec<Value>>> {
    let body = strip_fences(text);
    let mut broken = None;
    for (start, _) in body.match_indices('[') {
        let candidate = &body[start..];
        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Vec<Value>>();
        match stream.next() {
            Some(Ok(values)) if values.iter().any(Value::is_object) => return Ok(Some(values)),
            Some(Err(err)) if opens_object_array(candidate) && broken.is_none() => {
                broken = Some(err);
            }
            _ => {}
        }
    }

    match broken {
        Some(err) => Err(anyhow::Error::new(err).context("JSON array of startups does not decode")),
        None => Ok(None),
    }
}

fn opens_object_array(candidate: &str) -> bool {
    candidate[1..].trim_start().starts_with('{')
}

/// Parses model output into unscored drafts.
///
/// A JSON array of objects is preferred, and one that fails to decode is an
/// error. Only text with no such array is read as a list with `Name:` /
/// `Description:` / `Reason:` / `Source:` lines. Output that yields no records
/// at all is an error.
pub fn parse_drafts(text: &str) -> anyhow::Result<Vec<SignalDraft>> {
    let drafts = match extract_json_array(text)
        .with_context(|| format!("malformed LLM output: {}", preview(text)))?
    {
        Some(values) => drafts_from_values(values),
        None => parse_structured_text(text),
    };

    anyhow::ensure!(
        !drafts.is_empty(),
        "LLM output contains no startup records: {}",
        preview(text)
    );
    Ok(drafts)
}

fn drafts_from_values(values: Vec<Value>) -> Vec<SignalDraft> {
    let mut out = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        if !value.is_object() {
            tracing::debug!(idx, "skipping non-object array element");
            continue;
        }
        match serde_json::from_value::<LlmStartupSignal>(value) {
            Ok(parsed) => out.push(parsed.into_draft()),
            Err(err) => tracing::debug!(idx, error = %err, "skipping undecodable startup object"),
        }
    }
    out
}

fn field_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^[\s\d.)•*\-]*(name|description|growth reason|reason|source link|source)\s*\**\s*:\s*\**\s*(.+?)\s*$",
        )
        .expect("field line regex is valid")
    })
}

/// Fallback reader for list-style answers. A `Name:` line starts a new record.
pub fn parse_structured_text(text: &str) -> Vec<SignalDraft> {
    let mut out = Vec::new();
    let mut current: Option<LlmStartupSignal> = None;

    for line in text.lines() {
        let Some(caps) = field_line().captures(line) else {
            continue;
        };
        let key = caps[1].to_lowercase();
        let value = clean_value(&caps[2]);
        if value.is_empty() {
            continue;
        }

        if key == "name" {
            if let Some(done) = current.take() {
                out.push(done.into_draft());
            }
            current = Some(LlmStartupSignal {
                name: Some(value),
                ..Default::default()
            });
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };
        match key.as_str() {
            "description" => entry.description = Some(value),
            "reason" | "growth reason" => entry.growth_reason = Some(value),
            _ => entry.source_link = Some(value),
        }
    }

    if let Some(done) = current.take() {
        out.push(done.into_draft());
    }
    out
}

fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '*' || c == '"' || c == '`')
        .trim()
        .to_string()
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_SECTOR};

    const VALID: &str = r#"[
        {"name": "Acme", "description": "d", "growth_reason": "r",
         "source_link": "https://acme.test", "sector": "AI/ML",
         "funding_stage": "Series A", "signal_type": "Funding", "score": 3},
        {"name": "Beta"}
    ]"#;

    #[test]
    fn strip_fences_handles_fenced_blocks() {
        let fenced = format!("```json\n{VALID}\n```\n");
        assert_eq!(strip_fences(&fenced), VALID.trim());
    }

    #[test]
    fn parses_plain_array() {
        let drafts = parse_drafts(VALID).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].name, "Acme");
        assert_eq!(drafts[0].sector, "AI/ML");
        assert_eq!(drafts[1].sector, DEFAULT_SECTOR);
    }

    #[test]
    fn ignores_surrounding_prose_and_citations() {
        let text = format!("Here are some startups [1]:\n```json\n{VALID}\n```\nSources: [2][3]");
        let drafts = parse_drafts(&text).unwrap();
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn skips_non_object_elements() {
        let drafts = parse_drafts(r#"[1, "x", {"name": "Only"}, null]"#).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "Only");
    }

    #[test]
    fn object_with_wrong_field_types_is_skipped() {
        let drafts = parse_drafts(r#"[{"name": 7}, {"name": "Ok"}]"#).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "Ok");
    }

    #[test]
    fn rejects_truncated_json() {
        let text = "[{\"name\": \"Acme\", \"sector\": \"AI\"";
        assert!(parse_drafts(text).is_err());
    }

    #[test]
    fn broken_array_is_not_read_as_list() {
        let text = "[{\"name\": \"Acme\", \"sector\": \"AI\",}]\nName: Ghost Co\nReason: none";
        assert!(extract_json_array(text).is_err());
        assert!(parse_drafts(text).is_err());
    }

    #[test]
    fn citation_brackets_do_not_block_list_parsing() {
        let text = "Name: Acme Cloud [1]\nReason: Raised a seed round [2]";
        assert!(extract_json_array(text).unwrap().is_none());
        assert_eq!(parse_drafts(text).unwrap()[0].name, "Acme Cloud [1]");
    }

    #[test]
    fn rejects_empty_array_and_prose() {
        assert!(parse_drafts("[]").is_err());
        assert!(parse_drafts("I cannot help with that.").is_err());
    }

    #[test]
    fn reads_list_style_answers() {
        let text = "\
1. **Name:** Acme Cloud
   - Description: Managed queues
   - Growth Reason: Raised a seed round
   - Source: https://news.test/acme
2. Name: Beta Labs
   Reason: Hiring fast";
        let drafts = parse_drafts(text).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].name, "Acme Cloud");
        assert_eq!(drafts[0].description, "Managed queues");
        assert_eq!(drafts[0].growth_reason, "Raised a seed round");
        assert_eq!(drafts[0].source_link, "https://news.test/acme");
        assert_eq!(drafts[1].name, "Beta Labs");
        assert_eq!(drafts[1].growth_reason, "Hiring fast");
        assert_eq!(drafts[1].description, DEFAULT_DESCRIPTION);
        assert_ne!(drafts[1].name, DEFAULT_NAME);
    }

    #[test]
    fn preview_truncates_long_output() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.len(), 203);
    }
}
