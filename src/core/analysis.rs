use crate::domain::model::Analysis;
use regex::Regex;
use std::sync::OnceLock;

const SUMMARY_MARKER: &str = "Summary:";
const QUESTIONS_MARKER: &str = "Top Community Questions:";

/// Removed from published summaries verbatim.
const REDACTED_SENTENCE: &str =
    "ome users are threatening to report the project to regulatory authorities.";

fn bullet_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-•]\s*").expect("static regex"))
}

/// Splits Telegram's free-text `ai_analysis` into a summary and question list.
pub fn parse_analysis(text: &str) -> Analysis {
    let summary = text
        .find(SUMMARY_MARKER)
        .map(|start| {
            let rest = &text[start + SUMMARY_MARKER.len()..];
            let end = rest.find(QUESTIONS_MARKER).unwrap_or(rest.len());
            rest[..end]
                .trim()
                .replacen(REDACTED_SENTENCE, "", 1)
                .trim()
                .to_string()
        })
        .unwrap_or_default();

    let questions = text
        .find(QUESTIONS_MARKER)
        .map(|start| {
            text[start + QUESTIONS_MARKER.len()..]
                .trim_start()
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| bullet_prefix().replace(line, "").into_owned())
                .collect()
        })
        .unwrap_or_default();

    Analysis { summary, questions }
}
