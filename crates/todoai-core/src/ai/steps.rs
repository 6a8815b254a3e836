//! Splitting a model reply into task lines

use regex::Regex;
use std::sync::OnceLock;

static MARKER: OnceLock<Regex> = OnceLock::new();

/// Leading list marker: digits, dashes, dots or asterisks, then optional spaces
fn marker() -> &'static Regex {
    MARKER.get_or_init(|| Regex::new(r"^[0-9\-.*]+\s*").unwrap())
}

/// Remove one leading list marker and trim. Markers inside the line are kept.
pub fn strip_marker(line: &str) -> String {
    marker().replace(line, "").trim().to_string()
}

/// Break a reply into ordered, non-empty task lines.
///
/// When every line strips down to nothing (a reply of pure punctuation, say)
/// the trimmed reply is returned whole rather than an empty list.
pub fn split_steps(content: &str) -> Vec<String> {
    let content = content.trim();

    let steps: Vec<String> = content
        .split('\n')
        .map(strip_marker)
        .filter(|step| !step.is_empty())
        .collect();

    if steps.is_empty() {
        return vec![content.to_string()];
    }

    steps
}
