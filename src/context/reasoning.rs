//! Removal of model reasoning spans such as `<think>...</think>`

use super::token_estimator::trim_control;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

pub const DEFAULT_OPEN_TAG: &str = "<think>";
pub const DEFAULT_CLOSE_TAG: &str = "</think>";

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    build_pattern(DEFAULT_OPEN_TAG, DEFAULT_CLOSE_TAG).expect("default reasoning pattern is valid")
});

fn build_pattern(open: &str, close: &str) -> Result<Regex, regex::Error> {
    // (?s): spans may cross lines; `.*?` pairs each opener with the nearest closer
    Regex::new(&format!("(?s){}.*?{}", regex::escape(open), regex::escape(close)))
}

/// Strips delimited reasoning spans from model output
#[derive(Debug, Clone)]
pub struct ReasoningStripper {
    pattern: Regex,
}

impl Default for ReasoningStripper {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl ReasoningStripper {
    /// Create a stripper for a custom marker pair
    pub fn new(open: &str, close: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: build_pattern(open, close)?,
        })
    }

    /// Remove every marked span, then trim ASCII whitespace and control
    /// characters. Absent input stays absent.
    pub fn strip(&self, text: Option<&str>) -> Option<String> {
        let text = text?;
        let cleaned = trim_control(&self.pattern.replace_all(text, "")).to_string();
        trace!("strip reasoning - before: [{}] after: [{}]", text, cleaned);
        Some(cleaned)
    }
}
