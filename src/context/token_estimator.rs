//! Token estimation heuristics

use super::models::ConversationState;

/// Token estimator trait for different tokenization strategies
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in the given text
    fn estimate(&self, text: &str) -> usize;

    /// Sum of `estimate` over every turn in the unsummarized history.
    /// The summary is not counted.
    fn estimate_conversation(&self, state: &ConversationState) -> usize {
        state
            .history()
            .iter()
            .map(|turn| self.estimate(turn.content()))
            .sum()
    }
}

/// Strip leading and trailing characters at or below U+0020.
/// Non-ASCII spaces such as NBSP are kept.
pub(crate) fn trim_control(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

fn is_word_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Counts whitespace-delimited words, one token per word.
///
/// Deliberately crude: reported counts and the compaction trigger depend on
/// exactly this rule, so it must not be swapped for a real tokenizer.
/// Only ASCII whitespace separates words; NBSP or U+3000 do not.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceEstimator;

impl TokenEstimator for WhitespaceEstimator {
    fn estimate(&self, text: &str) -> usize {
        trim_control(text)
            .split(is_word_separator)
            .filter(|word| !word.is_empty())
            .count()
    }
}
