//! Conversation history as plain text
//!
//! History is a sequence of `Speaker: utterance` lines. Both operations
//! return new strings; callers keep whole snapshots rather than mutating.

pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Keep only the trailing `max_chars` characters
///
/// Counts Unicode scalar values, so the cut never lands inside a multi-byte
/// sequence. No attempt is made to cut on a word or turn boundary.
pub fn truncate(history: &str, max_chars: usize) -> String {
    let len = history.chars().count();
    if len <= max_chars {
        return history.to_string();
    }

    history.chars().skip(len - max_chars).collect()
}

/// Append one labeled line
pub fn append(history: &str, speaker: &str, utterance: &str) -> String {
    if history.is_empty() {
        format!("{}: {}", speaker, utterance)
    } else {
        format!("{}\n{}: {}", history, speaker, utterance)
    }
}
