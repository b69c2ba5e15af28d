//! Extracts structured actions from numbered policy text.
//!
//! Extracted PDF text is noisy: bullets come through as odd glyphs, line
//! breaks fall mid-sentence and section headers run into the list. The
//! parser normalises first, then walks a token stream of numbered markers
//! and text runs, cutting an action at every marker.

use policyrag_core::types::Action;

use crate::text::{
    after_recommended_marker, normalize_whitespace, numbered_marker_at, replace_bullets, ELIGIBILITY_MARKER,
};

const TITLE_MIN_CHARS: usize = 10;
const TITLE_FALLBACK_WORDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// `"<digit>. "`; the digit itself carries no meaning.
    Marker,
    Text(&'a str),
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut run_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match numbered_marker_at(bytes, i, &(0..=9), false) {
            Some(len) => {
                if run_start < i {
                    tokens.push(Token::Text(&text[run_start..i]));
                }
                tokens.push(Token::Marker);
                i += len;
                run_start = i;
            }
            None => i += 1,
        }
    }
    if run_start < bytes.len() {
        tokens.push(Token::Text(&text[run_start..]));
    }
    tokens
}

/// Normalised form of `raw` the tokenizer runs over.
pub fn clean_policy_text(raw: &str) -> String {
    let text = normalize_whitespace(&replace_bullets(raw, "-"));
    after_recommended_marker(&text).to_string()
}

/// Parse `raw` chunk text into actions in document order.
///
/// Text without numbered markers becomes a single action. Segments whose
/// details end up empty are dropped, so the result may be empty.
pub fn parse_actions(raw: &str) -> Vec<Action> {
    let text = clean_policy_text(raw);
    let mut actions = Vec::new();
    let mut buffer = String::new();
    for token in tokenize(&text) {
        match token {
            Token::Text(run) => buffer.push_str(run),
            Token::Marker => flush(&mut buffer, &mut actions),
        }
    }
    flush(&mut buffer, &mut actions);
    actions
}

fn flush(buffer: &mut String, actions: &mut Vec<Action>) {
    if let Some(action) = build_action(buffer.trim()) {
        actions.push(action);
    }
    buffer.clear();
}

fn build_action(segment: &str) -> Option<Action> {
    if segment.is_empty() {
        return None;
    }
    let (details, eligibility) = match segment.split_once(ELIGIBILITY_MARKER) {
        Some((before, after)) => (before.trim_matches(|c| c == ' ' || c == '-'), after.trim()),
        None => (segment, ""),
    };
    let details = details.trim();
    if details.is_empty() {
        return None;
    }
    Some(Action { title: title_for(details), details: details.to_string(), eligibility: eligibility.to_string() })
}

/// Text before the first dash, or the first ten words when that is too
/// short to stand alone.
fn title_for(details: &str) -> String {
    let head = normalize_whitespace(details.split('-').next().unwrap_or(details));
    if head.chars().count() >= TITLE_MIN_CHARS {
        return head;
    }
    details.split_whitespace().take(TITLE_FALLBACK_WORDS).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_separates_markers_from_text() {
        assert_eq!(
            tokenize("1. a b 2. c"),
            vec![Token::Marker, Token::Text("a b "), Token::Marker, Token::Text("c")]
        );
        assert_eq!(tokenize("pay 10.5 now"), vec![Token::Text("pay 10.5 now")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn title_prefers_text_before_dash() {
        assert_eq!(title_for("Offer RET10 discount - limited"), "Offer RET10 discount");
        assert_eq!(title_for("Call - now please do it today or tomorrow"), "Call - now please do it today or tomorrow");
    }

    #[test]
    fn title_falls_back_to_first_ten_words() {
        let details = "Go - one two three four five six seven eight nine ten eleven";
        assert_eq!(title_for(details), "Go - one two three four five six seven eight");
    }
}
