// src/utils/text.rs
//
// Title-case normalization for user-entered titles and descriptions.
// Applied once at creation time so rendering and search see a consistent form.

use regex::Regex;
use std::sync::LazyLock;

/// A maximal run of sentence-ending punctuation.
static PUNCT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Normalizes free text into Title Case.
///
/// Leading/trailing whitespace is stripped, internal whitespace runs collapse
/// to a single space, and each word gets an uppercase first character with the
/// remainder lowercased. Empty input comes back empty. Idempotent.
pub fn format_title(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    trimmed
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Normalizes a description sentence by sentence.
///
/// The text is split into alternating sentence and punctuation tokens, where
/// every maximal run of `.`, `!`, `?` is its own token. Each sentence token is
/// title-cased; a punctuation run immediately following a sentence is appended
/// to it without a space. A description with no punctuation is treated as a
/// single sentence. Bare punctuation tokens with no adjacent sentence are
/// emitted alone.
pub fn format_description(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let collapsed = collapse_whitespace(trimmed);

    // Capturing split on punctuation runs.
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut last = 0;
    for m in PUNCT_RUN.find_iter(&collapsed) {
        if m.start() > last {
            tokens.push(Token::Sentence(&collapsed[last..m.start()]));
        }
        tokens.push(Token::Punct(m.as_str()));
        last = m.end();
    }
    if last < collapsed.len() {
        tokens.push(Token::Sentence(&collapsed[last..]));
    }

    let mut segments: Vec<String> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            Token::Punct(p) => {
                segments.push(p.to_string());
                i += 1;
            }
            Token::Sentence(s) => {
                let mut formatted = format_title(s);
                // Punctuation attaches directly to the sentence before it.
                if let Some(Token::Punct(p)) = tokens.get(i + 1) {
                    formatted.push_str(p);
                    i += 2;
                } else {
                    i += 1;
                }
                segments.push(formatted);
            }
        }
    }

    collapse_whitespace(segments.join(" ").trim())
}

#[derive(Clone, Copy)]
enum Token<'a> {
    Sentence(&'a str),
    Punct(&'a str),
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_collapses_whitespace_and_cases_words() {
        assert_eq!(format_title("  hello   WORLD "), "Hello World");
    }

    #[test]
    fn title_empty_is_identity() {
        assert_eq!(format_title(""), "");
        assert_eq!(format_title("   "), "");
    }

    #[test]
    fn title_lowercases_word_tails() {
        assert_eq!(format_title("iNTRO to RUST"), "Intro To Rust");
    }

    #[test]
    fn title_is_idempotent() {
        let samples = [
            "  hello   WORLD ",
            "already Title Case",
            "o'brien's COURSE",
            "one",
            "x",
            "a b c d",
        ];
        for s in samples {
            let once = format_title(s);
            assert_eq!(format_title(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn description_formats_each_sentence() {
        assert_eq!(
            format_description("this is great! really cool."),
            "This Is Great! Really Cool."
        );
    }

    #[test]
    fn description_without_punctuation_is_one_sentence() {
        assert_eq!(
            format_description("one sentence with no punctuation"),
            "One Sentence With No Punctuation"
        );
    }

    #[test]
    fn description_keeps_punctuation_runs_together() {
        assert_eq!(format_description("wait what?! no way."), "Wait What?! No Way.");
    }

    #[test]
    fn description_emits_leading_punctuation_alone() {
        assert_eq!(format_description("...and then some"), "... And Then Some");
    }

    #[test]
    fn description_empty_is_identity() {
        assert_eq!(format_description(""), "");
    }

    #[test]
    fn description_collapses_spaces_between_sentences() {
        assert_eq!(
            format_description("first  sentence.   second   one!"),
            "First Sentence. Second One!"
        );
    }
}
