//! Keyword pattern parsing, compilation, and taxonomy normalization.
//!
//! Patterns are authored as lightly-parameterized phrases. Each
//! whitespace-separated token is one of:
//!
//! - a plain token, matched as a word-initial stem (`reduc` matches "reduce",
//!   "reduces", "reducing" — anchored at the preceding word boundary only);
//! - a token suffixed with `\b`, matched as an exact whole word;
//! - `*` (legacy notation `\ \*\ `), matching any single word;
//! - a character followed by `?` makes that character optional.
//!
//! Compiled patterns always match case-insensitively and never start inside a
//! larger word.

use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

use crate::types::PatternError;

/// One token of a parsed keyword pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Exact word, anchored at both boundaries.
    Literal(String),
    /// Word-initial fragment, anchored at the preceding boundary only.
    Stem(String),
    /// Any single run of non-whitespace.
    Wildcard,
}

/// A single compiled keyword pattern of a quality attribute.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    tokens: Vec<PatternToken>,
    stripped: String,
    rank_len: usize,
    regex: Regex,
}

impl Pattern {
    /// Parse and compile an authored pattern string.
    pub fn compile(attribute: &str, raw: &str) -> Result<Self, PatternError> {
        let tokens = parse_tokens(attribute, raw)?;
        let stripped = strip_tokens(&tokens);
        let rank_len = rank_len(raw);
        let regex = build_regex(attribute, raw, &tokens)?;
        Ok(Self {
            raw: raw.to_string(),
            tokens,
            stripped,
            rank_len,
            regex,
        })
    }

    /// The pattern exactly as authored, regex notation included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The pattern with all regex notation removed (human-readable form).
    pub fn stripped(&self) -> &str {
        &self.stripped
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// The keyword string recorded in match output for this pattern.
    pub fn keyword(&self, keep_regex_notation: bool) -> &str {
        if keep_regex_notation {
            &self.raw
        } else {
            &self.stripped
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte span of the first occurrence in `text`, if any.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.regex.find(text).map(|m| (m.start(), m.end()))
    }

    /// Composite ranking: descending word count, descending hyphen count,
    /// descending length of the authored form (word-boundary markers and
    /// optional-char pairs removed, escapes kept), then ascending
    /// alphabetical on the stripped form. Ties beyond that fall back to the
    /// authored form so the order never depends on input order.
    pub fn rank_cmp(&self, other: &Pattern) -> Ordering {
        other
            .tokens
            .len()
            .cmp(&self.tokens.len())
            .then_with(|| {
                let hyphens = |p: &Pattern| p.raw.matches('-').count();
                hyphens(other).cmp(&hyphens(self))
            })
            .then_with(|| other.rank_len.cmp(&self.rank_len))
            .then_with(|| self.stripped.cmp(&other.stripped))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Pattern {}

fn parse_tokens(attribute: &str, raw: &str) -> Result<Vec<PatternToken>, PatternError> {
    // Legacy notation escapes the spaces around a wildcard ("\ \*\ ");
    // un-escape them so whitespace splitting sees plain tokens.
    let unescaped = raw.replace("\\ ", " ");
    let mut tokens = Vec::new();

    for piece in unescaped.split_whitespace() {
        // A leading boundary marker is implicit; every token is anchored at
        // the preceding word boundary anyway.
        let piece = piece.strip_prefix("\\b").unwrap_or(piece);
        if piece == "*" || piece == "\\*" {
            tokens.push(PatternToken::Wildcard);
        } else if let Some(word) = piece.strip_suffix("\\b") {
            let word = clean_word(word);
            if word.is_empty() {
                return Err(PatternError::InvalidPattern {
                    attribute: attribute.to_string(),
                    pattern: raw.to_string(),
                });
            }
            tokens.push(PatternToken::Literal(word));
        } else {
            let word = clean_word(piece);
            if word.is_empty() {
                return Err(PatternError::InvalidPattern {
                    attribute: attribute.to_string(),
                    pattern: raw.to_string(),
                });
            }
            tokens.push(PatternToken::Stem(word));
        }
    }

    if tokens.is_empty() {
        return Err(PatternError::EmptyPattern {
            attribute: attribute.to_string(),
        });
    }
    Ok(tokens)
}

/// Drop the escape backslashes of the legacy notation (e.g. `socket\.io`),
/// keeping `?` optional-char markers for compilation.
fn clean_word(word: &str) -> String {
    word.chars().filter(|&c| c != '\\').collect()
}

/// Plain-text rendering of a token list: optional characters removed,
/// wildcards shown as `*`.
fn strip_tokens(tokens: &[PatternToken]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match token {
            PatternToken::Wildcard => out.push('*'),
            PatternToken::Literal(word) | PatternToken::Stem(word) => {
                out.push_str(&drop_optional_chars(word));
            }
        }
    }
    out
}

/// Ranking length of the authored form: boundary markers and optional-char
/// pairs removed, escape backslashes kept, so `socket\.io` counts 10.
fn rank_len(raw: &str) -> usize {
    drop_optional_chars(&raw.replace("\\b", "")).chars().count()
}

fn drop_optional_chars(word: &str) -> String {
    let mut out = String::new();
    let mut chars = word.chars().peekable();
    while let Some(c) = chars.next() {
        if chars.peek() == Some(&'?') {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Regex body for one word, escaping everything and honoring `?` markers.
fn word_body(word: &str) -> String {
    let mut out = String::new();
    let mut chars = word.chars().peekable();
    while let Some(c) = chars.next() {
        let escaped = regex::escape(&c.to_string());
        if chars.peek() == Some(&'?') {
            chars.next();
            out.push_str(&escaped);
            out.push('?');
        } else {
            out.push_str(&escaped);
        }
    }
    out
}

fn build_regex(
    attribute: &str,
    raw: &str,
    tokens: &[PatternToken],
) -> Result<Regex, PatternError> {
    let mut body = String::from(r"\b");
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            body.push_str(r"\s+");
        }
        match token {
            PatternToken::Wildcard => body.push_str(r"\S+"),
            PatternToken::Stem(word) => {
                body.push_str(&word_body(word));
                body.push_str(r"\w*");
            }
            PatternToken::Literal(word) => {
                body.push_str(&word_body(word));
                body.push_str(r"\b");
            }
        }
    }

    RegexBuilder::new(&body)
        .case_insensitive(true)
        .build()
        .map_err(|e| PatternError::Compile {
            attribute: attribute.to_string(),
            pattern: raw.to_string(),
            source: Box::new(e),
        })
}

/// One named quality attribute with its ranked keyword patterns.
#[derive(Debug, Clone)]
pub struct QualityAttribute {
    name: String,
    patterns: Vec<Pattern>,
}

impl QualityAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

/// A normalized taxonomy: attribute names in insertion order, each mapped to
/// its patterns in ranked order. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    attributes: Vec<QualityAttribute>,
}

impl Taxonomy {
    /// Compile and rank a raw taxonomy. Fails fast on the first pattern that
    /// does not compile; a partially-usable taxonomy would silently produce
    /// incomplete matches downstream.
    pub fn normalize<N, K, I, P>(raw: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (N, K)>,
        N: AsRef<str>,
        K: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut attributes = Vec::new();
        for (name, keywords) in raw {
            let name = name.as_ref();
            let mut patterns = Vec::new();
            for keyword in keywords {
                patterns.push(Pattern::compile(name, keyword.as_ref())?);
            }
            patterns.sort_by(Pattern::rank_cmp);
            attributes.push(QualityAttribute {
                name: name.to_string(),
                patterns,
            });
        }
        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[QualityAttribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Total pattern count across all attributes.
    pub fn pattern_count(&self) -> usize {
        self.attributes.iter().map(|a| a.patterns.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> Pattern {
        Pattern::compile("test", raw).unwrap()
    }

    #[test]
    fn test_plain_token_parses_as_stem() {
        let p = pattern("reduc");
        assert_eq!(p.tokens(), &[PatternToken::Stem("reduc".to_string())]);
        assert_eq!(p.stripped(), "reduc");
    }

    #[test]
    fn test_boundary_suffix_parses_as_literal() {
        let p = pattern("rate\\b limit\\b");
        assert_eq!(
            p.tokens(),
            &[
                PatternToken::Literal("rate".to_string()),
                PatternToken::Literal("limit".to_string()),
            ]
        );
        assert_eq!(p.stripped(), "rate limit");
    }

    #[test]
    fn test_legacy_wildcard_notation() {
        let p = pattern("every\\ \\*\\ minutes");
        assert_eq!(
            p.tokens(),
            &[
                PatternToken::Stem("every".to_string()),
                PatternToken::Wildcard,
                PatternToken::Stem("minutes".to_string()),
            ]
        );
        assert_eq!(p.stripped(), "every * minutes");
        assert!(p.is_match("refresh every 5 minutes"));
        assert!(p.is_match("polls every few minutes"));
        assert!(!p.is_match("every minute"));
    }

    #[test]
    fn test_stem_matches_inflections() {
        let p = pattern("reduc");
        assert!(p.is_match("reducing latency"));
        assert!(p.is_match("we reduce calls"));
        assert!(p.is_match("this Reduces overhead"));
        // Anchored at the preceding word boundary only.
        assert!(!p.is_match("unreduced state"));
    }

    #[test]
    fn test_literal_requires_whole_word() {
        let p = pattern("push\\b");
        assert!(p.is_match("server push works"));
        assert!(!p.is_match("pushed updates"));
    }

    #[test]
    fn test_multi_word_stem_phrase() {
        let p = pattern("reduc network call");
        assert!(p.is_match("We added gzip compression to reduce network calls"));
        assert!(p.is_match("reducing network call volume"));
        assert!(!p.is_match("network call reduction"));
    }

    #[test]
    fn test_word_boundary_phrase_mismatch() {
        let p = pattern("push updates");
        assert!(p.is_match("we added push updates today"));
        assert!(!p.is_match("pushed update scripts"));
    }

    #[test]
    fn test_escaped_dot_is_literal() {
        let p = pattern("socket\\.io");
        assert!(p.is_match("moved to socket.io transport"));
        assert!(!p.is_match("socketXio"));
    }

    #[test]
    fn test_optional_char_marker() {
        let p = pattern("colou?r");
        assert_eq!(p.stripped(), "color");
        assert!(p.is_match("colour palette"));
        assert!(p.is_match("color palette"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let p = pattern("gzip");
        assert!(p.is_match("enabled GZIP for responses"));
        assert!(p.is_match("Gzip everything"));
    }

    #[test]
    fn test_hyphenated_token() {
        let p = pattern("server-sent events");
        assert!(p.is_match("switch to Server-Sent Events"));
        assert!(!p.is_match("server sent events"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let err = Pattern::compile("attr", "").unwrap_err();
        assert!(matches!(err, PatternError::EmptyPattern { .. }));

        let err = Pattern::compile("attr", "   ").unwrap_err();
        assert!(matches!(err, PatternError::EmptyPattern { .. }));
    }

    #[test]
    fn test_fully_anchored_authoring_style() {
        let p = pattern("\\bgzip\\b");
        assert_eq!(p.tokens(), &[PatternToken::Literal("gzip".to_string())]);
        assert_eq!(p.stripped(), "gzip");
        assert!(p.is_match("enable gzip today"));
        assert!(!p.is_match("gzipped payloads"));
    }

    #[test]
    fn test_bare_boundary_token_rejected() {
        let err = Pattern::compile("attr", "\\b").unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { .. }));
    }

    #[test]
    fn test_ranking_multi_word_first() {
        let taxonomy = Taxonomy::normalize(vec![(
            "datatransfer",
            vec!["gzip", "reduc network call", "rate limit", "deflate"],
        )])
        .unwrap();

        let ranked: Vec<&str> = taxonomy.attributes()[0]
            .patterns()
            .iter()
            .map(|p| p.raw())
            .collect();
        assert_eq!(ranked, vec!["reduc network call", "rate limit", "deflate", "gzip"]);
    }

    #[test]
    fn test_ranking_hyphens_break_word_count_ties() {
        let taxonomy =
            Taxonomy::normalize(vec![("opt", vec!["short circuit", "short-circuit operator"])])
                .unwrap();

        let ranked: Vec<&str> = taxonomy.attributes()[0]
            .patterns()
            .iter()
            .map(|p| p.raw())
            .collect();
        // Both have two words; the hyphenated compound sorts first.
        assert_eq!(ranked, vec!["short-circuit operator", "short circuit"]);
    }

    #[test]
    fn test_ranking_length_counts_authored_form() {
        // "socket\.io" is 10 characters authored (the escape counts), so it
        // outranks a 9-character plain word even though both strip to 9.
        let taxonomy = Taxonomy::normalize(vec![("x", vec!["bandwidth", "socket\\.io"])]).unwrap();
        let ranked: Vec<&str> = taxonomy.attributes()[0]
            .patterns()
            .iter()
            .map(|p| p.raw())
            .collect();
        assert_eq!(ranked, vec!["socket\\.io", "bandwidth"]);
    }

    #[test]
    fn test_ranking_alphabetical_tie_break() {
        let taxonomy = Taxonomy::normalize(vec![("x", vec!["cbor", "gzip"])]).unwrap();
        let ranked: Vec<&str> = taxonomy.attributes()[0]
            .patterns()
            .iter()
            .map(|p| p.raw())
            .collect();
        assert_eq!(ranked, vec!["cbor", "gzip"]);
    }

    #[test]
    fn test_ranking_identical_across_notation_modes() {
        // The sort key is computed from the authored form, so the order of
        // stripped keywords must agree with the order of raw keywords.
        let raw = vec![(
            "datatransfer",
            vec!["every\\ \\*\\ minutes", "rate limit", "gzip", "socket\\.io"],
        )];
        let taxonomy = Taxonomy::normalize(raw).unwrap();

        let raw_order: Vec<&str> = taxonomy.attributes()[0]
            .patterns()
            .iter()
            .map(|p| p.raw())
            .collect();
        let stripped_order: Vec<&str> = taxonomy.attributes()[0]
            .patterns()
            .iter()
            .map(|p| p.stripped())
            .collect();

        assert_eq!(
            raw_order,
            vec!["every\\ \\*\\ minutes", "rate limit", "socket\\.io", "gzip"]
        );
        assert_eq!(
            stripped_order,
            vec!["every * minutes", "rate limit", "socket.io", "gzip"]
        );
    }

    #[test]
    fn test_normalization_preserves_attribute_order() {
        let taxonomy = Taxonomy::normalize(vec![
            ("datatransfer", vec!["gzip"]),
            ("UI", vec!["lazy load image"]),
            ("code_optimization", vec!["memoize"]),
        ])
        .unwrap();

        let names: Vec<&str> = taxonomy.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["datatransfer", "UI", "code_optimization"]);
        assert_eq!(taxonomy.len(), 3);
        assert_eq!(taxonomy.pattern_count(), 3);
    }

    #[test]
    fn test_normalization_fails_fast_on_bad_pattern() {
        let result = Taxonomy::normalize(vec![("good", vec!["gzip"]), ("bad", vec!["\\b"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_keyword_form_follows_notation_flag() {
        let p = pattern("every\\ \\*\\ minutes");
        assert_eq!(p.keyword(true), "every\\ \\*\\ minutes");
        assert_eq!(p.keyword(false), "every * minutes");
    }
}
