//! Question classification codes
//!
//! A code is a fixed-width positional string: grade, subject, chapter,
//! difficulty level, lesson, and an optional form suffix after a separator
//! (`2P1N1` or `2P1N1-1`). The positions form a tree path, not independent
//! facets. Parsing is all-or-nothing: an unrecognized level character makes
//! the whole code unparseable rather than producing a partial object.

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::constants::{CANONICAL_LEVELS, CODE_FORM_SEPARATOR, LEVEL_ALIASES};

/// Compact (5-char) vs extended (5 + separator + form) code shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeFormat {
    Short,
    Extended,
}

/// Parsed classification code. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCode {
    /// Compact string form with the level already canonicalized.
    pub code: String,
    pub format: CodeFormat,
    pub grade: char,
    pub subject: char,
    pub chapter: char,
    /// Canonical difficulty level, one of {N, H, V, C, T, M}.
    pub level: char,
    pub lesson: char,
    pub form: Option<char>,
}

impl QuestionCode {
    /// Parse a code string, with or without surrounding brackets.
    ///
    /// Returns `None` for any shape violation or unrecognized level
    /// character; no partial object is ever produced.
    pub fn from_code_string(s: &str) -> Option<QuestionCode> {
        let trimmed = s
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim();

        let (main, form) = match trimmed.split_once(CODE_FORM_SEPARATOR) {
            Some((main, suffix)) => {
                let mut suffix_chars = suffix.chars();
                let form = suffix_chars.next()?;
                if suffix_chars.next().is_some() {
                    return None;
                }
                (main, Some(form))
            }
            None => (trimmed, None),
        };

        let chars: Vec<char> = main.chars().collect();
        if chars.len() != 5 {
            return None;
        }

        let raw_level = chars[3];
        let level = canonicalize_level(raw_level)?;

        let format = if form.is_some() {
            CodeFormat::Extended
        } else {
            CodeFormat::Short
        };

        let mut code: String = [chars[0], chars[1], chars[2], level, chars[4]]
            .iter()
            .collect();
        if let Some(f) = form {
            code.push(CODE_FORM_SEPARATOR);
            code.push(f);
        }

        Some(QuestionCode {
            code,
            format,
            grade: chars[0],
            subject: chars[1],
            chapter: chars[2],
            level,
            lesson: chars[4],
            form,
        })
    }

    /// Consistency check for already-constructed codes: format/form
    /// agreement and a canonical level.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match (self.format, self.form) {
            (CodeFormat::Extended, None) => {
                errors.push("extended format requires a form character".to_string());
            }
            (CodeFormat::Short, Some(_)) => {
                errors.push("short format must not carry a form character".to_string());
            }
            _ => {}
        }
        if !CANONICAL_LEVELS.contains(&self.level) {
            errors.push(format!("level '{}' is not canonical", self.level));
        }
        errors
    }

    /// Main 5-character part without the form suffix.
    pub fn main_part(&self) -> String {
        [self.grade, self.subject, self.chapter, self.level, self.lesson]
            .iter()
            .collect()
    }

    /// Field map keyed by position name, for export layers that want flat
    /// key/value rows rather than the struct.
    pub fn to_map(&self) -> FxHashMap<&'static str, String> {
        let mut map = FxHashMap::default();
        map.insert("code", self.code.clone());
        map.insert("grade", self.grade.to_string());
        map.insert("subject", self.subject.to_string());
        map.insert("chapter", self.chapter.to_string());
        map.insert("level", self.level.to_string());
        map.insert("lesson", self.lesson.to_string());
        if let Some(f) = self.form {
            map.insert("form", f.to_string());
        }
        map
    }
}

/// Map a raw level character to its canonical form, or `None` when it is
/// outside the 10-character recognized set.
pub fn canonicalize_level(raw: char) -> Option<char> {
    if CANONICAL_LEVELS.contains(&raw) {
        return Some(raw);
    }
    LEVEL_ALIASES.get(&raw).copied()
}

lazy_static! {
    /// Code candidates in priority order: a comment-annotated bracketed code
    /// first, then a bare bracketed code.
    static ref CODE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"%\s*\[\s*([0-9A-Za-z]{5}(?:-[0-9A-Za-z])?)\s*\]").unwrap(),
        Regex::new(r"\[\s*([0-9A-Za-z]{5}(?:-[0-9A-Za-z])?)\s*\]").unwrap(),
    ];
}

/// Extracts a question code from free block text.
pub struct QuestionCodeParser;

impl QuestionCodeParser {
    /// Scan the block for bracketed code-shaped candidates, trying each
    /// pattern in priority order and returning the first parseable code.
    pub fn extract_question_code(block: &str) -> Option<QuestionCode> {
        for pattern in CODE_PATTERNS.iter() {
            for caps in pattern.captures_iter(block) {
                if let Some(code) = QuestionCode::from_code_string(&caps[1]) {
                    return Some(code);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_code() {
        let code = QuestionCode::from_code_string("2P1N1").unwrap();
        assert_eq!(code.format, CodeFormat::Short);
        assert_eq!(code.grade, '2');
        assert_eq!(code.subject, 'P');
        assert_eq!(code.chapter, '1');
        assert_eq!(code.level, 'N');
        assert_eq!(code.lesson, '1');
        assert_eq!(code.form, None);
        assert!(code.validate().is_empty());
    }

    #[test]
    fn test_extended_code() {
        let code = QuestionCode::from_code_string("2P1N1-3").unwrap();
        assert_eq!(code.format, CodeFormat::Extended);
        assert_eq!(code.form, Some('3'));
        assert_eq!(code.code, "2P1N1-3");
    }

    #[test]
    fn test_bracketed_input() {
        let code = QuestionCode::from_code_string("[2P1N1]").unwrap();
        assert_eq!(code.code, "2P1N1");
    }

    #[test]
    fn test_alias_level_maps_to_canonical() {
        for (alias, canonical) in [('Y', 'N'), ('B', 'H'), ('K', 'V'), ('G', 'C')] {
            let aliased = format!("2P1{}1", alias);
            let direct = format!("2P1{}1", canonical);
            let a = QuestionCode::from_code_string(&aliased).unwrap();
            let d = QuestionCode::from_code_string(&direct).unwrap();
            assert_eq!(a.level, d.level);
            assert_eq!(a.code, d.code);
        }
    }

    #[test]
    fn test_invalid_level_rejects_whole_code() {
        assert_eq!(QuestionCode::from_code_string("2P1X1"), None);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(QuestionCode::from_code_string("2P1N"), None);
        assert_eq!(QuestionCode::from_code_string("2P1N12"), None);
        assert_eq!(QuestionCode::from_code_string("2P1N1-12"), None);
        assert_eq!(QuestionCode::from_code_string(""), None);
    }

    #[test]
    fn test_to_map_fields() {
        let map = QuestionCode::from_code_string("2P1N1-3").unwrap().to_map();
        assert_eq!(map.get("code").map(String::as_str), Some("2P1N1-3"));
        assert_eq!(map.get("level").map(String::as_str), Some("N"));
        assert_eq!(map.get("form").map(String::as_str), Some("3"));

        let short = QuestionCode::from_code_string("2P1N1").unwrap().to_map();
        assert!(!short.contains_key("form"));
    }

    #[test]
    fn test_serde_round_trip() {
        let code = QuestionCode::from_code_string("2P1B1-A").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        let back: QuestionCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }

    #[test]
    fn test_extract_prefers_comment_annotated_candidate() {
        let block = "[1L1V2]\n%[2P1N1]\n\\begin{ex}...\\end{ex}";
        let code = QuestionCodeParser::extract_question_code(block).unwrap();
        assert_eq!(code.code, "2P1N1");
    }

    #[test]
    fn test_extract_falls_back_to_bare_brackets() {
        let block = "[1L1V2] question text";
        let code = QuestionCodeParser::extract_question_code(block).unwrap();
        assert_eq!(code.code, "1L1V2");
    }

    #[test]
    fn test_extract_skips_unparseable_candidates() {
        // First candidate has a bad level; the second parses.
        let block = "%[2P1X1] %[2P1H1]";
        let code = QuestionCodeParser::extract_question_code(block).unwrap();
        assert_eq!(code.code, "2P1H1");
    }

    #[test]
    fn test_extract_none_when_nothing_matches() {
        assert!(QuestionCodeParser::extract_question_code("[TL.123456] plain text").is_none());
    }
}
