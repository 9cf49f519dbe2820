//! Content cleaning pipeline
//!
//! Transforms a raw question block into clean display text through a fixed
//! sequence of pure text transforms. Order is significant: answer removal
//! must run before whitespace normalization or dangling braces leak through,
//! and metadata/image stripping must run before the truncation search.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::scanner;
use crate::data::constants::{
    ANSWER_COMMANDS, IMAGE_ENVIRONMENTS, NEWLINE_ESCAPE, PROTECTED_MATH_MACROS, QUESTION_ENV,
    SOLUTION_COMMAND,
};

lazy_static! {
    /// Comment-line code annotation, e.g. `%[2P1N1]` or `%[2P1N1-1]`.
    static ref RE_CODE_ANNOTATION: Regex =
        Regex::new(r"%\s*\[\s*[0-9A-Za-z]{5}(?:-[0-9A-Za-z])?\s*\]").unwrap();
    /// Source attribution comment, e.g. `%[Nguồn: "Đề thi thử 2023"]`.
    static ref RE_SOURCE_ANNOTATION: Regex =
        Regex::new(r#"%\s*\[\s*Nguồn[^\]]*\]"#).unwrap();
    /// Bracketed secondary identifier, e.g. `[TL.123456]`. The uppercase
    /// prefix is part of the shape; dotted tokens like `[0.5]` or `[fig.1]`
    /// are question text and must survive cleaning.
    static ref RE_SUBCOUNT_ANNOTATION: Regex =
        Regex::new(r"\[\s*[A-Z]{2,3}\.[0-9]+\s*\]").unwrap();
    /// Graphics inclusion with optional parameters.
    static ref RE_INCLUDEGRAPHICS: Regex =
        Regex::new(r"\\includegraphics\s*(?:\[[^\]]*\])?\s*\{[^{}]*\}").unwrap();
    /// Side-by-side image wrapper token; its brace groups stay in the text
    /// (the image half is already gone with the tikzpicture removal).
    static ref RE_IMMINI: Regex = Regex::new(r"\\immini\s*(?:\[[^\]]*\])?").unwrap();
    static ref RE_SPACE_RUNS: Regex = Regex::new(r"[ \t]+").unwrap();
}

/// Step 1: the text strictly inside the outer `ex` environment, or `None`
/// when the block carries no such environment (unparseable).
pub fn extract_environment_body(block: &str) -> Option<String> {
    let spans = scanner::extract_environment_spans(block, QUESTION_ENV);
    let (start, end) = spans.first().copied()?;
    let begin_marker = format!("\\begin{{{}}}", QUESTION_ENV);
    let end_marker = format!("\\end{{{}}}", QUESTION_ENV);
    let inner = &block[start + begin_marker.len()..end - end_marker.len()];
    Some(inner.to_string())
}

/// Step 2: remove comment-line metadata (code, source, subcount). These are
/// structurally comments and never question text.
pub fn strip_metadata(text: &str) -> String {
    let out = RE_CODE_ANNOTATION.replace_all(text, "");
    let out = RE_SOURCE_ANNOTATION.replace_all(&out, "");
    RE_SUBCOUNT_ANNOTATION.replace_all(&out, "").into_owned()
}

/// Step 3: remove image/graphics constructs in their entirety. Environment
/// bodies are multi-line; removal is span-based through the scanner rather
/// than a line-oriented regex.
pub fn remove_images(text: &str) -> String {
    let mut out = text.to_string();
    for env in IMAGE_ENVIRONMENTS {
        loop {
            let spans = scanner::extract_environment_spans(&out, env);
            let Some((start, end)) = spans.first().copied() else {
                break;
            };
            out.replace_range(start..end, "");
        }
    }
    let out = RE_INCLUDEGRAPHICS.replace_all(&out, "");
    RE_IMMINI.replace_all(&out, "").into_owned()
}

/// Step 4: truncate at the earliest answer-introducing command. Everything
/// from there to the solution marker is answer material. Known math macros
/// are swapped for placeholders first so the truncation search cannot
/// misfire on brace groups that belong to legitimate math, then restored in
/// the surviving prefix.
pub fn remove_answer_section(text: &str) -> String {
    let (protected, stash) = protect_math_macros(text);

    let cut = ANSWER_COMMANDS
        .iter()
        .filter_map(|cmd| scanner::find_command(&protected, cmd))
        .min();

    let kept = match cut {
        Some(pos) => protected[..pos].to_string(),
        None => protected,
    };
    restore_math_macros(&kept, &stash)
}

/// Step 5: excise every solution command together with its balanced brace
/// argument.
pub fn remove_solution(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(pos) = scanner::find_command(&out, SOLUTION_COMMAND) {
        let after_name = pos + 1 + SOLUTION_COMMAND.len();
        let bytes = out.as_bytes();
        let brace = scanner::skip_whitespace(bytes, after_name);
        let end = if brace < bytes.len() && bytes[brace] == b'{' {
            match scanner::find_matching_brace(&out, brace) {
                Some(close) => close + 1,
                None => out.len(),
            }
        } else {
            after_name
        };
        out.replace_range(pos..end, "");
    }
    out
}

/// Step 6: collapse space runs, convert real line breaks to the literal
/// escape sequence, and trim. Idempotent on already-normalized text.
pub fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = RE_SPACE_RUNS.replace_all(&unified, " ");
    collapsed
        .trim()
        .replace('\n', NEWLINE_ESCAPE)
        .trim()
        .to_string()
}

/// Run the full ordered pipeline on a raw block. Returns the raw environment
/// body and the cleaned display text, or `None` when no `ex` environment is
/// present.
pub fn clean_block(block: &str) -> Option<(String, String)> {
    let raw_body = extract_environment_body(block)?;
    let text = strip_metadata(&raw_body);
    let text = remove_images(&text);
    let text = remove_answer_section(&text);
    let text = remove_solution(&text);
    let clean = normalize_whitespace(&text);
    Some((raw_body, clean))
}

/// Flat-storage mode: real line breaks become the literal escape sequence.
/// Display layers reverse this before rendering.
pub fn escape_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', NEWLINE_ESCAPE)
}

/// CSV-safe mode: the escape sequence and residual whitespace runs collapse
/// to single spaces. Not interchangeable with [`escape_newlines`].
pub fn flatten_whitespace(text: &str) -> String {
    let spaced = text.replace(NEWLINE_ESCAPE, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn protect_math_macros(text: &str) -> (String, Vec<String>) {
    let mut out = text.to_string();
    let mut stash: Vec<String> = Vec::new();

    for macro_name in PROTECTED_MATH_MACROS {
        let mut search_from = 0usize;
        loop {
            let Some(pos) = scanner::find_command_from(&out, macro_name, search_from) else {
                break;
            };
            let mut end = pos + 1 + macro_name.len();
            // Consume every brace group attached to the macro.
            loop {
                let next = scanner::skip_whitespace(out.as_bytes(), end);
                if next < out.len() && out.as_bytes()[next] == b'{' {
                    match scanner::find_matching_brace(&out, next) {
                        Some(close) => end = close + 1,
                        None => {
                            end = out.len();
                            break;
                        }
                    }
                } else {
                    break;
                }
            }
            let placeholder = format!("\u{1}MATH{}\u{1}", stash.len());
            stash.push(out[pos..end].to_string());
            out.replace_range(pos..end, &placeholder);
            search_from = pos + placeholder.len();
        }
    }
    (out, stash)
}

fn restore_math_macros(text: &str, stash: &[String]) -> String {
    let mut out = text.to_string();
    for (idx, original) in stash.iter().enumerate() {
        let placeholder = format!("\u{1}MATH{}\u{1}", idx);
        out = out.replace(&placeholder, original);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_environment_body() {
        let block = "\\begin{ex}stem text\\end{ex}";
        assert_eq!(extract_environment_body(block).unwrap(), "stem text");
        assert_eq!(extract_environment_body("no environment here"), None);
    }

    #[test]
    fn test_strip_metadata() {
        let text = "%[2P1N1]\n%[Nguồn: \"Đề thi 2023\"]\n[TL.123456] The stem";
        let out = strip_metadata(text);
        assert!(!out.contains("2P1N1"));
        assert!(!out.contains("Nguồn"));
        assert!(!out.contains("TL.123456"));
        assert!(out.contains("The stem"));
    }

    #[test]
    fn test_strip_metadata_keeps_dotted_stem_tokens() {
        let text = "Pick $x$ in $[0.5]$ near [fig.1], see [TL.123456]";
        let out = strip_metadata(text);
        assert!(out.contains("[0.5]"));
        assert!(out.contains("[fig.1]"));
        assert!(!out.contains("TL.123456"));
    }

    #[test]
    fn test_remove_images_environments_and_commands() {
        let text = "stem\n\\begin{center}\n\\begin{tikzpicture}draw\\end{tikzpicture}\n\\end{center}\n\\includegraphics[width=3cm]{fig1}\ntail";
        let out = remove_images(text);
        assert!(!out.contains("tikzpicture"));
        assert!(!out.contains("center"));
        assert!(!out.contains("includegraphics"));
        assert!(out.contains("stem"));
        assert!(out.contains("tail"));
    }

    #[test]
    fn test_remove_answer_section_truncates_at_earliest_command() {
        let text = "Which one? \\choice{a}{b}{c}{d} trailing";
        assert_eq!(remove_answer_section(text), "Which one? ");
    }

    #[test]
    fn test_remove_answer_section_protects_math() {
        let text = "Compute $\\dfrac{1}{2}$ of it \\choice{a}{b}";
        assert_eq!(remove_answer_section(text), "Compute $\\dfrac{1}{2}$ of it ");
    }

    #[test]
    fn test_remove_answer_section_no_command_is_identity() {
        let text = "Plain essay prompt with $\\frac{x}{y}$.";
        assert_eq!(remove_answer_section(text), text);
    }

    #[test]
    fn test_remove_solution() {
        let text = "stem \\loigiai{Because $\\{x\\}$ is a set.} tail";
        assert_eq!(remove_solution(text), "stem  tail");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a   b \n c  "), "a b \\n c");
    }

    #[test]
    fn test_normalize_whitespace_idempotent() {
        let once = normalize_whitespace("line one\n  line   two");
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn test_flatten_whitespace_collapses_escape_sequence() {
        assert_eq!(flatten_whitespace("a\\nb  c"), "a b c");
    }

    #[test]
    fn test_clean_block_full_pipeline() {
        let block = "\\begin{ex}%[2P1N1]\nWhat is $\\dfrac{1}{2}+\\dfrac{1}{2}$?\n\\choice{\\True $1$}{$2$}{$0$}{$4$}\n\\loigiai{Add the halves.}\n\\end{ex}";
        let (raw, clean) = clean_block(block).unwrap();
        assert!(raw.contains("\\choice"));
        assert_eq!(clean, "What is $\\dfrac{1}{2}+\\dfrac{1}{2}$?");
    }
}
