//! Question block parsing and record assembly
//!
//! The parser owns the orchestration: split a document into question blocks,
//! run each through the content pipeline and the extractors, and assemble the
//! final records. Failures never discard input: a block that cannot be parsed
//! is reported with its raw text, and a block that parses but lacks required
//! data becomes a pending question instead of an error.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::code::QuestionCodeParser;
use crate::core::tags::TagGenerator;
use crate::core::{answers, content, scanner};
use crate::data::constants::QUESTION_ENV;
use crate::data::model::{Question, QuestionStatus};
use crate::utils::error::{ParseError, ParseResult};
use crate::utils::report::ParseReport;

lazy_static! {
    /// Bracketed secondary identifier, e.g. `[TL.123456]`. Uppercase prefix
    /// required so dotted tokens in question text never read as a subcount.
    static ref RE_SUBCOUNT: Regex =
        Regex::new(r"\[\s*([A-Z]{2,3}\.[0-9]+)\s*\]").unwrap();
    /// Source attribution comment, e.g. `%[Nguồn: "Đề thi thử 2023"]`.
    static ref RE_SOURCE: Regex =
        Regex::new(r#"%\s*\[\s*Nguồn\s*:?\s*(?:"([^"]*)"\s*|([^\]]*))\]"#).unwrap();
}

/// Parses question blocks into assembled records. Construct once per run;
/// the tag generator is optional and only affects the generated-tags field.
#[derive(Debug, Default)]
pub struct LatexQuestionParser {
    tag_generator: Option<TagGenerator>,
}

impl LatexQuestionParser {
    pub fn new() -> LatexQuestionParser {
        LatexQuestionParser {
            tag_generator: None,
        }
    }

    pub fn with_tag_generator(tag_generator: TagGenerator) -> LatexQuestionParser {
        LatexQuestionParser {
            tag_generator: Some(tag_generator),
        }
    }

    /// Parse one block into a question record.
    ///
    /// The block is the environment plus any metadata comment lines directly
    /// above it. Structural failures (no environment, unbalanced braces)
    /// return an error carrying the raw block; everything past that point is
    /// best-effort and degrades to a pending question.
    pub fn parse_block(&self, block: &str) -> ParseResult<Question> {
        let Some((raw_body, clean_content)) = content::clean_block(block) else {
            return Err(ParseError::structural("no question environment", block));
        };
        if !scanner::is_balanced(&raw_body) {
            return Err(ParseError::structural("unbalanced braces", block));
        }

        let question_type = answers::identify_question_type(&raw_body);
        let (answer_options, correct_answer) = answers::extract_answers(&raw_body, question_type);
        let solution = answers::extract_solution(&raw_body);

        // Metadata may sit above the environment, so it is read off the full
        // block rather than the body.
        let question_code = QuestionCodeParser::extract_question_code(block);
        let question_code_id = question_code.as_ref().map(|c| c.code.clone());
        let subcount = extract_subcount(block);
        let source = extract_source(block);

        let generated_tags = match (&self.tag_generator, &question_code) {
            (Some(generator), Some(code)) => generator.generate_tags_for(code),
            _ => None,
        };

        let mut question = Question {
            raw_content: content::escape_newlines(raw_body.trim()),
            content: clean_content,
            question_type,
            answers: answer_options,
            correct_answer,
            solution,
            subcount,
            source,
            question_code_id,
            generated_tags,
            status: QuestionStatus::Pending,
        };
        question.status = derive_status(&question);
        Ok(question)
    }

    /// Parse every question block in a document. Returns the successfully
    /// assembled questions and a report covering every block, failed ones
    /// included with their raw text.
    pub fn parse_document(&self, document: &str) -> (Vec<Question>, ParseReport) {
        let blocks = extract_question_blocks(document);
        let mut questions = Vec::with_capacity(blocks.len());
        let mut report = ParseReport {
            total_blocks: blocks.len(),
            ..ParseReport::default()
        };

        for (index, block) in blocks.iter().enumerate() {
            match self.parse_block(block) {
                Ok(question) => {
                    report.parsed += 1;
                    questions.push(question);
                }
                Err(err) => {
                    report.record_error(index, err.to_string(), block);
                }
            }
        }
        (questions, report)
    }

    /// Read and parse a document from disk.
    pub fn parse_file(&self, path: &std::path::Path) -> ParseResult<(Vec<Question>, ParseReport)> {
        let document = std::fs::read_to_string(path)?;
        Ok(self.parse_document(&document))
    }
}

/// A question is active only when its display text survived cleaning and its
/// type-specific answer data is complete; anything less is pending review.
fn derive_status(question: &Question) -> QuestionStatus {
    if !question.content.is_empty() && question.has_required_answer_data() {
        QuestionStatus::Active
    } else {
        QuestionStatus::Pending
    }
}

/// Split a document into question blocks: each environment span extended
/// backward over the comment lines sitting directly above it, so codes and
/// source annotations written above `\begin{ex}` stay with their question.
pub fn extract_question_blocks(document: &str) -> Vec<String> {
    scanner::extract_environment_spans(document, QUESTION_ENV)
        .into_iter()
        .map(|(start, end)| {
            let extended = extend_over_leading_comments(document, start);
            document[extended..end].to_string()
        })
        .collect()
}

fn extend_over_leading_comments(document: &str, start: usize) -> usize {
    let mut pos = start;
    loop {
        let line_start = document[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        if line_start == pos {
            // `start` sits at a line head; inspect the previous line.
            if line_start == 0 {
                return pos;
            }
            let prev_start = document[..line_start - 1]
                .rfind('\n')
                .map(|i| i + 1)
                .unwrap_or(0);
            let prev_line = document[prev_start..line_start - 1].trim_start();
            if prev_line.starts_with('%') {
                pos = prev_start;
            } else {
                return pos;
            }
        } else {
            // Environment begins mid-line; keep only from the marker itself.
            return pos;
        }
    }
}

fn extract_subcount(block: &str) -> Option<String> {
    RE_SUBCOUNT
        .captures(block)
        .map(|caps| caps[1].to_string())
}

fn extract_source(block: &str) -> Option<String> {
    let caps = RE_SOURCE.captures(block)?;
    let value = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CorrectAnswer, QuestionType};

    #[test]
    fn test_parse_block_multiple_choice() {
        let block = "%[2P1N1]\n\\begin{ex}\nWhat is the capital of Japan?\n\\choice{\\True Tokyo}{Osaka}{Kyoto}{Hiroshima}\n\\loigiai{Tokyo is the capital.}\n\\end{ex}";
        let parser = LatexQuestionParser::new();
        let q = parser.parse_block(block).unwrap();
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.answers.len(), 4);
        assert_eq!(q.correct_answer, CorrectAnswer::Single("Tokyo".to_string()));
        assert_eq!(q.solution.as_deref(), Some("Tokyo is the capital."));
        assert_eq!(q.question_code_id.as_deref(), Some("2P1N1"));
        assert_eq!(q.content, "What is the capital of Japan?");
        assert_eq!(q.status, QuestionStatus::Active);
    }

    #[test]
    fn test_parse_block_no_environment() {
        let parser = LatexQuestionParser::new();
        let err = parser.parse_block("just some text").unwrap_err();
        assert_eq!(err.raw_block(), Some("just some text"));
    }

    #[test]
    fn test_parse_block_unbalanced_is_structural() {
        let block = "\\begin{ex}broken { brace\\end{ex}";
        let parser = LatexQuestionParser::new();
        assert!(parser.parse_block(block).is_err());
    }

    #[test]
    fn test_parse_block_missing_marker_is_pending() {
        let block = "\\begin{ex}Pick.\n\\choice{a}{b}{c}{d}\n\\end{ex}";
        let parser = LatexQuestionParser::new();
        let q = parser.parse_block(block).unwrap();
        assert_eq!(q.status, QuestionStatus::Pending);
        assert_eq!(q.correct_answer, CorrectAnswer::None);
        assert_eq!(q.answers.len(), 4);
    }

    #[test]
    fn test_parse_block_metadata_fields() {
        let block = "%[2P1V3-1]\n%[Nguồn: \"Đề thi thử 2023\"]\n\\begin{ex}\n[TL.123456]\nSolve it.\n\\shortans{$42$}\n\\end{ex}";
        let parser = LatexQuestionParser::new();
        let q = parser.parse_block(block).unwrap();
        assert_eq!(q.question_code_id.as_deref(), Some("2P1V3-1"));
        assert_eq!(q.subcount.as_deref(), Some("TL.123456"));
        assert_eq!(q.source.as_deref(), Some("Đề thi thử 2023"));
        assert_eq!(q.correct_answer, CorrectAnswer::Single("$42$".to_string()));
        assert_eq!(q.status, QuestionStatus::Active);
    }

    #[test]
    fn test_dotted_stem_token_is_not_a_subcount() {
        let block = "\\begin{ex}\nIs $0.25$ in the interval $[0.5]$? See [fig.1].\n\\choice{\\True no}{yes}\n\\end{ex}";
        let parser = LatexQuestionParser::new();
        let q = parser.parse_block(block).unwrap();
        assert_eq!(q.subcount, None);
        assert!(q.content.contains("$[0.5]$"));
        assert!(q.content.contains("[fig.1]"));
    }

    #[test]
    fn test_extract_question_blocks_with_leading_comments() {
        let doc = "preamble\n%[2P1N1]\n% note line\n\\begin{ex}one\\end{ex}\ntext\n\\begin{ex}two\\end{ex}";
        let blocks = extract_question_blocks(doc);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("%[2P1N1]"));
        assert!(!blocks[1].contains('%'));
    }

    #[test]
    fn test_parse_document_mixed() {
        let doc = "\\begin{ex}Essay prompt only.\\end{ex}\n\\begin{ex}broken { \\end{ex}";
        let parser = LatexQuestionParser::new();
        let (questions, report) = parser.parse_document(doc);
        assert_eq!(report.total_blocks, 2);
        assert_eq!(report.parsed, 1);
        assert_eq!(questions.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].raw_block.contains("broken"));
    }

    #[test]
    fn test_extract_source_unquoted() {
        assert_eq!(
            extract_source("%[Nguồn: Sách bài tập]"),
            Some("Sách bài tập".to_string())
        );
    }
}
