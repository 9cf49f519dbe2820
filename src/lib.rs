//! Texbank: structured question extraction from LaTeX exam documents
//!
//! Documents built on the `ex` exam environment carry semi-structured
//! questions: a stem, an answer command (`\choice`, `\choiceTF`,
//! `\shortans`), an optional worked solution (`\loigiai`), and metadata
//! comments holding a classification code and source attribution. This crate
//! parses those documents into serializable question records, preserving
//! every block it cannot fully parse for manual review instead of dropping
//! it.
//!
//! # Example
//!
//! ```
//! use texbank::{parse_document, QuestionType, QuestionStatus};
//!
//! let doc = r"\begin{ex}%[2P1N1]
//! What is the capital of Japan?
//! \choice{\True Tokyo}{Osaka}{Kyoto}{Hiroshima}
//! \loigiai{Tokyo is the capital.}
//! \end{ex}";
//!
//! let (questions, report) = parse_document(doc);
//! assert!(report.is_clean());
//! assert_eq!(questions[0].question_type, QuestionType::MultipleChoice);
//! assert_eq!(questions[0].status, QuestionStatus::Active);
//! ```

pub mod core;
pub mod data;
pub mod utils;

pub use crate::core::{
    extract_question_blocks, CodeFormat, LatexQuestionParser, QuestionCode, QuestionCodeParser,
    TagGenerator, TagTree,
};
pub use crate::data::{
    CorrectAnswer, Question, QuestionAnswer, QuestionStatus, QuestionType,
};
pub use crate::utils::{BlockError, ParseError, ParseReport, ParseResult};

/// Parse one question block with default settings (no tag generation).
pub fn parse_block(block: &str) -> ParseResult<Question> {
    LatexQuestionParser::new().parse_block(block)
}

/// Parse every question block in a document with default settings.
pub fn parse_document(document: &str) -> (Vec<Question>, ParseReport) {
    LatexQuestionParser::new().parse_document(document)
}
