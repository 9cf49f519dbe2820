//! Core parsing components
//!
//! This module contains the parsing pipeline:
//! - Brace-balanced scanning over raw LaTeX
//! - Content cleaning for display text
//! - Answer extraction and type classification
//! - Classification codes and tag generation
//! - The block/document parser that assembles records

pub mod answers;
pub mod code;
pub mod content;
pub mod parser;
pub mod scanner;
pub mod tags;

// Re-export commonly used items
pub use code::{CodeFormat, QuestionCode, QuestionCodeParser};
pub use parser::{extract_question_blocks, LatexQuestionParser};
pub use tags::{TagGenerator, TagTree};
