//! Static data and record types
//!
//! This module contains:
//! - Grammar constants and the difficulty-level tables
//! - The serializable question record types

pub mod constants;
pub mod model;

// Re-export commonly used items
pub use model::{CorrectAnswer, Question, QuestionAnswer, QuestionStatus, QuestionType};
