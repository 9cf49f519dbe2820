//! Question record types
//!
//! The assembled, serializable records consumed by exporters and the review
//! dashboard. Everything downstream of the parser treats these as read-only.

use serde::{Deserialize, Serialize};

/// Question type, determined by the answer-introducing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

/// Review status derived during validation.
///
/// `Pending` flags a parsed-but-incomplete question for manual review; such
/// questions are never discarded and never silently defaulted to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionStatus {
    Active,
    Pending,
}

/// One answer option. Order within a question is source order and `id` is
/// the 0-based ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub id: usize,
    pub content: String,
    pub is_correct: bool,
}

/// Correct-answer value, shaped per question type: a scalar for multiple
/// choice and short answer, a list for true/false, absent for essay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectAnswer {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl CorrectAnswer {
    pub fn is_none(&self) -> bool {
        matches!(self, CorrectAnswer::None)
    }

    /// Scalar value, when this is a `Single` answer.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            CorrectAnswer::Single(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// List of values, when this is a `Multiple` answer.
    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            CorrectAnswer::Multiple(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// The assembled question record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Original environment body, newline-preserving.
    pub raw_content: String,
    /// Cleaned question text after the content pipeline.
    pub content: String,
    pub question_type: QuestionType,
    pub answers: Vec<QuestionAnswer>,
    pub correct_answer: CorrectAnswer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    /// Secondary identifier distinct from the question code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_code_id: Option<String>,
    /// Semicolon-joined breadcrumb derived from the question code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_tags: Option<String>,
    pub status: QuestionStatus,
}

impl Question {
    /// Whether type-appropriate required answer data is present and
    /// well-formed. Multiple choice and true/false need at least two answers
    /// and a correct-answer value; short answer needs its scalar; essay needs
    /// nothing.
    pub fn has_required_answer_data(&self) -> bool {
        match self.question_type {
            QuestionType::MultipleChoice => {
                self.answers.len() >= 2 && self.correct_answer.as_single().is_some()
            }
            QuestionType::TrueFalse => {
                self.answers.len() >= 2
                    && self
                        .correct_answer
                        .as_multiple()
                        .map(|v| !v.is_empty())
                        .unwrap_or(false)
            }
            QuestionType::ShortAnswer => self.correct_answer.as_single().is_some(),
            QuestionType::Essay => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_question(question_type: QuestionType) -> Question {
        Question {
            raw_content: String::new(),
            content: String::new(),
            question_type,
            answers: Vec::new(),
            correct_answer: CorrectAnswer::None,
            solution: None,
            subcount: None,
            source: None,
            question_code_id: None,
            generated_tags: None,
            status: QuestionStatus::Pending,
        }
    }

    fn answer(id: usize, content: &str, is_correct: bool) -> QuestionAnswer {
        QuestionAnswer {
            id,
            content: content.to_string(),
            is_correct,
        }
    }

    #[test]
    fn test_essay_needs_nothing() {
        assert!(base_question(QuestionType::Essay).has_required_answer_data());
    }

    #[test]
    fn test_multiple_choice_requires_scalar_and_two_answers() {
        let mut q = base_question(QuestionType::MultipleChoice);
        assert!(!q.has_required_answer_data());
        q.answers = vec![answer(0, "a", true), answer(1, "b", false)];
        assert!(!q.has_required_answer_data());
        q.correct_answer = CorrectAnswer::Single("a".to_string());
        assert!(q.has_required_answer_data());
    }

    #[test]
    fn test_true_false_requires_nonempty_list() {
        let mut q = base_question(QuestionType::TrueFalse);
        q.answers = vec![answer(0, "a", false), answer(1, "b", false)];
        q.correct_answer = CorrectAnswer::Multiple(Vec::new());
        assert!(!q.has_required_answer_data());
        q.correct_answer = CorrectAnswer::Multiple(vec!["a".to_string()]);
        assert!(q.has_required_answer_data());
    }

    #[test]
    fn test_question_serde_round_trip() {
        let mut q = base_question(QuestionType::ShortAnswer);
        q.correct_answer = CorrectAnswer::Single("42".to_string());
        q.status = QuestionStatus::Active;
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }
}
