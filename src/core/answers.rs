//! Answer extraction and question-type classification
//!
//! Classification looks only at the part of the block before the solution
//! command, so commands quoted inside a worked solution can never flip the
//! type. Extraction then walks the brace groups of the one answer command the
//! type selects.

use crate::core::scanner;
use crate::data::constants::{
    CHOICE_COMMAND, CHOICE_TF_COMMAND, SHORT_ANSWER_COMMAND, SOLUTION_COMMAND, TRUE_MARKER,
};
use crate::data::model::{CorrectAnswer, QuestionAnswer, QuestionType};

/// Classify a question body by its answer-introducing command.
///
/// Priority is fixed: true/false before plain choice (prefix collision),
/// then short answer, then matching. Matching has no dedicated handling and
/// maps to essay, as does a body with no recognized command at all.
pub fn identify_question_type(body: &str) -> QuestionType {
    let scope = body_before_solution(body);
    if scanner::find_command(scope, CHOICE_TF_COMMAND).is_some() {
        QuestionType::TrueFalse
    } else if scanner::find_command(scope, CHOICE_COMMAND).is_some() {
        QuestionType::MultipleChoice
    } else if scanner::find_command(scope, SHORT_ANSWER_COMMAND).is_some() {
        QuestionType::ShortAnswer
    } else {
        // `\matching` has no dedicated extraction and lands here too.
        QuestionType::Essay
    }
}

/// Extract the answer options and correct-answer value for an
/// already-classified body.
pub fn extract_answers(body: &str, question_type: QuestionType) -> (Vec<QuestionAnswer>, CorrectAnswer) {
    let scope = body_before_solution(body);
    match question_type {
        QuestionType::MultipleChoice => extract_choice_answers(scope, CHOICE_COMMAND, false),
        QuestionType::TrueFalse => extract_choice_answers(scope, CHOICE_TF_COMMAND, true),
        QuestionType::ShortAnswer => extract_short_answer(scope),
        QuestionType::Essay => (Vec::new(), CorrectAnswer::None),
    }
}

/// Extract the solution text, trimmed and newline-escaped, or `None` when the
/// body has no solution command or only an empty argument.
pub fn extract_solution(body: &str) -> Option<String> {
    let pos = scanner::find_command(body, SOLUTION_COMMAND)?;
    let after_name = pos + 1 + SOLUTION_COMMAND.len();
    let brace = scanner::skip_whitespace(body.as_bytes(), after_name);
    if brace >= body.len() || body.as_bytes()[brace] != b'{' {
        return None;
    }
    let content = scanner::extract_braced_content(body, brace);
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(crate::core::content::escape_newlines(trimmed))
    }
}

/// Shared walk for `\choice` and `\choiceTF`: each brace group is one option,
/// in source order, with the correctness marker stripped from the content.
/// Multiple-choice yields a scalar correct answer (first marked option);
/// true/false yields the list of all marked options.
fn extract_choice_answers(
    scope: &str,
    command: &str,
    multi_correct: bool,
) -> (Vec<QuestionAnswer>, CorrectAnswer) {
    let Some(cmd) = scanner::find_command(scope, command) else {
        return (Vec::new(), CorrectAnswer::None);
    };
    let after_name = cmd + 1 + command.len();
    let raw_args = option_brace_groups(scope, after_name);

    let mut answers = Vec::with_capacity(raw_args.len());
    let mut correct: Vec<String> = Vec::new();
    for (id, raw) in raw_args.iter().enumerate() {
        let (content, is_correct) = strip_true_marker(raw);
        if is_correct {
            correct.push(content.clone());
        }
        answers.push(QuestionAnswer {
            id,
            content,
            is_correct,
        });
    }

    let correct_answer = if multi_correct {
        if correct.is_empty() {
            CorrectAnswer::None
        } else {
            CorrectAnswer::Multiple(correct)
        }
    } else {
        match correct.into_iter().next() {
            Some(value) => CorrectAnswer::Single(value),
            None => CorrectAnswer::None,
        }
    };
    (answers, correct_answer)
}

/// Short answer: optional bracketed variant parameter, then one brace group
/// holding the expected value. Surrounding quotes are presentation and get
/// stripped. A synthesized single option keeps the record shape uniform.
fn extract_short_answer(scope: &str) -> (Vec<QuestionAnswer>, CorrectAnswer) {
    let Some(cmd) = scanner::find_command(scope, SHORT_ANSWER_COMMAND) else {
        return (Vec::new(), CorrectAnswer::None);
    };
    let after_name = cmd + 1 + SHORT_ANSWER_COMMAND.len();
    let (args, _) = scanner::command_arguments_at(scope, after_name);

    let bytes = scope.as_bytes();
    let first_arg = scanner::skip_whitespace(bytes, after_name);
    let has_optional = first_arg < bytes.len() && bytes[first_arg] == b'[';
    let value_index = if has_optional { 1 } else { 0 };

    let Some(raw_value) = args.get(value_index) else {
        return (Vec::new(), CorrectAnswer::None);
    };
    let value = strip_surrounding_quotes(raw_value.trim()).trim().to_string();
    if value.is_empty() {
        return (Vec::new(), CorrectAnswer::None);
    }

    let answers = vec![QuestionAnswer {
        id: 0,
        content: value.clone(),
        is_correct: true,
    }];
    (answers, CorrectAnswer::Single(value))
}

/// Strip a leading correctness marker from option content. The marker only
/// counts when followed by a non-alphabetic character, so commands like
/// `\Truncate` are left alone.
fn strip_true_marker(raw: &str) -> (String, bool) {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix(TRUE_MARKER) {
        let boundary_ok = rest
            .chars()
            .next()
            .map(|c| !c.is_ascii_alphabetic())
            .unwrap_or(true);
        if boundary_ok {
            return (rest.trim().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}

/// The brace groups following a choice command, skipping any leading `[...]`
/// layout parameters. Layout parameters are presentation, never options.
fn option_brace_groups(scope: &str, after_name: usize) -> Vec<String> {
    let bytes = scope.as_bytes();
    let mut i = scanner::skip_whitespace(bytes, after_name);
    while i < bytes.len() && bytes[i] == b'[' {
        match scanner::find_matching_bracket(scope, i) {
            Some(close) => i = scanner::skip_whitespace(bytes, close + 1),
            None => return Vec::new(),
        }
    }

    let mut groups = Vec::new();
    while i < bytes.len() && bytes[i] == b'{' {
        match scanner::find_matching_brace(scope, i) {
            Some(close) => {
                groups.push(scope[i + 1..close].to_string());
                i = scanner::skip_whitespace(bytes, close + 1);
            }
            None => {
                groups.push(scope[i + 1..].to_string());
                break;
            }
        }
    }
    groups
}

fn strip_surrounding_quotes(value: &str) -> &str {
    let pairs: [(&str, &str); 3] = [("\"", "\""), ("''", "''"), ("``", "''")];
    for (open, close) in pairs {
        if value.len() >= open.len() + close.len()
            && value.starts_with(open)
            && value.ends_with(close)
        {
            return &value[open.len()..value.len() - close.len()];
        }
    }
    value
}

fn body_before_solution(body: &str) -> &str {
    match scanner::find_command(body, SOLUTION_COMMAND) {
        Some(pos) => &body[..pos],
        None => body,
    }
}
