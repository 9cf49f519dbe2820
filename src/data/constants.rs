//! Static configuration data for the question grammar
//!
//! Command families, marker tokens, and the difficulty-level tables live here
//! so every component draws on one set of constants instead of scattering
//! literal patterns. Precedence of the answer-command family is significant
//! and documented at each table.

use phf::phf_map;

/// Environment name wrapping one question.
pub const QUESTION_ENV: &str = "ex";

/// True/false multiple-selection command. Checked before [`CHOICE_COMMAND`]
/// because its name extends the plain choice command name.
pub const CHOICE_TF_COMMAND: &str = "choiceTF";

/// Single-correct multiple-choice command.
pub const CHOICE_COMMAND: &str = "choice";

/// Short-answer command; takes an optional `[...]` then one brace argument.
pub const SHORT_ANSWER_COMMAND: &str = "shortans";

/// Matching-question command. The matching type is unimplemented and is
/// deliberately classified as essay.
pub const MATCHING_COMMAND: &str = "matching";

/// Solution-introducing command with one balanced brace argument.
pub const SOLUTION_COMMAND: &str = "loigiai";

/// Correctness marker prefixing the content of a correct answer option.
pub const TRUE_MARKER: &str = "\\True";

/// Answer-introducing commands in classification priority order. The TF
/// command must precede the plain choice command (prefix collision), and the
/// scan order doubles as the truncation order in the content pipeline.
pub const ANSWER_COMMANDS: &[&str] = &[
    CHOICE_TF_COMMAND,
    CHOICE_COMMAND,
    SHORT_ANSWER_COMMAND,
    MATCHING_COMMAND,
];

/// Math macros whose brace groups are protected with placeholders while the
/// content pipeline searches for the answer-truncation point.
pub const PROTECTED_MATH_MACROS: &[&str] = &["dfrac", "tfrac", "frac", "sqrt", "binom"];

/// Environments removed wholesale from question text; their content is
/// handled by the image tooling, not the parser.
pub const IMAGE_ENVIRONMENTS: &[&str] = &["center", "tikzpicture", "figure"];

/// Canonical difficulty-level characters.
pub const CANONICAL_LEVELS: &[char] = &['N', 'H', 'V', 'C', 'T', 'M'];

/// Alternate difficulty characters remapped to canonical ones before storage.
pub static LEVEL_ALIASES: phf::Map<char, char> = phf_map! {
    'Y' => 'N',
    'B' => 'H',
    'K' => 'V',
    'G' => 'C',
};

/// Human-readable labels for the canonical difficulty levels, used by the
/// tag generator. Always resolvable once a code has parsed.
pub static LEVEL_LABELS: phf::Map<char, &'static str> = phf_map! {
    'N' => "Nhận biết",
    'H' => "Thông hiểu",
    'V' => "Vận dụng",
    'C' => "Vận dụng cao",
    'T' => "Tổng hợp",
    'M' => "Mở rộng",
};

/// Separator between the 5-character main code and the form suffix.
pub const CODE_FORM_SEPARATOR: char = '-';

/// Literal two-character escape sequence standing in for a real line break
/// in flat-storage text fields.
pub const NEWLINE_ESCAPE: &str = "\\n";
