//! Brace-balanced text extraction over raw LaTeX
//!
//! Every higher-level component extracts content through this module instead
//! of matching braces with regular expressions. LaTeX nests brace groups
//! arbitrarily (`\dfrac{a}{b}` inside an answer inside `\choice` inside an
//! `ex` environment), so all extraction bottoms out in an explicit depth
//! counter over the byte stream with three scan states: normal, in-escape,
//! and in-comment.

/// Return the byte position of the `}` matching the `{` at `open_brace_pos`.
///
/// Escaped characters (`\{`, `\}`, and any other backslash-prefixed char) are
/// skipped as a unit and never change depth. A `%` outside an escape starts a
/// comment that runs to end of line; braces inside it are ignored. Returns
/// `None` when the position does not hold `{` or no matching closer exists.
pub fn find_matching_brace(text: &str, open_brace_pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if open_brace_pos >= bytes.len() || bytes[open_brace_pos] != b'{' {
        return None;
    }

    let mut depth = 0i32;
    let mut i = open_brace_pos;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                // Skip the escaped character as a unit (it may be multi-byte).
                i += 1 + char_width(text, i + 1);
                continue;
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Extract the content strictly inside the brace group opening at
/// `open_brace_pos`.
///
/// Returns an empty string when the position does not point at `{`. When the
/// group is never closed, returns everything through end of text so callers
/// degrade gracefully on truncated input.
pub fn extract_braced_content(text: &str, open_brace_pos: usize) -> String {
    let bytes = text.as_bytes();
    if open_brace_pos >= bytes.len() || bytes[open_brace_pos] != b'{' {
        return String::new();
    }
    match find_matching_brace(text, open_brace_pos) {
        Some(close) => text[open_brace_pos + 1..close].to_string(),
        None => text[open_brace_pos + 1..].to_string(),
    }
}

/// Byte spans (start, end-exclusive) of every `\begin{env}..\end{env}` block,
/// including the delimiters. Same-named nested environments are tracked with
/// a level counter so only the outer span is reported.
pub fn extract_environment_spans(text: &str, env_name: &str) -> Vec<(usize, usize)> {
    let begin_marker = format!("\\begin{{{}}}", env_name);
    let end_marker = format!("\\end{{{}}}", env_name);
    // The walk below advances byte-by-byte, so all marker matching happens on
    // byte slices; str slicing would panic mid-char on multibyte text.
    let bytes = text.as_bytes();
    let begin_bytes = begin_marker.as_bytes();
    let end_bytes = end_marker.as_bytes();

    let mut spans = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let Some(rel) = find_bytes(&bytes[i..], begin_bytes) else {
            break;
        };
        let start = i + rel;
        let mut level = 1i32;
        let mut j = start + begin_marker.len();
        let mut end = None;
        while j < bytes.len() {
            if bytes[j..].starts_with(begin_bytes) {
                level += 1;
                j += begin_marker.len();
            } else if bytes[j..].starts_with(end_bytes) {
                level -= 1;
                j += end_marker.len();
                if level == 0 {
                    end = Some(j);
                    break;
                }
            } else {
                j += 1;
            }
        }
        match end {
            Some(e) => {
                spans.push((start, e));
                i = e;
            }
            None => {
                // Unterminated environment: resume past its begin marker so
                // later well-formed blocks still parse.
                i = start + begin_marker.len();
            }
        }
    }
    spans
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

/// All `\begin{env_name} ... \end{env_name}` blocks in source order, each
/// returned with its delimiters.
pub fn extract_environment_blocks(text: &str, env_name: &str) -> Vec<String> {
    extract_environment_spans(text, env_name)
        .into_iter()
        .map(|(s, e)| text[s..e].to_string())
        .collect()
}

/// Find the first occurrence of `\command_name` at or after `from`, where the
/// name is not a prefix of a longer command (`\choice` does not match inside
/// `\choiceTF`). Occurrences inside comments are skipped.
pub fn find_command_from(text: &str, command_name: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let name = command_name.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let name_start = i + 1;
                if bytes.len() - name_start >= name.len()
                    && &bytes[name_start..name_start + name.len()] == name
                {
                    let after = name_start + name.len();
                    if after >= bytes.len() || !bytes[after].is_ascii_alphabetic() {
                        return Some(i);
                    }
                }
                i += 1 + char_width(text, i + 1);
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Position of the first real occurrence of `\command_name`, if any.
pub fn find_command(text: &str, command_name: &str) -> Option<usize> {
    find_command_from(text, command_name, 0)
}

/// Collect the arguments of every occurrence of `\command_name`: zero or more
/// bracketed optional parameters `[...]` followed by zero or more
/// brace-delimited required arguments `{...}`, with whitespace permitted
/// between them. Returns optional-then-required argument strings per
/// occurrence, flattened across occurrences in source order.
pub fn extract_command_arguments(text: &str, command_name: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut pos = 0usize;
    while let Some(cmd) = find_command_from(text, command_name, pos) {
        let after_name = cmd + 1 + command_name.len();
        let (occ_args, next) = command_arguments_at(text, after_name);
        args.extend(occ_args);
        pos = next.max(after_name);
    }
    args
}

/// Arguments of a single command occurrence, scanning from just past the
/// command name. Returns the arguments and the position after the last one.
pub(crate) fn command_arguments_at(text: &str, after_name: usize) -> (Vec<String>, usize) {
    let bytes = text.as_bytes();
    let mut args = Vec::new();
    let mut i = skip_whitespace(bytes, after_name);

    // Optional bracketed parameters first.
    while i < bytes.len() && bytes[i] == b'[' {
        match find_matching_bracket(text, i) {
            Some(close) => {
                args.push(text[i + 1..close].to_string());
                i = skip_whitespace(bytes, close + 1);
            }
            None => return (args, i),
        }
    }

    // Then required brace groups.
    while i < bytes.len() && bytes[i] == b'{' {
        match find_matching_brace(text, i) {
            Some(close) => {
                args.push(text[i + 1..close].to_string());
                i = skip_whitespace(bytes, close + 1);
            }
            None => {
                args.push(text[i + 1..].to_string());
                return (args, bytes.len());
            }
        }
    }

    (args, i)
}

/// Matching `]` for the `[` at `open_bracket_pos`, depth- and escape-aware.
pub(crate) fn find_matching_bracket(text: &str, open_bracket_pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if open_bracket_pos >= bytes.len() || bytes[open_bracket_pos] != b'[' {
        return None;
    }
    let mut depth = 0i32;
    let mut i = open_bracket_pos;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1 + char_width(text, i + 1);
                continue;
            }
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Check that every `{` has a matching `}` with no crossing. Comments are
/// skipped and escaped characters are skipped as a unit.
pub fn is_balanced(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1 + char_width(text, i + 1);
                continue;
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
        i += 1;
    }
    depth == 0
}

pub(crate) fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Byte width of the char starting at `pos`, or 0 past end of text.
fn char_width(text: &str, pos: usize) -> usize {
    text[pos.min(text.len())..]
        .chars()
        .next()
        .map(|c| c.len_utf8())
        .unwrap_or(0)
}
