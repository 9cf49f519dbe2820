//! Tag generation from classification codes
//!
//! A mapping document pairs code characters with human-readable labels in an
//! indented outline. Lookups are path-scoped: the same subject character can
//! carry different labels under different grades, so every map below is keyed
//! by the full character path down to its level, not the character alone.

use fxhash::FxHashMap;

use crate::core::code::QuestionCode;
use crate::data::constants::LEVEL_LABELS;

/// Marker-run lengths that encode outline depth in the mapping document.
const GRADE_MARKERS: usize = 1;
const SUBJECT_MARKERS: usize = 4;
const CHAPTER_MARKERS: usize = 7;
const LESSON_MARKERS: usize = 10;
const FORM_MARKERS: usize = 13;

/// Path-scoped label tables parsed from a mapping document.
#[derive(Debug, Clone, Default)]
pub struct TagTree {
    grades: FxHashMap<char, String>,
    subjects: FxHashMap<(char, char), String>,
    chapters: FxHashMap<(char, char, char), String>,
    lessons: FxHashMap<(char, char, char, char), String>,
    forms: FxHashMap<(char, char, char, char, char), String>,
}

impl TagTree {
    /// Parse a mapping document. Each entry line is a run of `-` markers, a
    /// single key character in brackets, and the label text. Marker-run
    /// length selects the level; the current path is carried line to line so
    /// deeper entries attach to the most recent shallower ones. Lines that
    /// fit no level shape are skipped.
    pub fn from_document(doc: &str) -> TagTree {
        let mut tree = TagTree::default();
        let mut grade: Option<char> = None;
        let mut subject: Option<char> = None;
        let mut chapter: Option<char> = None;
        let mut lesson: Option<char> = None;

        for line in doc.lines() {
            let Some((markers, key, label)) = parse_entry_line(line) else {
                continue;
            };
            match markers {
                GRADE_MARKERS => {
                    tree.grades.insert(key, label);
                    grade = Some(key);
                    subject = None;
                    chapter = None;
                    lesson = None;
                }
                SUBJECT_MARKERS => {
                    if let Some(g) = grade {
                        tree.subjects.insert((g, key), label);
                        subject = Some(key);
                        chapter = None;
                        lesson = None;
                    }
                }
                CHAPTER_MARKERS => {
                    if let (Some(g), Some(s)) = (grade, subject) {
                        tree.chapters.insert((g, s, key), label);
                        chapter = Some(key);
                        lesson = None;
                    }
                }
                LESSON_MARKERS => {
                    if let (Some(g), Some(s), Some(c)) = (grade, subject, chapter) {
                        tree.lessons.insert((g, s, c, key), label);
                        lesson = Some(key);
                    }
                }
                FORM_MARKERS => {
                    if let (Some(g), Some(s), Some(c), Some(l)) = (grade, subject, chapter, lesson)
                    {
                        tree.forms.insert((g, s, c, l, key), label);
                    }
                }
                _ => {}
            }
        }
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    fn grade(&self, g: char) -> Option<&str> {
        self.grades.get(&g).map(String::as_str)
    }

    fn subject(&self, g: char, s: char) -> Option<&str> {
        self.subjects.get(&(g, s)).map(String::as_str)
    }

    fn chapter(&self, g: char, s: char, c: char) -> Option<&str> {
        self.chapters.get(&(g, s, c)).map(String::as_str)
    }

    fn lesson(&self, g: char, s: char, c: char, l: char) -> Option<&str> {
        self.lessons.get(&(g, s, c, l)).map(String::as_str)
    }

    fn form(&self, g: char, s: char, c: char, l: char, f: char) -> Option<&str> {
        self.forms.get(&(g, s, c, l, f)).map(String::as_str)
    }
}

/// Split one outline line into (marker count, key character, label).
fn parse_entry_line(line: &str) -> Option<(usize, char, String)> {
    let trimmed = line.trim_start();
    let markers = trimmed.bytes().take_while(|b| *b == b'-').count();
    if markers == 0 {
        return None;
    }
    let rest = trimmed[markers..].trim_start();
    let rest = rest.strip_prefix('[')?;
    let (key_part, label_part) = rest.split_once(']')?;
    let mut key_chars = key_part.trim().chars();
    let key = key_chars.next()?;
    if key_chars.next().is_some() {
        return None;
    }
    let label = label_part.trim();
    if label.is_empty() {
        return None;
    }
    Some((markers, key, label.to_string()))
}

/// Turns parsed codes into semicolon-joined breadcrumb strings.
#[derive(Debug, Clone, Default)]
pub struct TagGenerator {
    tree: TagTree,
}

impl TagGenerator {
    pub fn new(tree: TagTree) -> TagGenerator {
        TagGenerator { tree }
    }

    /// Breadcrumb for a code string, or `None` when the code does not parse
    /// or its grade/subject/chapter path is absent from the tree. The
    /// difficulty label always resolves for a parsed code; lesson and form
    /// labels are appended only when mapped.
    pub fn generate_tags(&self, code_str: &str) -> Option<String> {
        let code = QuestionCode::from_code_string(code_str)?;
        self.generate_tags_for(&code)
    }

    pub fn generate_tags_for(&self, code: &QuestionCode) -> Option<String> {
        let grade = self.tree.grade(code.grade)?;
        let subject = self.tree.subject(code.grade, code.subject)?;
        let chapter = self.tree.chapter(code.grade, code.subject, code.chapter)?;
        let level = LEVEL_LABELS.get(&code.level).copied()?;

        let mut parts = vec![grade, subject, chapter, level];
        if let Some(lesson) = self
            .tree
            .lesson(code.grade, code.subject, code.chapter, code.lesson)
        {
            parts.push(lesson);
            if let Some(f) = code.form {
                if let Some(form) = self.tree.form(
                    code.grade,
                    code.subject,
                    code.chapter,
                    code.lesson,
                    f,
                ) {
                    parts.push(form);
                }
            }
        }
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
-[1] Lớp 10
----[P] Đại số
-------[1] Mệnh đề và tập hợp
----------[1] Mệnh đề
-------------[1] Xét tính đúng sai
----------[2] Tập hợp
-[2] Lớp 11
----[P] Đại số và giải tích
-------[1] Hàm số lượng giác
----------[1] Phương trình lượng giác
";

    fn generator() -> TagGenerator {
        TagGenerator::new(TagTree::from_document(DOC))
    }

    #[test]
    fn test_full_path_with_lesson() {
        let tags = generator().generate_tags("1P1N1").unwrap();
        assert_eq!(
            tags,
            "Lớp 10; Đại số; Mệnh đề và tập hợp; Nhận biết; Mệnh đề"
        );
    }

    #[test]
    fn test_form_suffix_appended() {
        let tags = generator().generate_tags("1P1V1-1").unwrap();
        assert_eq!(
            tags,
            "Lớp 10; Đại số; Mệnh đề và tập hợp; Vận dụng; Mệnh đề; Xét tính đúng sai"
        );
    }

    #[test]
    fn test_unmapped_form_is_dropped() {
        let tags = generator().generate_tags("1P1N1-9").unwrap();
        assert_eq!(
            tags,
            "Lớp 10; Đại số; Mệnh đề và tập hợp; Nhận biết; Mệnh đề"
        );
    }

    #[test]
    fn test_unmapped_lesson_keeps_upper_path() {
        let tags = generator().generate_tags("1P1H9").unwrap();
        assert_eq!(tags, "Lớp 10; Đại số; Mệnh đề và tập hợp; Thông hiểu");
    }

    #[test]
    fn test_subject_scoped_by_grade() {
        // Same subject character, different grades, different labels.
        let g1 = generator().generate_tags("1P1N1").unwrap();
        let g2 = generator().generate_tags("2P1N1").unwrap();
        assert!(g1.contains("Đại số;"));
        assert!(g2.contains("Đại số và giải tích"));
    }

    #[test]
    fn test_missing_chapter_yields_none() {
        assert_eq!(generator().generate_tags("1P9N1"), None);
        assert_eq!(generator().generate_tags("9P1N1"), None);
    }

    #[test]
    fn test_alias_level_resolves_label() {
        let tags = generator().generate_tags("1P1Y1").unwrap();
        assert!(tags.contains("Nhận biết"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let tree = TagTree::from_document("garbage\n--[Q] wrong depth\n-[1] Lớp 10\n-[] no key");
        assert_eq!(tree.grade('1'), Some("Lớp 10"));
        assert_eq!(tree.grades.len(), 1);
    }
}
