use crate::models::SectionResult;

/// Placeholder shown for a question the student left unanswered.
pub const BLANK_MARKER: &str = "空";
pub const ALL_CORRECT: &str = "✅ 全对";

/// Letters-only, uppercased projection of a raw answer string. Digits,
/// brackets, whitespace, and any question-number annotations the
/// transcriber typed are all invisible to comparison.
pub fn project_letters(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(char::is_ascii_uppercase)
        .collect()
}

/// Compare a transcribed answer sheet against the key for one section.
///
/// Returns `None` when the key projects to no letters: the section was not
/// attempted and is omitted from the report. The student sequence may be
/// shorter than the key (missing answers render as the blank marker) or
/// longer (trailing extras are ignored). Never fails.
pub fn compare(student_text: &str, key_text: &str, section: &str) -> Option<SectionResult> {
    let key = project_letters(key_text);
    if key.is_empty() {
        return None;
    }
    let student: Vec<char> = project_letters(student_text).chars().collect();

    let mut student_display = Vec::new();
    let mut key_display = Vec::new();
    let mut mismatched = Vec::new();

    for (i, key_answer) in key.chars().enumerate() {
        let question = i + 1;
        match student.get(i).copied() {
            Some(student_answer) => {
                student_display.push(format!("[{question}]{student_answer}"));
                if student_answer != key_answer {
                    mismatched.push(question);
                }
            }
            None => {
                student_display.push(format!("[{question}]{BLANK_MARKER}"));
                mismatched.push(question);
            }
        }
        key_display.push(format!("[{question}]{key_answer}"));
    }

    let status = if mismatched.is_empty() {
        ALL_CORRECT.to_string()
    } else {
        let numbers: Vec<String> = mismatched.iter().map(|q| q.to_string()).collect();
        format!("🔴 第 {} 题错误", numbers.join(", "))
    };

    Some(SectionResult {
        section: section.to_string(),
        student_display: student_display.join(" "),
        key_display: key_display.join(" "),
        status,
        mismatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_keeps_only_uppercase_letters() {
        assert_eq!(project_letters("1.A 2.b 3:C!"), "ABC");
        assert_eq!(project_letters("  "), "");
        assert_eq!(project_letters("a,b;c d"), "ABCD");
    }

    #[test]
    fn empty_key_yields_no_result() {
        assert!(compare("ABCD", "", "单项选择").is_none());
        assert!(compare("ABCD", "1. 2. 3.", "单项选择").is_none());
        assert!(compare("", "", "单项选择").is_none());
    }

    #[test]
    fn annotated_and_bare_inputs_grade_identically() {
        let annotated = compare("1)A 2)C 3)C", "1.A 2.B 3.C", "单项选择").unwrap();
        let bare = compare("ACC", "ABC", "单项选择").unwrap();
        assert_eq!(annotated.student_display, bare.student_display);
        assert_eq!(annotated.key_display, bare.key_display);
        assert_eq!(annotated.status, bare.status);
        assert_eq!(annotated.mismatched, bare.mismatched);
    }

    #[test]
    fn single_mismatch_is_reported_by_question_number() {
        let result = compare("A C C", "1.A 2.B 3.C", "单项选择").unwrap();
        assert_eq!(result.student_display, "[1]A [2]C [3]C");
        assert_eq!(result.key_display, "[1]A [2]B [3]C");
        assert_eq!(result.mismatched, vec![2]);
        assert_eq!(result.status, "🔴 第 2 题错误");
    }

    #[test]
    fn missing_answers_render_blank_and_count_as_wrong() {
        let result = compare("", "AB", "完形填空").unwrap();
        assert_eq!(result.student_display, "[1]空 [2]空");
        assert_eq!(result.mismatched, vec![1, 2]);
    }

    #[test]
    fn partially_answered_sheet_mixes_letters_and_blanks() {
        let result = compare("A", "ABC", "单项选择").unwrap();
        assert_eq!(result.student_display, "[1]A [2]空 [3]空");
        assert_eq!(result.mismatched, vec![2, 3]);
        assert_eq!(result.status, "🔴 第 2, 3 题错误");
    }

    #[test]
    fn trailing_extra_answers_are_ignored() {
        let result = compare("ABCD", "AB", "阅读理解").unwrap();
        assert!(result.mismatched.is_empty());
        assert_eq!(result.status, ALL_CORRECT);
        assert_eq!(result.student_display, "[1]A [2]B");
    }

    #[test]
    fn all_correct_iff_no_mismatches() {
        let perfect = compare("ABAB", "abab", "单项选择").unwrap();
        assert!(perfect.mismatched.is_empty());
        assert_eq!(perfect.status, ALL_CORRECT);

        let flawed = compare("BBAB", "ABAB", "单项选择").unwrap();
        assert_eq!(flawed.mismatched, vec![1]);
        assert_ne!(flawed.status, ALL_CORRECT);
    }

    #[test]
    fn mismatch_indices_stay_within_key_length() {
        let result = compare("ZZZZZZZZZZ", "ABC", "单项选择").unwrap();
        assert!(result.mismatched.iter().all(|&q| (1..=3).contains(&q)));
        let sorted = {
            let mut copy = result.mismatched.clone();
            copy.sort_unstable();
            copy
        };
        assert_eq!(result.mismatched, sorted);
    }
}
