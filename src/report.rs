use std::fmt::Write;

use crate::models::{GradingRecord, SectionResult};

fn section_block(section: &str, body: &str) -> String {
    format!("【{section}】\n{body}")
}

/// Assemble one store row from the graded sections. The name is trimmed and
/// uppercased so the write path matches the query-side normalization; each
/// text block carries one `【section】` unit per graded section, blank-line
/// separated, in section order.
pub fn build_record(name: &str, title: &str, results: &[SectionResult]) -> GradingRecord {
    let join = |pick: fn(&SectionResult) -> &str| -> String {
        results
            .iter()
            .map(|result| section_block(&result.section, pick(result)))
            .collect::<Vec<String>>()
            .join("\n\n")
    };

    GradingRecord {
        name: name.trim().to_uppercase(),
        title: title.trim().to_string(),
        student_block: join(|result| &result.student_display),
        key_block: join(|result| &result.key_display),
        status_block: join(|result| &result.status),
    }
}

/// Post-submit report card shown to the operator.
pub fn render_confirmation(record: &GradingRecord, results: &[SectionResult]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{}、{} 作答情况", record.name, record.title);
    for result in results {
        let _ = writeln!(output);
        let _ = writeln!(output, "一、{}", result.section);
        let _ = writeln!(output, "你的作答: {}", result.student_display);
        let _ = writeln!(output, "标准答案: {}", result.key_display);
        let _ = writeln!(output, "错题记录: {}", result.status);
    }

    output
}

/// Queried rows as a fixed-field-order listing, one block per row.
pub fn render_history(rows: &[GradingRecord]) -> String {
    let mut output = String::new();

    for (index, row) in rows.iter().enumerate() {
        if index > 0 {
            let _ = writeln!(output);
        }
        let _ = writeln!(output, "姓名: {}", row.name);
        let _ = writeln!(output, "标题: {}", row.title);
        let _ = writeln!(output, "你的作答:\n{}", row.student_block);
        let _ = writeln!(output, "标准答案:\n{}", row.key_block);
        let _ = writeln!(output, "是否错误:\n{}", row.status_block);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader;

    fn graded_sections() -> Vec<SectionResult> {
        vec![
            grader::compare("ACC", "ABC", "单项选择").unwrap(),
            grader::compare("AB", "AB", "完形填空").unwrap(),
        ]
    }

    #[test]
    fn record_normalizes_name_and_trims_title() {
        let record = build_record("  ryan ", " 2501二中 ", &graded_sections());
        assert_eq!(record.name, "RYAN");
        assert_eq!(record.title, "2501二中");
    }

    #[test]
    fn blocks_carry_one_labelled_unit_per_section() {
        let record = build_record("Ryan", "2501二中", &graded_sections());
        assert_eq!(
            record.student_block,
            "【单项选择】\n[1]A [2]C [3]C\n\n【完形填空】\n[1]A [2]B"
        );
        assert_eq!(
            record.status_block,
            "【单项选择】\n🔴 第 2 题错误\n\n【完形填空】\n✅ 全对"
        );
    }

    #[test]
    fn confirmation_shows_header_and_each_section() {
        let results = graded_sections();
        let record = build_record("ryan", "2501二中", &results);
        let card = render_confirmation(&record, &results);
        assert!(card.starts_with("RYAN、2501二中 作答情况"));
        assert!(card.contains("一、单项选择"));
        assert!(card.contains("你的作答: [1]A [2]C [3]C"));
        assert!(card.contains("错题记录: ✅ 全对"));
    }

    #[test]
    fn history_lists_rows_in_request_order() {
        let rows = vec![
            GradingRecord {
                name: "RYAN".to_string(),
                title: "2501二中".to_string(),
                student_block: "【单项选择】\n[1]A".to_string(),
                key_block: "【单项选择】\n[1]A".to_string(),
                status_block: "【单项选择】\n✅ 全对".to_string(),
            },
            GradingRecord {
                name: "DINO".to_string(),
                title: "2501二中".to_string(),
                student_block: String::new(),
                key_block: String::new(),
                status_block: String::new(),
            },
        ];
        let listing = render_history(&rows);
        let ryan = listing.find("姓名: RYAN").unwrap();
        let dino = listing.find("姓名: DINO").unwrap();
        assert!(ryan < dino);
    }
}
