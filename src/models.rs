/// The fixed quiz sections, graded independently and in this order.
pub const SECTIONS: [&str; 3] = ["单项选择", "完形填空", "阅读理解"];

#[derive(Debug, Clone)]
pub struct SectionResult {
    pub section: String,
    pub student_display: String,
    pub key_display: String,
    pub status: String,
    pub mismatched: Vec<usize>,
}

/// One row as written to (and read back from) the remote table.
#[derive(Debug, Clone)]
pub struct GradingRecord {
    pub name: String,
    pub title: String,
    pub student_block: String,
    pub key_block: String,
    pub status_block: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub authenticated: bool,
}
