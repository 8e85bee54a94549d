/// Column-label keyword groups. A group counts once per line.
const HEADER_KEYWORDS: &[&[&str]] = &[
    &["date"],
    &["description"],
    &["particulars"],
    &["debit"],
    &["credit"],
    &["balance"],
    &["transaction"],
    &["amount"],
    &["withdrawal"],
    &["deposit"],
    &["narration"],
    &["reference", "chq"],
];

/// Keyword groups needed before a line is taken as the column header.
pub const MIN_HEADER_KEYWORDS: usize = 2;

/// Number of keyword groups present in the lowercase form of `line`.
pub fn header_keyword_hits(line: &str) -> usize {
    let lower = line.to_lowercase();
    HEADER_KEYWORDS
        .iter()
        .filter(|group| group.iter().any(|kw| lower.contains(kw)))
        .count()
}

pub fn is_header_line(line: &str) -> bool {
    header_keyword_hits(line) >= MIN_HEADER_KEYWORDS
}

/// Index of the first line that labels columns, if any.
pub fn locate_header<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    lines.iter().position(|line| is_header_line(line.as_ref()))
}

/// Effective start offset of the statement body.
///
/// Everything before the header line (letterhead, account summary) is
/// skipped. Without a header the whole page is kept.
pub fn statement_start<S: AsRef<str>>(lines: &[S]) -> usize {
    locate_header(lines).unwrap_or(0)
}

/// Header location for a table: the first row whose joined cells label columns.
pub fn locate_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| is_header_line(&row.join(" ")))
}
