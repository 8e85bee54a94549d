use crate::parsing::tokens::anchor_tokens;

/// Break a line into ordered column values using date and amount tokens as
/// split points.
///
/// Text between two anchors becomes its own column (trimmed, dropped when
/// empty) and each anchor is a column of its own. Lines without any anchor are
/// split on runs of two or more whitespace characters or on tabs.
pub fn split_line(line: &str) -> Vec<String> {
    let tokens = anchor_tokens(line);
    if tokens.is_empty() {
        return split_by_whitespace_gaps(line);
    }

    let mut columns = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut cursor = 0;
    for token in &tokens {
        push_trimmed(&mut columns, &line[cursor..token.start]);
        columns.push(token.text(line).to_string());
        cursor = token.end;
    }
    push_trimmed(&mut columns, &line[cursor..]);

    columns
}

fn push_trimmed(columns: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        columns.push(text.to_string());
    }
}

/// Split on tabs or gaps of 2+ whitespace characters.
pub fn split_by_whitespace_gaps(line: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut gap = 0;

    for c in line.chars() {
        if c == '\t' {
            push_trimmed(&mut segments, &current);
            current.clear();
            gap = 0;
            continue;
        }

        if c.is_whitespace() {
            gap += 1;
            if gap == 2 {
                push_trimmed(&mut segments, &current);
                current.clear();
            } else if gap == 1 {
                current.push(' ');
            }
            continue;
        }

        gap = 0;
        current.push(c);
    }
    push_trimmed(&mut segments, &current);

    segments
}

/// Split a column-label line: whitespace gaps first, single spaces when the
/// gaps yield fewer than two labels.
pub fn split_header_line(line: &str) -> Vec<String> {
    let columns = split_line(line);
    if columns.len() >= 2 {
        return columns;
    }
    line.split_whitespace().map(str::to_string).collect()
}
