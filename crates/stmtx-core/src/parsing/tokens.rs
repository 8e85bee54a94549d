use regex::Regex;
use std::sync::LazyLock;

/// `D[D]/M[M]/YYYY`, `D[D]-M[M]-YYYY` or `D[D] Mon YYYY`.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{4}\b",
        r"|\b\d{1,2}\s+(?i:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*)\s+\d{4}\b"
    ))
    .expect("date pattern is valid")
});

/// Digit groups with optional comma separators and exactly two decimals.
/// Comma groups of two digits are accepted for lakh-style grouping (1,23,456.78).
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?(?:\d{1,3}(?:,\d{2,3})+|\d+)\.\d{2}").expect("amount pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Date,
    Amount,
}

/// A date or amount substring used as a split landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorToken {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl AnchorToken {
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

pub fn has_date(line: &str) -> bool {
    DATE_RE.is_match(line)
}

pub fn has_amount(line: &str) -> bool {
    amount_matches(line).next().is_some()
}

/// First date token in `text`, if any.
pub fn find_date(text: &str) -> Option<&str> {
    DATE_RE.find(text).map(|m| m.as_str())
}

/// All amount tokens in `text`, left to right.
pub fn find_amounts(text: &str) -> Vec<&str> {
    amount_matches(text).map(|(start, end)| &text[start..end]).collect()
}

fn amount_matches(line: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    AMOUNT_RE
        .find_iter(line)
        .filter(move |m| {
            !line[m.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
        .map(|m| (m.start(), m.end()))
}

/// Every date and amount token in the line, ordered by start offset.
///
/// Where a date and an amount overlap, the one starting first is kept.
pub fn anchor_tokens(line: &str) -> Vec<AnchorToken> {
    let mut tokens: Vec<AnchorToken> = DATE_RE
        .find_iter(line)
        .map(|m| AnchorToken {
            kind: TokenKind::Date,
            start: m.start(),
            end: m.end(),
        })
        .chain(amount_matches(line).map(|(start, end)| AnchorToken {
            kind: TokenKind::Amount,
            start,
            end,
        }))
        .collect();

    tokens.sort_by_key(|t| (t.start, t.kind == TokenKind::Amount));

    let mut out: Vec<AnchorToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match out.last() {
            Some(prev) if token.start < prev.end => continue,
            _ => out.push(token),
        }
    }
    out
}
