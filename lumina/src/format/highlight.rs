//! HTML escaping and search-term highlighting.

use std::ops::Range;

use regex::Regex;
use regex::RegexBuilder;

const MARK_OPEN: &str = "<mark class=\"lumina-highlight\">";
const MARK_CLOSE: &str = "</mark>";

/// Escapes `& < > " '` for safe insertion as HTML text.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Wraps case-insensitive occurrences of one or more terms in `<mark>`.
///
/// Terms are matched literally against the raw text; overlapping matches of
/// different terms merge into one mark.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    patterns: Vec<Regex>,
}

impl Highlighter {
    pub fn new<'a>(terms: impl IntoIterator<Item = &'a str>) -> Self {
        let patterns = terms
            .into_iter()
            .filter(|t| !t.is_empty())
            .filter_map(|t| {
                RegexBuilder::new(&regex::escape(t))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Escapes `text` and marks every match.
    pub fn render(&self, text: &str) -> String {
        let ranges = self.match_ranges(text);
        if ranges.is_empty() {
            return escape_html(text);
        }
        let mut out = String::with_capacity(text.len() + ranges.len() * 40);
        let mut cursor = 0;
        for range in ranges {
            out.push_str(&escape_html(&text[cursor..range.start]));
            out.push_str(MARK_OPEN);
            out.push_str(&escape_html(&text[range.clone()]));
            out.push_str(MARK_CLOSE);
            cursor = range.end;
        }
        out.push_str(&escape_html(&text[cursor..]));
        out
    }

    fn match_ranges(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = self
            .patterns
            .iter()
            .flat_map(|p| p.find_iter(text).map(|m| m.range()))
            .filter(|r| !r.is_empty())
            .collect();
        ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        merged
    }
}
