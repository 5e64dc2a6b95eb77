use std::fmt;

use memchr::memmem;
use regex::{Captures, Regex, RegexBuilder};

use crate::options::SearchDirection;

/// One captured piece of a match, located by byte offset into the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub offset: usize,
    pub text: String,
}

impl MatchGroup {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A single match. `groups[0]` is the whole match; later entries are capture
/// groups and are `None` when their branch did not take part in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub index: usize,
    pub full_text: String,
    pub groups: Vec<Option<MatchGroup>>,
}

impl MatchRecord {
    fn literal(index: usize, text: &str) -> Self {
        Self {
            index,
            full_text: text.to_string(),
            groups: vec![Some(MatchGroup {
                offset: index,
                text: text.to_string(),
            })],
        }
    }

    fn from_captures(captures: &Captures<'_>) -> Option<Self> {
        let whole = captures.get(0)?;
        let groups = captures
            .iter()
            .map(|group| {
                group.map(|m| MatchGroup {
                    offset: m.start(),
                    text: m.as_str().to_string(),
                })
            })
            .collect();

        Some(Self {
            index: whole.start(),
            full_text: whole.as_str().to_string(),
            groups,
        })
    }

    pub fn end(&self) -> usize {
        self.index + self.full_text.len()
    }

    /// True for a match that consumed nothing.
    pub fn is_empty(&self) -> bool {
        self.full_text.is_empty()
    }

    /// Capture groups after the whole match that participated and consumed text.
    pub fn sub_groups(&self) -> impl Iterator<Item = &MatchGroup> {
        self.groups
            .iter()
            .skip(1)
            .flatten()
            .filter(|group| !group.is_empty())
    }
}

/// Raised when a regular-expression search term does not compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSyntaxError {
    pattern: String,
    message: String,
}

impl PatternSyntaxError {
    fn new(pattern: &str, error: regex::Error) -> Self {
        Self {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PatternSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid search pattern `{}`: {}", self.pattern, self.message)
    }
}

impl std::error::Error for PatternSyntaxError {}

enum MatcherKind {
    /// `folded` is set for case-insensitive search, where byte comparison
    /// is not enough.
    Literal {
        needle: String,
        folded: Option<Regex>,
    },
    Regex(Regex),
}

/// A compiled search term plus the byte offset the next search resumes from.
pub struct Matcher {
    kind: MatcherKind,
    cursor: usize,
}

impl Matcher {
    pub fn new(
        pattern: &str,
        multiline: bool,
        use_regex: bool,
        case_sensitive: bool,
    ) -> Result<Self, PatternSyntaxError> {
        let kind = if use_regex {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .multi_line(multiline)
                .build()
                .map_err(|e| PatternSyntaxError::new(pattern, e))?;
            MatcherKind::Regex(regex)
        } else {
            let folded = if case_sensitive {
                None
            } else {
                let regex = RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| PatternSyntaxError::new(pattern, e))?;
                Some(regex)
            };
            MatcherKind::Literal {
                needle: pattern.to_string(),
                folded,
            }
        };

        Ok(Self { kind, cursor: 0 })
    }

    #[cfg(test)]
    fn is_regex(&self) -> bool {
        matches!(self.kind, MatcherKind::Regex(_))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset;
    }

    pub fn exec(&self, text: &str, direction: SearchDirection) -> Option<MatchRecord> {
        match direction {
            SearchDirection::Forward => self.exec_forward(text),
            SearchDirection::Backward => self.exec_backward(text),
        }
    }

    /// First match starting at or after the cursor.
    pub fn exec_forward(&self, text: &str) -> Option<MatchRecord> {
        let cursor = ceil_char_boundary(text, self.cursor);
        match &self.kind {
            MatcherKind::Literal { needle, .. } if needle.is_empty() => None,
            MatcherKind::Literal {
                needle,
                folded: None,
            } => {
                let found = memmem::find(&text.as_bytes()[cursor..], needle.as_bytes())?;
                Some(MatchRecord::literal(cursor + found, needle))
            }
            MatcherKind::Literal {
                folded: Some(regex),
                ..
            } => {
                let found = regex.find_at(text, cursor)?;
                Some(MatchRecord::literal(found.start(), found.as_str()))
            }
            MatcherKind::Regex(regex) => {
                let captures = regex.captures_at(text, cursor)?;
                MatchRecord::from_captures(&captures)
            }
        }
    }

    /// Match with the greatest start strictly before the cursor.
    pub fn exec_backward(&self, text: &str) -> Option<MatchRecord> {
        let cursor = ceil_char_boundary(text, self.cursor);
        if cursor == 0 {
            return None;
        }

        match &self.kind {
            MatcherKind::Literal { needle, .. } if needle.is_empty() => None,
            MatcherKind::Literal {
                needle,
                folded: None,
            } => {
                // Any occurrence ending here or earlier starts before the cursor.
                let limit = (cursor - 1 + needle.len()).min(text.len());
                let found = memmem::rfind(&text.as_bytes()[..limit], needle.as_bytes())?;
                Some(MatchRecord::literal(found, needle))
            }
            MatcherKind::Literal {
                folded: Some(regex),
                ..
            } => {
                let record = scan_backward(regex, text, cursor)?;
                Some(MatchRecord::literal(record.index, &record.full_text))
            }
            MatcherKind::Regex(regex) => scan_backward(regex, text, cursor),
        }
    }
}

/// Emulates a reverse search on a forward-only engine: walk every match
/// from the start of the text and keep the last one that starts before
/// `cursor`. Each step resumes one character after the previous match start
/// so overlapping candidates are considered too. The walk ends at the first
/// zero-width candidate.
fn scan_backward(regex: &Regex, text: &str, cursor: usize) -> Option<MatchRecord> {
    let mut last = None;
    let mut position = 0;

    while position <= text.len() {
        let Some(captures) = regex.captures_at(text, position) else {
            break;
        };
        let Some(whole) = captures.get(0) else {
            break;
        };
        if whole.start() >= cursor || whole.is_empty() {
            break;
        }

        last = MatchRecord::from_captures(&captures);
        position = next_char_boundary(text, whole.start());
    }

    last
}

/// Byte offset of the character following the one at `offset`.
pub(crate) fn next_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len() + 1;
    }
    let offset = ceil_char_boundary(text, offset);
    text[offset..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| offset + c.len_utf8())
}

/// Clamps `offset` into the text and moves it forward onto a char boundary.
pub(crate) fn ceil_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(pattern: &str) -> Matcher {
        Matcher::new(pattern, true, false, true).unwrap()
    }

    fn regex(pattern: &str) -> Matcher {
        Matcher::new(pattern, true, true, true).unwrap()
    }

    fn at(mut matcher: Matcher, cursor: usize) -> Matcher {
        matcher.set_cursor(cursor);
        matcher
    }

    #[test]
    fn literal_forward_finds_next_occurrence() {
        let text = "cat cat cat";
        assert!(!literal("cat").is_regex());
        assert!(regex("cat").is_regex());
        assert_eq!(at(literal("cat"), 0).exec_forward(text).unwrap().index, 0);
        assert_eq!(at(literal("cat"), 1).exec_forward(text).unwrap().index, 4);
        assert_eq!(at(literal("cat"), 8).exec_forward(text).unwrap().index, 8);
        assert!(at(literal("cat"), 9).exec_forward(text).is_none());
    }

    #[test]
    fn literal_backward_starts_strictly_before_cursor() {
        let text = "cat cat cat";
        assert!(at(literal("cat"), 0).exec_backward(text).is_none());
        assert_eq!(at(literal("cat"), 1).exec_backward(text).unwrap().index, 0);
        assert_eq!(at(literal("cat"), 4).exec_backward(text).unwrap().index, 0);
        assert_eq!(at(literal("cat"), 5).exec_backward(text).unwrap().index, 4);
        assert_eq!(at(literal("cat"), 11).exec_backward(text).unwrap().index, 8);
    }

    #[test]
    fn literal_ignores_regex_metacharacters() {
        let text = "fooXXXbar foo.*bar";
        let record = at(literal("foo.*bar"), 0).exec_forward(text).unwrap();
        assert_eq!(record.index, 10);
        assert_eq!(record.groups.len(), 1);
    }

    #[test]
    fn literal_case_insensitive() {
        let text = "Hello HELLO hello";
        let matcher = Matcher::new("hello", true, false, false).unwrap();
        assert_eq!(at(matcher, 1).exec_forward(text).unwrap().full_text, "HELLO");

        let matcher = Matcher::new("hello", true, false, false).unwrap();
        let record = at(matcher, 12).exec_backward(text).unwrap();
        assert_eq!(record.index, 6);
        assert_eq!(record.groups.len(), 1);

        assert!(at(literal("hello"), 0).exec_forward("HELLO").is_none());
    }

    #[test]
    fn empty_literal_never_matches() {
        assert!(at(literal(""), 0).exec_forward("abc").is_none());
        assert!(at(literal(""), 2).exec_backward("abc").is_none());
    }

    #[test]
    fn regex_forward_reports_groups() {
        let record = at(regex("(a)(x)?(b)"), 0).exec_forward("zab").unwrap();
        assert_eq!(record.index, 1);
        assert_eq!(record.full_text, "ab");
        assert_eq!(record.groups.len(), 4);
        assert!(record.groups[2].is_none());
        let subs: Vec<_> = record.sub_groups().map(|g| (g.offset, g.text.as_str())).collect();
        assert_eq!(subs, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn regex_backward_returns_last_match_before_cursor() {
        let text = "a1 b22 c333";
        let record = at(regex(r"\d+"), 4).exec_backward(text).unwrap();
        assert_eq!(record.index, 1);
        assert_eq!(record.full_text, "1");

        // Scanning resumes one character after each start, so the tail of
        // "22" is a later candidate than its head.
        let record = at(regex(r"\d+"), 8).exec_backward(text).unwrap();
        assert_eq!(record.index, 5);
        assert_eq!(record.full_text, "2");

        let record = at(regex(r"\d+"), 9).exec_backward(text).unwrap();
        assert_eq!(record.index, 8);
    }

    #[test]
    fn regex_backward_considers_overlapping_starts() {
        let record = at(regex("aa"), 3).exec_backward("aaaa").unwrap();
        assert_eq!(record.index, 2);
    }

    #[test]
    fn regex_backward_stops_at_zero_width_match() {
        let text = "bb aaa bb";
        // `a*` matches empty at offset 0, which ends the scan before "aaa".
        assert!(at(regex("a*"), 4).exec_backward(text).is_none());
        assert!(at(regex("a*"), 7).exec_backward(text).is_none());
        assert!(at(regex("x*"), 5).exec_backward(text).is_none());

        // Non-empty matches before the first empty one are still kept.
        let text = "aab";
        let record = at(regex("a*"), 3).exec_backward(text).unwrap();
        assert_eq!(record.index, 1);
        assert_eq!(record.full_text, "a");

        // Forward from the start agrees: the first candidate is empty.
        assert!(at(regex("a*"), 0).exec_forward("bb aaa bb").unwrap().is_empty());
    }

    #[test]
    fn regex_multiline_anchors() {
        let text = "one\ntwo\nthree";
        let record = at(regex("^t"), 1).exec_forward(text).unwrap();
        assert_eq!(record.index, 4);
        let record = at(regex("^t"), 9).exec_backward(text).unwrap();
        assert_eq!(record.index, 8);
    }

    #[test]
    fn regex_case_flag() {
        let insensitive = Matcher::new("abc", true, true, false).unwrap();
        assert_eq!(at(insensitive, 0).exec_forward("xABC").unwrap().index, 1);
        assert!(at(regex("abc"), 0).exec_forward("xABC").is_none());
    }

    #[test]
    fn invalid_regex_fails_at_construction() {
        let error = Matcher::new("(", true, true, true).err().unwrap();
        assert_eq!(error.pattern(), "(");
        assert!(error.to_string().starts_with("invalid search pattern `(`"));

        // The same text is fine as a literal.
        assert!(Matcher::new("(", true, false, true).is_ok());
    }

    #[test]
    fn cursor_is_clamped_and_aligned() {
        let text = "\u{1F600}x\u{1F600}x";
        let record = at(literal("x"), 1).exec_forward(text).unwrap();
        assert_eq!(record.index, 4);
        assert!(at(literal("x"), 100).exec_forward(text).is_none());
        assert_eq!(at(literal("x"), 100).exec_backward(text).unwrap().index, 9);
    }

    #[test]
    fn forward_and_backward_respect_cursor_contract() {
        let text = "ab ba abab b a";
        for pattern in ["a", "b", "ab", "b a", r"\w+", "a|b"] {
            for cursor in 0..=text.len() {
                let mut matcher = regex(pattern);
                matcher.set_cursor(cursor);
                if let Some(found) = matcher.exec_forward(text) {
                    assert!(found.index >= cursor, "{pattern} forward from {cursor}");
                }
                if let Some(found) = matcher.exec_backward(text) {
                    assert!(found.index < cursor, "{pattern} backward from {cursor}");
                }
            }
        }
    }

    #[test]
    fn next_char_boundary_steps_whole_characters() {
        let text = "a\u{e9}b";
        assert_eq!(next_char_boundary(text, 0), 1);
        assert_eq!(next_char_boundary(text, 1), 3);
        assert_eq!(next_char_boundary(text, 3), 4);
        assert_eq!(next_char_boundary(text, 4), 5);
    }
}
