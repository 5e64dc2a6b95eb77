use std::fmt;

use multiseek_search::{IncrementalSearch, SearchDirection};

/// How the last round went, shown next to the term.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MatchIndicator {
    #[default]
    Normal,
    SyntaxError(String),
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub term: String,
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub direction: SearchDirection,
    pub indicator: MatchIndicator,
}

impl StatusLine {
    pub fn from_search(search: &IncrementalSearch, indicator: MatchIndicator) -> Self {
        Self {
            term: search.search_term().to_string(),
            case_sensitive: search.is_case_sensitive(),
            use_regex: search.uses_regex(),
            direction: search.direction(),
            indicator,
        }
    }
}

fn toggle(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "incremental search: {}", self.term)?;
        write!(
            f,
            "  Aa:{} .*:{}",
            toggle(self.case_sensitive),
            toggle(self.use_regex)
        )?;
        if self.direction == SearchDirection::Backward {
            f.write_str("  (backward)")?;
        }
        match &self.indicator {
            MatchIndicator::Normal => Ok(()),
            MatchIndicator::SyntaxError(message) => write!(f, "  [syntax error: {}]", message),
            MatchIndicator::NoMatch => f.write_str("  [no match]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(indicator: MatchIndicator) -> StatusLine {
        StatusLine {
            term: "ca".to_string(),
            case_sensitive: true,
            use_regex: false,
            direction: SearchDirection::Forward,
            indicator,
        }
    }

    #[test]
    fn renders_term_and_toggles() {
        assert_eq!(
            status(MatchIndicator::Normal).to_string(),
            "incremental search: ca  Aa:on .*:off"
        );
    }

    #[test]
    fn renders_indicators() {
        assert_eq!(
            status(MatchIndicator::NoMatch).to_string(),
            "incremental search: ca  Aa:on .*:off  [no match]"
        );
        assert_eq!(
            status(MatchIndicator::SyntaxError("unclosed group".into())).to_string(),
            "incremental search: ca  Aa:on .*:off  [syntax error: unclosed group]"
        );
    }

    #[test]
    fn renders_backward_direction() {
        let line = StatusLine {
            direction: SearchDirection::Backward,
            ..status(MatchIndicator::Normal)
        };
        assert!(line.to_string().ends_with("(backward)"));
    }
}
