use std::fmt;

use crate::matcher::PatternSyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    PatternSyntax(PatternSyntaxError),
    /// `update` or `advance` was called with no session running.
    Inactive,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternSyntax(error) => error.fmt(f),
            Self::Inactive => f.write_str("no incremental search is active"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PatternSyntax(error) => Some(error),
            Self::Inactive => None,
        }
    }
}

impl From<PatternSyntaxError> for SearchError {
    fn from(error: PatternSyntaxError) -> Self {
        Self::PatternSyntax(error)
    }
}
