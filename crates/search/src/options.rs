use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// Option overrides for one call. `None` means "not given": the term and
/// both toggles then keep their previous value, direction falls back to
/// forward and expand to off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub search_term: Option<String>,
    pub direction: Option<SearchDirection>,
    pub case_sensitive: Option<bool>,
    pub use_regex: Option<bool>,
    pub expand: Option<bool>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn direction(mut self, direction: SearchDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn backward(self) -> Self {
        self.direction(SearchDirection::Backward)
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    pub fn use_regex(mut self, use_regex: bool) -> Self {
        self.use_regex = Some(use_regex);
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = Some(expand);
        self
    }
}

/// Fully resolved options in effect for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub search_term: String,
    pub direction: SearchDirection,
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub expand: bool,
}

impl ResolvedOptions {
    pub fn initial(preferences: SearchPreferences) -> Self {
        Self {
            search_term: String::new(),
            direction: SearchDirection::Forward,
            case_sensitive: preferences.case_sensitive,
            use_regex: preferences.use_regex,
            expand: false,
        }
    }

    pub fn merged(&self, options: &SearchOptions) -> Self {
        Self {
            search_term: options
                .search_term
                .clone()
                .unwrap_or_else(|| self.search_term.clone()),
            direction: options.direction.unwrap_or_default(),
            case_sensitive: options.case_sensitive.unwrap_or(self.case_sensitive),
            use_regex: options.use_regex.unwrap_or(self.use_regex),
            expand: options.expand.unwrap_or(false),
        }
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self::initial(SearchPreferences::default())
    }
}

/// The two toggles remembered across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPreferences {
    pub case_sensitive: bool,
    pub use_regex: bool,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            use_regex: true,
        }
    }
}

/// Process-wide handle on the remembered toggles. Sessions read it once when
/// they start; only explicit toggles write it.
pub type SharedPreferences = Arc<RwLock<SearchPreferences>>;

pub fn shared_preferences(preferences: SearchPreferences) -> SharedPreferences {
    Arc::new(RwLock::new(preferences))
}
