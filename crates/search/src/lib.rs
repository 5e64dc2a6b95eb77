//! Multi-cursor incremental search for multiseek.

mod error;
mod host;
mod matcher;
mod options;
mod range;
mod state;

pub use error::SearchError;
pub use host::{SearchHost, SelectionHost, TextSource};
pub use matcher::{MatchGroup, MatchRecord, Matcher, PatternSyntaxError};
pub use options::{
    ResolvedOptions, SearchDirection, SearchOptions, SearchPreferences, SharedPreferences,
    shared_preferences,
};
pub use range::{Position, Range, Selection, Span, merge_overlapping, normalize};
pub use state::{IncrementalSearch, Interference, SearchPhase, UpdateOutcome};
