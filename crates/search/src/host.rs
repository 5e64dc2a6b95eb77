use crate::range::{Position, Selection};

/// Read access to the searched text. Offsets are byte offsets into the
/// string returned by [`TextSource::text`]; `offset_at` and `position_at`
/// must invert each other for the same snapshot.
pub trait TextSource {
    fn text(&self) -> String;
    fn offset_at(&self, position: Position) -> usize;
    fn position_at(&self, offset: usize) -> Position;

    /// Bumped on every edit. Hosts without edit tracking can keep the default.
    fn revision(&self) -> u64 {
        0
    }
}

/// The surface that displays the selections.
pub trait SelectionHost {
    fn selections(&self) -> Vec<Selection>;
    fn set_selections(&mut self, selections: Vec<Selection>);
}

pub trait SearchHost: TextSource + SelectionHost {}

impl<T: TextSource + SelectionHost + ?Sized> SearchHost for T {}
