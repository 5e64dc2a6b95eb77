use log::debug;

use crate::error::SearchError;
use crate::host::SearchHost;
use crate::matcher::{Matcher, next_char_boundary};
use crate::options::{
    ResolvedOptions, SearchDirection, SearchOptions, SearchPreferences, SharedPreferences,
};
use crate::range::{Range, Selection, Span, merge_overlapping, normalize};

/// Patterns always see the text as multi-line so `^`/`$` work per line.
const MULTILINE: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Active,
}

/// Why a running session should be torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interference {
    /// The host shows selections the search did not set.
    SelectionsChanged,
    /// The text was edited since the last round.
    TextChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched_ranges: Vec<Range>,
    /// Set when at least one match was split into its capture groups.
    pub matched_groups: bool,
    /// No cursor found a match; the anchors were kept.
    pub stalled: bool,
}

struct Round {
    current: Vec<Selection>,
    matched_ranges: Vec<Range>,
    aggregated: Vec<Selection>,
    matched_groups: bool,
    stalled: bool,
}

/// Multi-cursor incremental search over one text surface.
pub struct IncrementalSearch {
    phase: SearchPhase,
    preferences: SharedPreferences,
    options: ResolvedOptions,
    initial_selections: Vec<Selection>,
    current_selections: Vec<Selection>,
    aggregated_selections: Vec<Selection>,
    matched_ranges: Vec<Range>,
    /// The last round split matches into capture groups; their selections
    /// may touch without being merged.
    split_groups: bool,
    /// What the host is expected to show right now.
    expected_selections: Vec<Selection>,
    revision: u64,
}

impl IncrementalSearch {
    pub fn new(preferences: SharedPreferences) -> Self {
        Self {
            phase: SearchPhase::Idle,
            preferences,
            options: ResolvedOptions::default(),
            initial_selections: Vec::new(),
            current_selections: Vec::new(),
            aggregated_selections: Vec::new(),
            matched_ranges: Vec::new(),
            split_groups: false,
            expected_selections: Vec::new(),
            revision: 0,
        }
    }

    /// Open a session anchored on the host's current selections. No
    /// matching happens until the first `update` or `advance`.
    pub fn start<H: SearchHost + ?Sized>(&mut self, host: &H, options: &SearchOptions) {
        let preferences: SearchPreferences = *self.preferences.read();
        let selections = host.selections();

        self.options = ResolvedOptions::initial(preferences).merged(options);
        self.initial_selections = selections.clone();
        self.current_selections = normalize(&selections);
        self.aggregated_selections.clear();
        self.matched_ranges.clear();
        self.split_groups = false;
        self.expected_selections = selections;
        self.revision = host.revision();
        self.phase = SearchPhase::Active;

        debug!(
            "incremental search started with {} cursor(s), term {:?}",
            self.initial_selections.len(),
            self.options.search_term
        );
    }

    /// Re-run the search from the current anchors with `options` merged in.
    pub fn update<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
        options: &SearchOptions,
    ) -> Result<UpdateOutcome, SearchError> {
        self.ensure_active()?;
        self.options = self.options.merged(options);

        let text = host.text();
        let anchors: Vec<usize> = self
            .initial_selections
            .iter()
            .map(|selection| host.offset_at(selection.active))
            .collect();

        let round = self.run_round(&*host, &text, &anchors, &self.initial_selections)?;
        Ok(self.commit(host, round))
    }

    /// Move every cursor past its last match and search again. The matched
    /// ranges become the new anchors, so a later `cancel` returns to them.
    pub fn advance<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
        options: &SearchOptions,
    ) -> Result<UpdateOutcome, SearchError> {
        self.ensure_active()?;
        if self.matched_ranges.is_empty() {
            return self.update(host, options);
        }

        self.options = self.options.merged(options);

        let text = host.text();
        let anchors: Vec<usize> = self
            .matched_ranges
            .iter()
            .map(|range| {
                let offset = host.offset_at(range.start);
                match self.options.direction {
                    SearchDirection::Forward => next_char_boundary(&text, offset).min(text.len()),
                    SearchDirection::Backward => offset,
                }
            })
            .collect();
        let initial: Vec<Selection> = self
            .matched_ranges
            .iter()
            .copied()
            .map(Selection::from)
            .collect();

        let round = self.run_round(&*host, &text, &anchors, &initial)?;
        self.initial_selections = initial;
        Ok(self.commit(host, round))
    }

    /// Put the host back on the anchor selections and end the session.
    pub fn cancel<H: SearchHost + ?Sized>(&mut self, host: &mut H) {
        if !self.is_active() {
            return;
        }
        host.set_selections(self.initial_selections.clone());
        self.finish("cancelled");
    }

    /// Keep whatever the search selected and end the session.
    pub fn complete(&mut self) {
        if !self.is_active() {
            return;
        }
        self.finish("completed");
    }

    /// End the session without touching the host, after interference.
    pub fn teardown(&mut self) {
        if !self.is_active() {
            return;
        }
        self.finish("interrupted");
    }

    /// Compare what the host reports against what the search last set.
    pub fn detect_interference(
        &self,
        observed: &[Selection],
        revision: u64,
    ) -> Option<Interference> {
        if !self.is_active() {
            return None;
        }
        if revision != self.revision {
            return Some(Interference::TextChanged);
        }
        if observed != self.expected_selections.as_slice() {
            return Some(Interference::SelectionsChanged);
        }
        None
    }

    /// Flip case sensitivity, remember it for later sessions, and search again
    /// in the same direction.
    pub fn toggle_case_sensitivity<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<UpdateOutcome, SearchError> {
        self.ensure_active()?;
        let case_sensitive = !self.options.case_sensitive;
        self.preferences.write().case_sensitive = case_sensitive;
        let options = SearchOptions::new()
            .case_sensitive(case_sensitive)
            .direction(self.options.direction);
        self.update(host, &options)
    }

    /// Flip regex mode, remember it for later sessions, and search again.
    pub fn toggle_regex<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<UpdateOutcome, SearchError> {
        self.ensure_active()?;
        let use_regex = !self.options.use_regex;
        self.preferences.write().use_regex = use_regex;
        let options = SearchOptions::new()
            .use_regex(use_regex)
            .direction(self.options.direction);
        self.update(host, &options)
    }

    /// Every selection the user currently sees.
    pub fn selections(&self) -> Vec<Selection> {
        let mut all = self.aggregated_selections.clone();
        all.extend_from_slice(&self.current_selections);
        merge_spans(&all, self.split_groups)
    }

    pub fn current_selections(&self) -> &[Selection] {
        &self.current_selections
    }

    pub fn aggregated_selections(&self) -> &[Selection] {
        &self.aggregated_selections
    }

    pub fn initial_selections(&self) -> &[Selection] {
        &self.initial_selections
    }

    pub fn matched_ranges(&self) -> &[Range] {
        &self.matched_ranges
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn search_term(&self) -> &str {
        &self.options.search_term
    }

    pub fn direction(&self) -> SearchDirection {
        self.options.direction
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.options.case_sensitive
    }

    pub fn uses_regex(&self) -> bool {
        self.options.use_regex
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SearchPhase::Active
    }

    fn ensure_active(&self) -> Result<(), SearchError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SearchError::Inactive)
        }
    }

    /// Compute a round without touching any state, so a failing pattern
    /// leaves the last committed round in place.
    fn run_round<H: SearchHost + ?Sized>(
        &self,
        host: &H,
        text: &str,
        anchors: &[usize],
        initial: &[Selection],
    ) -> Result<Round, SearchError> {
        let options = &self.options;
        let mut matcher = Matcher::new(
            &options.search_term,
            MULTILINE,
            options.use_regex,
            options.case_sensitive,
        )?;

        let aggregated = if options.expand {
            let mut carried = self.aggregated_selections.clone();
            carried.extend_from_slice(&self.current_selections);
            merge_spans(&carried, self.split_groups)
        } else {
            Vec::new()
        };

        let mut selections = Vec::new();
        let mut matched_ranges = Vec::new();
        let mut matched_groups = false;

        for &anchor in anchors {
            matcher.set_cursor(anchor);
            let Some(record) = matcher.exec(text, options.direction) else {
                continue;
            };
            if record.is_empty() {
                continue;
            }

            let start = host.position_at(record.index);
            let end = host.position_at(record.end());
            matched_ranges.push(Range::new(start, end));

            let mut groups = record.sub_groups().peekable();
            if groups.peek().is_none() {
                selections.push(Selection::new(start, end));
                continue;
            }

            matched_groups = true;
            for group in groups {
                selections.push(Selection::new(
                    host.position_at(group.offset),
                    host.position_at(group.end()),
                ));
            }
        }

        let stalled = selections.is_empty();
        if stalled {
            selections = initial.to_vec();
            matched_ranges = initial.iter().map(Selection::range).collect();
        }

        Ok(Round {
            current: merge_spans(&selections, matched_groups),
            matched_ranges: normalize(&matched_ranges),
            aggregated,
            matched_groups,
            stalled,
        })
    }

    fn commit<H: SearchHost + ?Sized>(&mut self, host: &mut H, round: Round) -> UpdateOutcome {
        self.current_selections = round.current;
        self.matched_ranges = round.matched_ranges;
        self.aggregated_selections = round.aggregated;
        self.split_groups = round.matched_groups;
        self.revision = host.revision();

        let visible = self.selections();
        if !visible.is_empty() {
            host.set_selections(visible.clone());
            self.expected_selections = visible;
        }

        debug!(
            "search round for {:?}: {} match range(s), {} selection(s)",
            self.options.search_term,
            self.matched_ranges.len(),
            self.expected_selections.len()
        );

        UpdateOutcome {
            matched_ranges: self.matched_ranges.clone(),
            matched_groups: round.matched_groups,
            stalled: round.stalled,
        }
    }

    fn finish(&mut self, reason: &str) {
        debug!("incremental search {}", reason);
        self.phase = SearchPhase::Idle;
        self.aggregated_selections.clear();
    }
}

/// Selections carved out of one match by its capture groups can sit side by
/// side; everything else is fully normalized.
fn merge_spans<T: Span>(spans: &[T], split_groups: bool) -> Vec<T> {
    if split_groups {
        merge_overlapping(spans)
    } else {
        normalize(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{SelectionHost, TextSource};
    use crate::options::shared_preferences;
    use crate::range::Position;

    /// Single-line host: positions are `(0, byte offset)`.
    struct LineHost {
        text: String,
        selections: Vec<Selection>,
        revision: u64,
        writes: usize,
    }

    impl LineHost {
        fn new(text: &str, cursors: &[usize]) -> Self {
            Self {
                text: text.to_string(),
                selections: cursors.iter().map(|&c| Selection::cursor(pos(c))).collect(),
                revision: 0,
                writes: 0,
            }
        }
    }

    impl TextSource for LineHost {
        fn text(&self) -> String {
            self.text.clone()
        }

        fn offset_at(&self, position: Position) -> usize {
            position.column
        }

        fn position_at(&self, offset: usize) -> Position {
            pos(offset)
        }

        fn revision(&self) -> u64 {
            self.revision
        }
    }

    impl SelectionHost for LineHost {
        fn selections(&self) -> Vec<Selection> {
            self.selections.clone()
        }

        fn set_selections(&mut self, selections: Vec<Selection>) {
            self.writes += 1;
            self.selections = selections;
        }
    }

    fn pos(column: usize) -> Position {
        Position::new(0, column)
    }

    fn sel(start: usize, end: usize) -> Selection {
        Selection::new(pos(start), pos(end))
    }

    fn range(start: usize, end: usize) -> Range {
        Range::new(pos(start), pos(end))
    }

    fn engine() -> IncrementalSearch {
        IncrementalSearch::new(shared_preferences(SearchPreferences::default()))
    }

    fn literal(term: &str) -> SearchOptions {
        SearchOptions::new().term(term).use_regex(false)
    }

    #[test]
    fn start_captures_selections_without_matching() {
        let host = LineHost::new("cat cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new().term("cat"));

        assert!(search.is_active());
        assert_eq!(search.search_term(), "cat");
        assert!(search.matched_ranges().is_empty());
        assert_eq!(search.selections(), vec![sel(0, 0)]);
    }

    #[test]
    fn update_while_idle_is_an_error() {
        let mut host = LineHost::new("cat", &[0]);
        let mut search = engine();
        assert_eq!(
            search.update(&mut host, &literal("cat")),
            Err(SearchError::Inactive)
        );
        assert_eq!(
            search.advance(&mut host, &literal("cat")),
            Err(SearchError::Inactive)
        );
        assert_eq!(host.writes, 0);
    }

    #[test]
    fn empty_term_falls_back_to_anchors() {
        let mut host = LineHost::new("abc abc", &[4, 1]);
        host.selections.push(sel(0, 2));
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        let outcome = search.update(&mut host, &SearchOptions::new().term("")).unwrap();
        assert!(outcome.stalled);
        let expected = normalize(&[sel(4, 4), sel(1, 1), sel(0, 2)]);
        assert_eq!(search.current_selections(), expected.as_slice());
        assert_eq!(outcome.matched_ranges, vec![range(0, 2), range(4, 4)]);
        assert!(!outcome.matched_groups);
    }

    #[test]
    fn advance_walks_through_literal_matches_without_wrapping() {
        let mut host = LineHost::new("cat cat cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &literal("cat")).unwrap();
        assert_eq!(host.selections, vec![sel(0, 3)]);

        search.advance(&mut host, &SearchOptions::new()).unwrap();
        assert_eq!(host.selections, vec![sel(4, 7)]);
        search.update(&mut host, &SearchOptions::new()).unwrap();
        assert_eq!(host.selections, vec![sel(4, 7)]);

        search.advance(&mut host, &SearchOptions::new()).unwrap();
        assert_eq!(host.selections, vec![sel(8, 11)]);
        search.update(&mut host, &SearchOptions::new()).unwrap();
        assert_eq!(host.selections, vec![sel(8, 11)]);

        let outcome = search.advance(&mut host, &SearchOptions::new()).unwrap();
        assert!(outcome.stalled);
        assert_eq!(host.selections, vec![sel(8, 11)]);
        assert_eq!(outcome.matched_ranges, vec![range(8, 11)]);
    }

    #[test]
    fn every_cursor_moves_independently() {
        let mut host = LineHost::new("ab ab ab ab", &[0, 4]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &literal("ab")).unwrap();
        assert_eq!(host.selections, vec![sel(0, 2), sel(6, 8)]);

        search.advance(&mut host, &SearchOptions::new()).unwrap();
        assert_eq!(host.selections, vec![sel(3, 5), sel(9, 11)]);
    }

    #[test]
    fn cursors_landing_on_the_same_match_merge() {
        let mut host = LineHost::new("xx cat", &[0, 1]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        let outcome = search.update(&mut host, &literal("cat")).unwrap();
        assert_eq!(host.selections, vec![sel(3, 6)]);
        assert_eq!(outcome.matched_ranges, vec![range(3, 6)]);
    }

    #[test]
    fn backward_search_and_advance() {
        let mut host = LineHost::new("cat cat cat", &[11]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &literal("cat").backward()).unwrap();
        assert_eq!(host.selections, vec![sel(8, 11)]);

        search.advance(&mut host, &SearchOptions::new().backward()).unwrap();
        assert_eq!(host.selections, vec![sel(4, 7)]);

        search.advance(&mut host, &SearchOptions::new().backward()).unwrap();
        assert_eq!(host.selections, vec![sel(0, 3)]);

        search.advance(&mut host, &SearchOptions::new().backward()).unwrap();
        assert_eq!(host.selections, vec![sel(0, 3)]);
    }

    #[test]
    fn capture_groups_split_into_selections() {
        let mut host = LineHost::new("ab", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        let outcome = search
            .update(&mut host, &SearchOptions::new().term("(a)(b)"))
            .unwrap();
        assert!(outcome.matched_groups);
        assert_eq!(outcome.matched_ranges, vec![range(0, 2)]);
        assert_eq!(host.selections, vec![sel(0, 1), sel(1, 2)]);
    }

    #[test]
    fn non_participating_groups_are_skipped() {
        let mut host = LineHost::new("key=value", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        let outcome = search
            .update(&mut host, &SearchOptions::new().term(r"(\w+)(:)?=(\w+)"))
            .unwrap();
        assert!(outcome.matched_groups);
        assert_eq!(host.selections, vec![sel(0, 3), sel(4, 9)]);
    }

    #[test]
    fn pattern_without_groups_selects_whole_match() {
        let mut host = LineHost::new("ab", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        let outcome = search.update(&mut host, &SearchOptions::new().term("ab")).unwrap();
        assert!(!outcome.matched_groups);
        assert_eq!(host.selections, vec![sel(0, 2)]);
    }

    #[test]
    fn invalid_pattern_rolls_back() {
        let mut host = LineHost::new("(cat) cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());
        search.update(&mut host, &SearchOptions::new().term("cat")).unwrap();

        let selections = search.current_selections().to_vec();
        let ranges = search.matched_ranges().to_vec();
        let writes = host.writes;

        let error = search
            .update(&mut host, &SearchOptions::new().term("(").use_regex(true))
            .unwrap_err();
        assert!(matches!(error, SearchError::PatternSyntax(_)));
        assert_eq!(search.current_selections(), selections.as_slice());
        assert_eq!(search.matched_ranges(), ranges.as_slice());
        assert_eq!(host.writes, writes);
        // The term stays so the user can keep typing.
        assert_eq!(search.search_term(), "(");

        search.update(&mut host, &SearchOptions::new().term("(c")).unwrap_err();
        search.update(&mut host, &SearchOptions::new().term(r"\(c")).unwrap();
        assert_eq!(host.selections, vec![sel(0, 2)]);
    }

    #[test]
    fn failed_advance_keeps_anchors() {
        let mut host = LineHost::new("cat cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());
        search.update(&mut host, &literal("cat")).unwrap();

        search
            .advance(&mut host, &SearchOptions::new().term("[").use_regex(true))
            .unwrap_err();
        assert_eq!(search.initial_selections(), &[sel(0, 0)]);
        assert_eq!(search.matched_ranges(), &[range(0, 3)]);
    }

    #[test]
    fn expand_accumulates_across_rounds() {
        let mut host = LineHost::new("one two one two", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search
            .update(&mut host, &literal("one").expand(true))
            .unwrap();
        assert_eq!(host.selections, vec![sel(0, 3)]);

        search
            .update(&mut host, &literal("two").expand(true))
            .unwrap();
        assert_eq!(search.selections(), vec![sel(0, 3), sel(4, 7)]);
        assert_eq!(host.selections, vec![sel(0, 3), sel(4, 7)]);

        search.advance(&mut host, &SearchOptions::new().expand(true)).unwrap();
        assert_eq!(search.selections(), vec![sel(0, 3), sel(4, 7), sel(12, 15)]);
        assert_eq!(search.current_selections(), &[sel(12, 15)]);
    }

    #[test]
    fn expand_merges_overlapping_results() {
        let mut host = LineHost::new("cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &literal("cat").expand(true)).unwrap();
        search.update(&mut host, &literal("at").expand(true)).unwrap();

        assert_eq!(search.current_selections(), &[sel(1, 3)]);
        assert_eq!(search.selections(), vec![sel(0, 3)]);
        assert_eq!(host.selections, vec![sel(0, 3)]);
    }

    #[test]
    fn round_without_expand_drops_aggregate() {
        let mut host = LineHost::new("one two one", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &literal("one").expand(true)).unwrap();
        search.update(&mut host, &literal("two").expand(true)).unwrap();
        assert!(!search.aggregated_selections().is_empty());

        search.update(&mut host, &SearchOptions::new()).unwrap();
        assert!(search.aggregated_selections().is_empty());
        assert_eq!(host.selections, vec![sel(4, 7)]);
    }

    #[test]
    fn cancel_restores_anchor_selections() {
        let mut host = LineHost::new("cat cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());
        search.update(&mut host, &literal("cat")).unwrap();

        search.cancel(&mut host);
        assert_eq!(host.selections, vec![sel(0, 0)]);
        assert_eq!(search.phase(), SearchPhase::Idle);
    }

    #[test]
    fn cancel_after_advance_restores_last_match() {
        let mut host = LineHost::new("cat cat cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());
        search.update(&mut host, &literal("cat")).unwrap();
        search.advance(&mut host, &SearchOptions::new()).unwrap();
        assert_eq!(host.selections, vec![sel(4, 7)]);

        search.cancel(&mut host);
        assert_eq!(host.selections, vec![sel(0, 3)]);
    }

    #[test]
    fn complete_keeps_selections() {
        let mut host = LineHost::new("cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());
        search.update(&mut host, &literal("cat")).unwrap();
        let writes = host.writes;

        search.complete();
        search.cancel(&mut host);
        assert!(!search.is_active());
        assert_eq!(host.writes, writes);
        assert_eq!(host.selections, vec![sel(0, 3)]);
    }

    #[test]
    fn interference_is_detected() {
        let mut host = LineHost::new("cat cat", &[0]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());
        assert_eq!(search.detect_interference(&host.selections, host.revision), None);

        search.update(&mut host, &literal("cat")).unwrap();
        assert_eq!(search.detect_interference(&host.selections, host.revision), None);

        assert_eq!(
            search.detect_interference(&[sel(2, 2)], host.revision),
            Some(Interference::SelectionsChanged)
        );
        assert_eq!(
            search.detect_interference(&host.selections, host.revision + 1),
            Some(Interference::TextChanged)
        );

        search.teardown();
        assert_eq!(search.detect_interference(&[], 99), None);
        assert_eq!(host.selections, vec![sel(0, 3)]);
    }

    #[test]
    fn toggles_update_preferences_and_search() {
        let preferences = shared_preferences(SearchPreferences::default());
        let mut host = LineHost::new("Cat cat", &[0]);
        let mut search = IncrementalSearch::new(preferences.clone());
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &SearchOptions::new().term("cat")).unwrap();
        assert_eq!(host.selections, vec![sel(4, 7)]);

        search.toggle_case_sensitivity(&mut host).unwrap();
        assert!(!preferences.read().case_sensitive);
        assert_eq!(host.selections, vec![sel(0, 3)]);

        search.toggle_regex(&mut host).unwrap();
        assert!(!preferences.read().use_regex);
        assert!(!search.uses_regex());

        let mut next = IncrementalSearch::new(preferences);
        next.start(&host, &SearchOptions::new());
        assert!(!next.is_case_sensitive());
        assert!(!next.uses_regex());
    }

    #[test]
    fn toggles_keep_search_direction() {
        let mut host = LineHost::new("cat Cat", &[7]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        search.update(&mut host, &literal("cat").backward()).unwrap();
        assert_eq!(host.selections, vec![sel(0, 3)]);

        let outcome = search.toggle_case_sensitivity(&mut host).unwrap();
        assert!(!outcome.stalled);
        assert_eq!(search.direction(), SearchDirection::Backward);
        assert_eq!(host.selections, vec![sel(4, 7)]);

        search.toggle_regex(&mut host).unwrap();
        assert_eq!(search.direction(), SearchDirection::Backward);
        assert_eq!(host.selections, vec![sel(4, 7)]);
    }

    #[test]
    fn zero_width_matches_count_as_no_match() {
        let mut host = LineHost::new("bbb", &[1]);
        let mut search = engine();
        search.start(&host, &SearchOptions::new());

        let outcome = search.update(&mut host, &SearchOptions::new().term("a*")).unwrap();
        assert_eq!(outcome.matched_ranges, vec![range(1, 1)]);
        assert_eq!(host.selections, vec![sel(1, 1)]);
    }
}
