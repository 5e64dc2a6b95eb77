use flume::Receiver;
use log::{debug, info, warn};
use multiseek_search::{
    IncrementalSearch, Interference, SearchDirection, SearchError, SearchHost, SearchOptions,
    SharedPreferences, UpdateOutcome,
};

use crate::config::PreferenceStore;
use crate::document::HostEvent;
use crate::status::{MatchIndicator, StatusLine};

/// Drives one search engine from user commands and host notifications, and
/// keeps the status line in step with it.
pub struct SearchController {
    search: IncrementalSearch,
    preferences: SharedPreferences,
    store: PreferenceStore,
    events: Receiver<HostEvent>,
    status: Option<StatusLine>,
}

impl SearchController {
    pub fn new(
        preferences: SharedPreferences,
        store: PreferenceStore,
        events: Receiver<HostEvent>,
    ) -> Self {
        Self {
            search: IncrementalSearch::new(preferences.clone()),
            preferences,
            store,
            events,
            status: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.search.is_active()
    }

    /// `None` while no session is running.
    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Drain host notifications and end the session if someone else moved
    /// the selections or edited the text.
    pub fn poll_host<H: SearchHost + ?Sized>(&mut self, host: &H) -> Option<Interference> {
        let mut notified = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                HostEvent::SelectionsChanged => debug!("host selections changed"),
                HostEvent::TextChanged { revision } => {
                    debug!("host text changed, now at revision {}", revision)
                }
            }
            notified = true;
        }
        if !notified {
            return None;
        }

        let interference = self
            .search
            .detect_interference(&host.selections(), host.revision())?;
        info!("ending incremental search: {:?}", interference);
        self.search.teardown();
        self.status = None;
        Some(interference)
    }

    /// Open a session, or jump every cursor to its next match when one is
    /// already running.
    pub fn advance<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
        direction: SearchDirection,
        expand: bool,
    ) -> Result<(), SearchError> {
        let options = SearchOptions::new().direction(direction).expand(expand);
        if !self.search.is_active() {
            self.search.start(&*host, &options);
            self.status = Some(StatusLine::from_search(
                &self.search,
                MatchIndicator::Normal,
            ));
            return Ok(());
        }

        let result = self.search.advance(host, &options);
        self.apply(result)
    }

    pub fn type_text<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<(), SearchError> {
        let term = format!("{}{}", self.search.search_term(), text);
        self.update_term(host, term)
    }

    pub fn backspace<H: SearchHost + ?Sized>(&mut self, host: &mut H) -> Result<(), SearchError> {
        let mut term = self.search.search_term().to_string();
        term.pop();
        self.update_term(host, term)
    }

    pub fn toggle_case_sensitivity<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<(), SearchError> {
        let result = self.search.toggle_case_sensitivity(host);
        self.save_preferences();
        self.apply(result)
    }

    pub fn toggle_regex<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<(), SearchError> {
        let result = self.search.toggle_regex(host);
        self.save_preferences();
        self.apply(result)
    }

    /// Put the host back on the current anchors and end the session.
    pub fn cancel<H: SearchHost + ?Sized>(&mut self, host: &mut H) {
        self.search.cancel(host);
        self.status = None;
    }

    pub fn complete(&mut self) {
        self.search.complete();
        self.status = None;
    }

    fn update_term<H: SearchHost + ?Sized>(
        &mut self,
        host: &mut H,
        term: String,
    ) -> Result<(), SearchError> {
        let options = SearchOptions::new()
            .term(term)
            .direction(self.search.direction());
        let result = self.search.update(host, &options);
        self.apply(result)
    }

    /// Pattern errors end up on the status line; only misuse is returned.
    fn apply(&mut self, result: Result<UpdateOutcome, SearchError>) -> Result<(), SearchError> {
        let indicator = match result {
            Ok(outcome) if outcome.stalled && !self.search.search_term().is_empty() => {
                MatchIndicator::NoMatch
            }
            Ok(_) => MatchIndicator::Normal,
            Err(SearchError::PatternSyntax(error)) => {
                debug!("{}", error);
                let summary = error.message().lines().last().unwrap_or_default();
                MatchIndicator::SyntaxError(summary.trim_start_matches("error: ").to_string())
            }
            Err(error) => return Err(error),
        };
        self.status = Some(StatusLine::from_search(&self.search, indicator));
        Ok(())
    }

    /// Toggles are only written on explicit request, so a failed write is
    /// reported and otherwise ignored.
    fn save_preferences(&self) {
        let preferences = *self.preferences.read();
        if let Err(error) = self.store.save(&preferences) {
            warn!("Could not save search preferences: {:#}", error);
        }
    }
}
