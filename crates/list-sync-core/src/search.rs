//! Suggestion Search
//!
//! Debounced search bookkeeping. Each keystroke takes a new generation
//! token; a timer or a response carrying an older token is simply ignored,
//! which is how pending timers get cancelled and late results discarded.

use std::time::Duration;

use tracing::debug;

use crate::config::ClientConfig;
use crate::item::{Item, ItemState};

/// Generation token handed out per query change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchToken(u64);

/// What the caller should do after the query changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    /// Query too short: drop suggestions, no network call
    Clear,
    /// Wait `delay`, then call [`SuggestionSearch::fire`] with `token`
    Schedule { token: SearchToken, delay: Duration },
}

/// Search results split by lifecycle state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub archived: Vec<Item>,
    /// Everything still on the list (active and checked)
    pub active: Vec<Item>,
}

impl Suggestions {
    pub fn partition(items: Vec<Item>) -> Self {
        let (archived, active) = items
            .into_iter()
            .map(Item::normalized)
            .partition(|item| item.state == ItemState::Archived);
        Self { archived, active }
    }

    pub fn is_empty(&self) -> bool {
        self.archived.is_empty() && self.active.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionSearch {
    generation: u64,
    pending: Option<(SearchToken, String)>,
    min_len: usize,
    debounce: Duration,
}

impl SuggestionSearch {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            generation: 0,
            pending: None,
            min_len: config.min_query_len,
            debounce: config.search_debounce(),
        }
    }

    /// Record a new query. Supersedes any pending timer or in-flight search.
    pub fn input(&mut self, raw: &str) -> QueryAction {
        let token = self.next_token();
        let query = raw.trim();
        if query.chars().count() < self.min_len {
            self.pending = None;
            return QueryAction::Clear;
        }
        self.pending = Some((token, query.to_string()));
        QueryAction::Schedule {
            token,
            delay: self.debounce,
        }
    }

    /// Debounce timer elapsed. Returns the query to send, or None if the
    /// timer was superseded.
    pub fn fire(&mut self, token: SearchToken) -> Option<String> {
        match self.pending.take() {
            Some((pending, query)) if pending == token => Some(query),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// A search completed. Only the latest issued token is applied.
    pub fn accept(&self, token: SearchToken, items: Vec<Item>) -> Option<Suggestions> {
        if token != self.latest() {
            debug!(?token, latest = ?self.latest(), "stale search result discarded");
            return None;
        }
        Some(Suggestions::partition(items))
    }

    /// Drop whatever is pending or in flight
    pub fn cancel(&mut self) {
        self.next_token();
        self.pending = None;
    }

    pub fn latest(&self) -> SearchToken {
        SearchToken(self.generation)
    }

    fn next_token(&mut self) -> SearchToken {
        self.generation += 1;
        SearchToken(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::tests::make_item;

    fn search() -> SuggestionSearch {
        SuggestionSearch::new(&ClientConfig::default())
    }

    /// Simulates timers: every scheduled timer fires, superseded or not,
    /// and collects the network calls that would be issued.
    fn type_keys(search: &mut SuggestionSearch, keys: &[&str]) -> Vec<String> {
        let tokens: Vec<_> = keys
            .iter()
            .filter_map(|k| match search.input(k) {
                QueryAction::Schedule { token, .. } => Some(token),
                QueryAction::Clear => None,
            })
            .collect();
        tokens.into_iter().filter_map(|t| search.fire(t)).collect()
    }

    #[test]
    fn test_short_query_clears_without_call() {
        let mut s = search();
        assert_eq!(s.input(" L "), QueryAction::Clear);
        assert_eq!(s.input(""), QueryAction::Clear);
    }

    #[test]
    fn test_debounce_issues_one_call_for_latest_query() {
        let mut s = search();
        let calls = type_keys(&mut s, &["L", "Le"]);
        assert_eq!(calls, vec!["Le".to_string()]);
    }

    #[test]
    fn test_superseded_timer_does_nothing() {
        let mut s = search();
        let QueryAction::Schedule { token: first, delay } = s.input("Mi") else {
            panic!("expected schedule");
        };
        assert_eq!(delay, Duration::from_millis(300));
        let QueryAction::Schedule { token: second, .. } = s.input("Mil") else {
            panic!("expected schedule");
        };
        assert_eq!(s.fire(first), None);
        assert_eq!(s.fire(second).as_deref(), Some("Mil"));
        assert_eq!(s.fire(second), None);
    }

    #[test]
    fn test_only_latest_result_applies() {
        let mut s = search();
        let QueryAction::Schedule { token: early, .. } = s.input("Mi") else {
            panic!("expected schedule");
        };
        s.fire(early);
        let QueryAction::Schedule { token: late, .. } = s.input("Milk") else {
            panic!("expected schedule");
        };
        s.fire(late);

        let milk = make_item("1", "Milk", "Dairy", ItemState::Active, 0);
        // the newer request resolves first, the older one straggles in after
        assert!(s.accept(late, vec![milk.clone()]).is_some());
        assert!(s.accept(early, vec![milk]).is_none());
    }

    #[test]
    fn test_partition_by_state() {
        let suggestions = Suggestions::partition(vec![
            make_item("1", "Milk", "Dairy", ItemState::Archived, 0),
            make_item("2", "Milk", "Dairy", ItemState::Active, 1),
            make_item("3", "Milk chocolate", "Snacks", ItemState::Checked, 2),
        ]);
        assert_eq!(suggestions.archived.len(), 1);
        assert_eq!(suggestions.active.len(), 2);
    }

    #[test]
    fn test_cancel_discards_in_flight() {
        let mut s = search();
        let QueryAction::Schedule { token, .. } = s.input("Eggs") else {
            panic!("expected schedule");
        };
        s.fire(token);
        s.cancel();
        assert!(s.accept(token, Vec::new()).is_none());
    }
}
