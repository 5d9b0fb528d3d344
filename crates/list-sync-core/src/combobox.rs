//! Combobox Controller
//!
//! Input-driven state machine behind the add/search field: builds the
//! option list from search suggestions, handles keyboard navigation and
//! turns a selection into a [`CommitAction`] for the mutation dispatcher.
//! The DOM layer only forwards events and renders this state.

use crate::config::ClientConfig;
use crate::error::SyncError;
use crate::item::Item;
use crate::search::{QueryAction, SearchToken, SuggestionSearch, Suggestions};

pub const ADD_NEW_OPTION_ID: &str = "add-new";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// "Recently Used": restoring brings the item back
    Archived,
    /// "Already in List": committing adds a duplicate
    Active,
    AddNew,
}

/// One row of the dropdown. Rebuilt from scratch on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboOption {
    pub id: String,
    pub kind: OptionKind,
    pub item: Option<Item>,
    pub label: String,
    pub sublabel: Option<String>,
}

/// What committing an option asks the dispatcher to do
#[derive(Debug, Clone, PartialEq)]
pub enum CommitAction {
    Restore(Item),
    Duplicate(Item),
    AddNew(String),
}

impl CommitAction {
    fn subject(&self) -> &str {
        match self {
            CommitAction::Restore(item) | CommitAction::Duplicate(item) => &item.name,
            CommitAction::AddNew(name) => name,
        }
    }

    pub fn success_message(&self, item: &Item) -> String {
        match self {
            CommitAction::Restore(_) => format!("Restored {}", item.name),
            CommitAction::Duplicate(_) => format!("Added another {}", item.name),
            CommitAction::AddNew(_) => format!("Added {}", item.name),
        }
    }

    pub fn failure_message(&self, error: &SyncError) -> String {
        let verb = match self {
            CommitAction::Restore(_) => "restore",
            CommitAction::Duplicate(_) | CommitAction::AddNew(_) => "add",
        };
        format!("Could not {} {}: {}", verb, self.subject(), error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Tab,
    Other,
}

impl ComboKey {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowDown" | "Down" => ComboKey::ArrowDown,
            "ArrowUp" | "Up" => ComboKey::ArrowUp,
            "Enter" => ComboKey::Enter,
            "Escape" | "Esc" => ComboKey::Escape,
            "Tab" => ComboKey::Tab,
            _ => ComboKey::Other,
        }
    }
}

/// Result of a keystroke: whether to suppress the browser default and
/// whether something should be committed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    pub prevent_default: bool,
    pub commit: Option<CommitAction>,
}

impl KeyOutcome {
    fn handled() -> Self {
        Self {
            prevent_default: true,
            commit: None,
        }
    }

    fn commit(action: CommitAction) -> Self {
        Self {
            prevent_default: true,
            commit: Some(action),
        }
    }
}

// ========================
// Pure helpers
// ========================

/// Archived matches, then active matches, then at most one add-new entry.
///
/// An exact (case-insensitive) archived match suppresses add-new unless an
/// active item matches exactly too, in which case it reads `Add another`.
pub fn build_options(query: &str, suggestions: &Suggestions) -> Vec<ComboOption> {
    let query = query.trim();
    let needle = query.to_lowercase();
    let matches = |item: &Item| item.name.trim().to_lowercase() == needle;

    let mut options: Vec<ComboOption> = suggestions
        .archived
        .iter()
        .map(|item| ComboOption {
            id: format!("archived-{}", item.id),
            kind: OptionKind::Archived,
            item: Some(item.clone()),
            label: item.name.clone(),
            sublabel: None,
        })
        .collect();

    options.extend(suggestions.active.iter().map(|item| ComboOption {
        id: format!("active-{}", item.id),
        kind: OptionKind::Active,
        item: Some(item.clone()),
        label: item.name.clone(),
        sublabel: Some("(add another)".to_string()),
    }));

    if query.is_empty() {
        return options;
    }
    let active_match = suggestions.active.iter().any(matches);
    let archived_match = suggestions.archived.iter().any(matches);
    if archived_match && !active_match {
        return options;
    }
    let label = if active_match {
        format!("Add another \"{}\"", query)
    } else {
        format!("Add \"{}\"", query)
    };
    options.push(ComboOption {
        id: ADD_NEW_OPTION_ID.to_string(),
        kind: OptionKind::AddNew,
        item: None,
        label,
        sublabel: None,
    });
    options
}

/// Screen-reader summary of the option list
pub fn live_summary(options: &[ComboOption]) -> String {
    let count = |kind| options.iter().filter(|o| o.kind == kind).count();
    let parts: Vec<String> = [
        (count(OptionKind::Archived), "recently used"),
        (count(OptionKind::Active), "already in list"),
        (count(OptionKind::AddNew), "add new"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, what)| format!("{} {}", n, what))
    .collect();

    if parts.is_empty() {
        "No suggestions available".to_string()
    } else {
        parts.join(", ")
    }
}

/// Dropdown height that fits below the input, clamped to the configured range
pub fn dropdown_max_height(viewport_height: f64, input_bottom: f64, config: &ClientConfig) -> f64 {
    let available = viewport_height - input_bottom - config.dropdown_margin;
    available.clamp(config.dropdown_min_height, config.dropdown_max_height)
}

// ========================
// Controller
// ========================

#[derive(Debug, Clone)]
pub struct Combobox {
    query: String,
    open: bool,
    highlighted: usize,
    options: Vec<ComboOption>,
    suggestions: Suggestions,
    search: SuggestionSearch,
    min_len: usize,
    announcement: Option<String>,
    /// Query text at the moment the in-flight commit was issued
    committed_query: Option<String>,
}

impl Combobox {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            query: String::new(),
            open: false,
            highlighted: 0,
            options: Vec::new(),
            suggestions: Suggestions::default(),
            search: SuggestionSearch::new(config),
            min_len: config.min_query_len,
            announcement: None,
            committed_query: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn options(&self) -> &[ComboOption] {
        &self.options
    }

    /// Latest live-region text
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    /// Id for `aria-activedescendant`
    pub fn active_descendant(&self) -> Option<&str> {
        if !self.open {
            return None;
        }
        self.options.get(self.highlighted).map(|o| o.id.as_str())
    }

    /// Text changed. Returns the search step the caller has to schedule.
    pub fn set_query(&mut self, text: &str) -> QueryAction {
        self.query = text.to_string();
        let action = self.search.input(text);
        self.open = text.trim().chars().count() >= self.min_len;
        if !self.open {
            self.suggestions = Suggestions::default();
        }
        self.rebuild();
        action
    }

    /// Debounce elapsed: the query to search for, if still current
    pub fn fire(&mut self, token: SearchToken) -> Option<String> {
        self.search.fire(token)
    }

    /// Search results arrived. Returns false when they were stale.
    pub fn receive(&mut self, token: SearchToken, items: Vec<Item>) -> bool {
        match self.search.accept(token, items) {
            Some(suggestions) => {
                self.suggestions = suggestions;
                self.rebuild();
                true
            }
            None => false,
        }
    }

    /// The search for `token` failed; show whatever the query alone allows
    pub fn search_failed(&mut self, token: SearchToken) {
        if token == self.search.latest() {
            self.suggestions = Suggestions::default();
            self.rebuild();
        }
    }

    pub fn key(&mut self, key: ComboKey) -> KeyOutcome {
        let outcome = self.key_outcome(key);
        if outcome.commit.is_some() {
            self.committed_query = Some(self.query.clone());
        }
        outcome
    }

    fn key_outcome(&mut self, key: ComboKey) -> KeyOutcome {
        if !self.open {
            return match key {
                ComboKey::Enter => match self.add_new_action() {
                    Some(action) => KeyOutcome::commit(action),
                    None => KeyOutcome::default(),
                },
                _ => KeyOutcome::default(),
            };
        }
        let len = self.options.len();
        match key {
            ComboKey::ArrowDown => {
                if len > 0 {
                    self.highlighted = (self.highlighted + 1) % len;
                }
                KeyOutcome::handled()
            }
            ComboKey::ArrowUp => {
                if len > 0 {
                    self.highlighted = (self.highlighted + len - 1) % len;
                }
                KeyOutcome::handled()
            }
            ComboKey::Enter => {
                let action = if len == 0 {
                    self.add_new_action()
                } else {
                    self.action_for(self.highlighted)
                };
                match action {
                    Some(action) => KeyOutcome::commit(action),
                    None => KeyOutcome::handled(),
                }
            }
            ComboKey::Escape => {
                self.open = false;
                KeyOutcome::handled()
            }
            // focus moves on, so the default is kept
            ComboKey::Tab => {
                self.open = false;
                KeyOutcome::default()
            }
            ComboKey::Other => KeyOutcome::default(),
        }
    }

    /// Pointer hover over an option
    pub fn highlight(&mut self, index: usize) {
        if index < self.options.len() {
            self.highlighted = index;
        }
    }

    /// Pointer click on an option
    pub fn select(&mut self, index: usize) -> Option<CommitAction> {
        self.highlight(index);
        let action = self.action_for(index);
        if action.is_some() {
            self.committed_query = Some(self.query.clone());
        }
        action
    }

    /// Explicit add button: add-new for the trimmed query, open or not
    pub fn add_current(&mut self) -> Option<CommitAction> {
        let action = self.add_new_action();
        if action.is_some() {
            self.committed_query = Some(self.query.clone());
        }
        action
    }

    /// Commit settled: announce the outcome and reset the field, unless the
    /// user has typed something else while the commit was in flight
    pub fn commit_succeeded(&mut self, action: &CommitAction, item: &Item) {
        let unchanged = self
            .committed_query
            .take()
            .map_or(true, |query| query == self.query);
        if unchanged {
            self.reset();
        }
        self.announcement = Some(action.success_message(item));
    }

    /// Commit rejected: keep the field as it is so the user can retry
    pub fn commit_failed(&mut self, action: &CommitAction, error: &SyncError) {
        self.committed_query = None;
        self.announcement = Some(action.failure_message(error));
    }

    /// Pointer-down outside the control. Returns true if anything was cleared.
    pub fn pointer_down_outside(&mut self) -> bool {
        if self.query.trim().is_empty() {
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.query.clear();
        self.open = false;
        self.highlighted = 0;
        self.options.clear();
        self.suggestions = Suggestions::default();
        self.search.cancel();
    }

    fn rebuild(&mut self) {
        self.highlighted = 0;
        if !self.open {
            self.options.clear();
            return;
        }
        let options = build_options(&self.query, &self.suggestions);
        if options != self.options || self.announcement.is_none() {
            self.announcement = Some(live_summary(&options));
        }
        self.options = options;
    }

    fn add_new_action(&self) -> Option<CommitAction> {
        let name = self.query.trim();
        (!name.is_empty()).then(|| CommitAction::AddNew(name.to_string()))
    }

    fn action_for(&self, index: usize) -> Option<CommitAction> {
        let option = self.options.get(index)?;
        match (option.kind, &option.item) {
            (OptionKind::Archived, Some(item)) => Some(CommitAction::Restore(item.clone())),
            (OptionKind::Active, Some(item)) => Some(CommitAction::Duplicate(item.clone())),
            (OptionKind::AddNew, _) => self.add_new_action(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::tests::make_item;
    use crate::item::ItemState;

    fn suggestions(archived: &[(&str, &str)], active: &[(&str, &str)]) -> Suggestions {
        Suggestions {
            archived: archived
                .iter()
                .map(|(id, name)| make_item(id, name, "Dairy", ItemState::Archived, 0))
                .collect(),
            active: active
                .iter()
                .map(|(id, name)| make_item(id, name, "Dairy", ItemState::Active, 0))
                .collect(),
        }
    }

    fn open_with(query: &str, items: Vec<Item>) -> Combobox {
        let mut combobox = Combobox::new(&ClientConfig::default());
        let QueryAction::Schedule { token, .. } = combobox.set_query(query) else {
            panic!("query should schedule a search");
        };
        assert!(combobox.fire(token).is_some());
        assert!(combobox.receive(token, items));
        combobox
    }

    #[test]
    fn test_archived_and_active_match_yields_add_another() {
        let options = build_options("Milk", &suggestions(&[("a", "Milk")], &[("b", "Milk")]));
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].kind, OptionKind::Archived);
        assert_eq!(options[0].id, "archived-a");
        assert_eq!(options[1].kind, OptionKind::Active);
        assert_eq!(options[1].sublabel.as_deref(), Some("(add another)"));
        assert_eq!(options[2].kind, OptionKind::AddNew);
        assert_eq!(options[2].label, "Add another \"Milk\"");
    }

    #[test]
    fn test_exact_archived_match_suppresses_add_new() {
        let options = build_options(
            " milk ",
            &suggestions(&[("a", "Milk")], &[("b", "Milk chocolate")]),
        );
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| o.kind != OptionKind::AddNew));
    }

    #[test]
    fn test_partial_archived_match_keeps_add_new() {
        let options = build_options("Mil", &suggestions(&[("a", "Milk")], &[]));
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].label, "Add \"Mil\"");
    }

    #[test]
    fn test_open_threshold() {
        let mut combobox = Combobox::new(&ClientConfig::default());
        assert_eq!(combobox.set_query("L"), QueryAction::Clear);
        assert!(!combobox.is_open());
        combobox.set_query("Le");
        assert!(combobox.is_open());
        combobox.set_query("L ");
        assert!(!combobox.is_open());
        assert!(combobox.options().is_empty());
    }

    #[test]
    fn test_arrow_keys_wrap_around() {
        let mut combobox = open_with(
            "Milk",
            vec![
                make_item("a", "Milk", "Dairy", ItemState::Archived, 0),
                make_item("b", "Milk", "Dairy", ItemState::Active, 0),
            ],
        );
        assert_eq!(combobox.options().len(), 3);
        assert_eq!(combobox.highlighted(), 0);
        assert!(combobox.key(ComboKey::ArrowUp).prevent_default);
        assert_eq!(combobox.highlighted(), 2);
        combobox.key(ComboKey::ArrowDown);
        assert_eq!(combobox.highlighted(), 0);
        combobox.key(ComboKey::ArrowDown);
        assert_eq!(combobox.active_descendant(), Some("active-b"));
    }

    #[test]
    fn test_enter_commits_highlighted_option() {
        let mut combobox = open_with(
            "Milk",
            vec![
                make_item("a", "Milk", "Dairy", ItemState::Archived, 0),
                make_item("b", "Milk", "Dairy", ItemState::Active, 0),
            ],
        );
        let restore = combobox.key(ComboKey::Enter).commit.unwrap();
        assert!(matches!(restore, CommitAction::Restore(ref item) if item.id.as_str() == "a"));

        combobox.key(ComboKey::ArrowDown);
        let duplicate = combobox.key(ComboKey::Enter).commit.unwrap();
        assert!(matches!(duplicate, CommitAction::Duplicate(ref item) if item.id.as_str() == "b"));

        combobox.key(ComboKey::ArrowDown);
        let add = combobox.key(ComboKey::Enter).commit.unwrap();
        assert_eq!(add, CommitAction::AddNew("Milk".into()));
    }

    #[test]
    fn test_escape_and_tab_close_without_commit() {
        let mut combobox = open_with("Eggs", Vec::new());
        let outcome = combobox.key(ComboKey::Escape);
        assert!(outcome.prevent_default);
        assert!(outcome.commit.is_none());
        assert!(!combobox.is_open());
        assert_eq!(combobox.query(), "Eggs");

        combobox.set_query("Eggs!");
        assert!(combobox.is_open());
        let outcome = combobox.key(ComboKey::Tab);
        assert!(!outcome.prevent_default);
        assert!(outcome.commit.is_none());
        assert!(!combobox.is_open());
    }

    #[test]
    fn test_enter_while_closed_adds_trimmed_query() {
        let mut combobox = Combobox::new(&ClientConfig::default());
        combobox.set_query(" B ");
        assert!(!combobox.is_open());
        let outcome = combobox.key(ComboKey::Enter);
        assert_eq!(outcome.commit, Some(CommitAction::AddNew("B".into())));

        combobox.set_query("   ");
        assert_eq!(combobox.key(ComboKey::Enter), KeyOutcome::default());
    }

    #[test]
    fn test_enter_before_results_adds_query() {
        let mut combobox = Combobox::new(&ClientConfig::default());
        combobox.set_query("Bread");
        assert!(combobox.is_open());
        assert!(combobox.options().iter().any(|o| o.kind == OptionKind::AddNew));
        let outcome = combobox.key(ComboKey::Enter);
        assert_eq!(outcome.commit, Some(CommitAction::AddNew("Bread".into())));
    }

    #[test]
    fn test_commit_success_resets_and_announces() {
        let mut combobox = open_with("Milk", Vec::new());
        let action = combobox.key(ComboKey::Enter).commit.unwrap();
        let item = make_item("n", "Milk", "Dairy", ItemState::Active, 0);
        combobox.commit_succeeded(&action, &item);
        assert_eq!(combobox.query(), "");
        assert!(!combobox.is_open());
        assert_eq!(combobox.highlighted(), 0);
        assert_eq!(combobox.announcement(), Some("Added Milk"));
    }

    #[test]
    fn test_commit_success_keeps_text_typed_meanwhile() {
        let mut combobox = open_with("Milk", Vec::new());
        let action = combobox.key(ComboKey::Enter).commit.unwrap();
        combobox.set_query("Eggs");

        let item = make_item("n", "Milk", "Dairy", ItemState::Active, 0);
        combobox.commit_succeeded(&action, &item);
        assert_eq!(combobox.query(), "Eggs");
        assert!(combobox.is_open());
        assert_eq!(combobox.announcement(), Some("Added Milk"));
    }

    #[test]
    fn test_add_button_matches_closed_enter() {
        let mut typed = Combobox::new(&ClientConfig::default());
        typed.set_query(" Bread ");
        let mut via_enter = typed.clone();
        assert_eq!(typed.add_current(), Some(CommitAction::AddNew("Bread".into())));
        assert_eq!(typed.add_current(), via_enter.key(ComboKey::Enter).commit);

        let mut blank = Combobox::new(&ClientConfig::default());
        blank.set_query("   ");
        assert_eq!(blank.add_current(), None);
    }

    #[test]
    fn test_commit_failure_keeps_query() {
        let mut combobox = open_with("Milk", Vec::new());
        let action = combobox.key(ComboKey::Enter).commit.unwrap();
        combobox.commit_failed(&action, &SyncError::Network("offline".into()));
        assert_eq!(combobox.query(), "Milk");
        assert!(combobox.is_open());
        assert_eq!(
            combobox.announcement(),
            Some("Could not add Milk: request failed: offline")
        );
    }

    #[test]
    fn test_pointer_down_outside() {
        let mut combobox = Combobox::new(&ClientConfig::default());
        assert!(!combobox.pointer_down_outside());
        combobox.set_query("Milk");
        assert!(combobox.pointer_down_outside());
        assert_eq!(combobox.query(), "");
        assert!(!combobox.is_open());
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut combobox = Combobox::new(&ClientConfig::default());
        let QueryAction::Schedule { token: old, .. } = combobox.set_query("Mi") else {
            panic!("expected schedule");
        };
        combobox.fire(old);
        combobox.set_query("Mil");
        let milk = make_item("a", "Milk", "Dairy", ItemState::Archived, 0);
        assert!(!combobox.receive(old, vec![milk]));
        assert!(combobox.options().iter().all(|o| o.kind == OptionKind::AddNew));
    }

    #[test]
    fn test_live_summary() {
        let options = build_options("Milk", &suggestions(&[("a", "Milk")], &[("b", "Milk"), ("c", "Milk")]));
        assert_eq!(live_summary(&options), "1 recently used, 2 already in list, 1 add new");
        assert_eq!(live_summary(&[]), "No suggestions available");

        let mut combobox = open_with("Milk", Vec::new());
        assert_eq!(combobox.announcement(), Some("1 add new"));
        combobox.receive(
            combobox.search.latest(),
            vec![make_item("a", "Milk", "Dairy", ItemState::Archived, 0)],
        );
        assert_eq!(combobox.announcement(), Some("1 recently used"));
    }

    #[test]
    fn test_dropdown_height_clamped() {
        let config = ClientConfig::default();
        assert_eq!(dropdown_max_height(900.0, 100.0, &config), 400.0);
        assert_eq!(dropdown_max_height(600.0, 300.0, &config), 284.0);
        assert_eq!(dropdown_max_height(400.0, 350.0, &config), 150.0);
    }
}
