//! Search across every collection.
//!
//! All items are flattened into one list tagged with their owning collection,
//! ranked by the fuzzy matcher over `"{title} {url}"`.

use std::time::{Duration, Instant};

use toby_domain::{Collection, Item};

use crate::config::SearchConfig;

/// An item together with the collection that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub item: Item,
    pub collection_id: String,
    pub collection_name: String,
}

impl SearchEntry {
    /// Text the matcher sees
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.item.title, self.item.url)
    }
}

/// Flattened snapshot of all items, in collection then item order
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    pub fn build(collections: &[Collection]) -> Self {
        let entries = collections
            .iter()
            .flat_map(|collection| {
                collection.items.iter().map(move |item| SearchEntry {
                    item: item.clone(),
                    collection_id: collection.id.clone(),
                    collection_name: collection.name.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matching entries, best first
    pub fn query(&self, query: &str) -> Vec<&SearchEntry> {
        toby_fuzzy::search(query, &self.entries, SearchEntry::searchable_text)
    }
}

/// State of the search overlay: query, ranked results and a cursor.
///
/// The cursor is `None` without results and clamps at both ends. Typed input
/// goes through [`input`](Self::input) and only runs once it has been idle for
/// the debounce delay; [`run`](Self::run) searches immediately.
#[derive(Debug, Clone)]
pub struct SearchSession {
    open: bool,
    query: String,
    results: Vec<SearchEntry>,
    cursor: Option<usize>,
    debounce: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            open: false,
            query: String::new(),
            results: Vec::new(),
            cursor: None,
            debounce: Duration::from_millis(config.debounce_ms),
            pending: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open with an empty query. Opening twice keeps the current state.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.reset();
        self.open = true;
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.reset();
        self.open = false;
    }

    fn reset(&mut self) {
        self.query.clear();
        self.results.clear();
        self.cursor = None;
        self.pending = None;
    }

    /// Record typed input. Each call restarts the debounce delay.
    pub fn input(&mut self, query: &str, now: Instant) {
        self.pending = Some((query.to_string(), now));
    }

    /// Run the pending input if it has settled; true when results were refreshed
    pub fn poll(&mut self, now: Instant, collections: &[Collection]) -> bool {
        let settled = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.debounce);
        if !settled {
            return false;
        }
        if let Some((query, _)) = self.pending.take() {
            self.run(&query, collections);
        }
        true
    }

    /// Input is waiting for the debounce delay
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchEntry] {
        &self.results
    }

    /// Re-run the search against the current collections.
    ///
    /// The query is trimmed; a blank query clears the results.
    pub fn run(&mut self, query: &str, collections: &[Collection]) -> &[SearchEntry] {
        self.pending = None;
        self.query = query.trim().to_string();
        self.results = if self.query.is_empty() {
            Vec::new()
        } else {
            SearchIndex::build(collections)
                .query(&self.query)
                .into_iter()
                .cloned()
                .collect()
        };
        self.cursor = if self.results.is_empty() { None } else { Some(0) };
        tracing::debug!("Search {:?}: {} result(s)", self.query, self.results.len());
        &self.results
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn move_down(&mut self) {
        if let Some(cursor) = self.cursor {
            self.cursor = Some((cursor + 1).min(self.results.len().saturating_sub(1)));
        }
    }

    pub fn move_up(&mut self) {
        if let Some(cursor) = self.cursor {
            self.cursor = Some(cursor.saturating_sub(1));
        }
    }

    /// Point the cursor at a result, e.g. on hover. Out-of-range is ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.results.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&SearchEntry> {
        self.cursor.and_then(|i| self.results.get(i))
    }
}

/// Detects two presses of a trigger key in quick succession.
///
/// A press within `window` of the previous one counts towards the pair; a
/// slower press starts a new count. The count resets after each detection.
#[derive(Debug, Clone)]
pub struct DoubleTapDetector {
    window: Duration,
    last_press: Option<Instant>,
    count: u32,
}

impl DoubleTapDetector {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_press: None,
            count: 0,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(Duration::from_millis(config.double_tap_window_ms))
    }

    /// Record a press; true when it completes a double tap
    pub fn press(&mut self, now: Instant) -> bool {
        let quick = self
            .last_press
            .is_some_and(|last| now.saturating_duration_since(last) < self.window);
        self.last_press = Some(now);

        if !quick {
            self.count = 1;
            return false;
        }

        self.count += 1;
        if self.count == 2 {
            self.count = 0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toby_domain::ItemDraft;

    fn item(title: &str, url: &str) -> Item {
        Item::from_draft(ItemDraft::new(title, url))
    }

    fn collections() -> Vec<Collection> {
        vec![
            Collection::with_id("c1", "Reading").with_items(vec![
                item("Rust Book", "https://doc.rust-lang.org/book"),
                item("Tokio", "https://tokio.rs"),
            ]),
            Collection::with_id("c2", "Tools").with_items(vec![item(
                "crates.io",
                "https://crates.io",
            )]),
        ]
    }

    #[test]
    fn test_index_flattens_with_owner() {
        let index = SearchIndex::build(&collections());
        assert_eq!(index.len(), 3);
        let last = &index.entries()[2];
        assert_eq!(last.collection_id, "c2");
        assert_eq!(last.collection_name, "Tools");
        assert_eq!(last.searchable_text(), "crates.io https://crates.io");
    }

    #[test]
    fn test_query_matches_url_too() {
        let index = SearchIndex::build(&collections());
        let hits = index.query("tokio");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.title, "Tokio");

        let hits = index.query("rust-lang");
        assert_eq!(hits[0].item.title, "Rust Book");
    }

    #[test]
    fn test_session_cursor_clamps() {
        let collections = collections();
        let mut session = SearchSession::new();
        session.open();
        assert!(session.is_open());

        // "rs" hits all three via the url or title
        assert_eq!(session.run("  rs ", &collections).len(), 3);
        assert_eq!(session.query(), "rs");
        assert_eq!(session.cursor(), Some(0));

        session.move_up();
        assert_eq!(session.cursor(), Some(0));
        session.move_down();
        session.move_down();
        session.move_down();
        assert_eq!(session.cursor(), Some(2));
        assert!(session.selected().is_some());

        assert!(!session.select(7));
        assert!(session.select(1));
        assert_eq!(session.cursor(), Some(1));
    }

    #[test]
    fn test_session_without_results() {
        let mut session = SearchSession::new();
        session.open();
        assert!(session.run("zzzz", &collections()).is_empty());
        assert_eq!(session.cursor(), None);
        session.move_down();
        assert_eq!(session.selected(), None);

        session.run("   ", &collections());
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_close_resets() {
        let mut session = SearchSession::new();
        session.open();
        session.run("tokio", &collections());
        session.close();
        assert!(!session.is_open());
        assert!(session.results().is_empty());
        assert_eq!(session.query(), "");
    }

    #[test]
    fn test_double_tap_within_window() {
        let window = Duration::from_millis(500);
        let mut detector = DoubleTapDetector::new(window);
        let start = Instant::now();

        assert!(!detector.press(start));
        assert!(detector.press(start + Duration::from_millis(200)));
        // count restarted after the detection
        assert!(!detector.press(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_typed_input_waits_for_debounce() {
        let config = SearchConfig {
            debounce_ms: 200,
            ..SearchConfig::default()
        };
        let collections = collections();
        let mut session = SearchSession::from_config(&config);
        session.open();
        let start = Instant::now();

        session.input("tok", start);
        session.input("tokio", start + Duration::from_millis(100));
        // 150ms after the first keystroke but only 50ms after the last
        assert!(!session.poll(start + Duration::from_millis(150), &collections));
        assert!(session.results().is_empty());

        assert!(session.poll(start + Duration::from_millis(300), &collections));
        assert_eq!(session.query(), "tokio");
        assert_eq!(session.results().len(), 1);
        assert!(!session.has_pending());
        assert!(!session.poll(start + Duration::from_millis(900), &collections));
    }

    #[test]
    fn test_close_drops_pending_input() {
        let mut session = SearchSession::new();
        session.open();
        let start = Instant::now();
        session.input("tokio", start);
        session.close();
        assert!(!session.poll(start + Duration::from_secs(1), &collections()));
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_double_tap_window_from_config() {
        let config = SearchConfig {
            double_tap_window_ms: 100,
            ..SearchConfig::default()
        };
        let mut detector = DoubleTapDetector::from_config(&config);
        let start = Instant::now();

        assert!(!detector.press(start));
        assert!(!detector.press(start + Duration::from_millis(150)));
        assert!(detector.press(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_slow_presses_do_not_trigger() {
        let mut detector = DoubleTapDetector::new(Duration::from_millis(500));
        let start = Instant::now();

        assert!(!detector.press(start));
        assert!(!detector.press(start + Duration::from_millis(600)));
        assert!(detector.press(start + Duration::from_millis(700)));
    }
}
