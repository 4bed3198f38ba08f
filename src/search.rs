//! Incremental fuzzy search over the names of the current listing.
//!
//! Two policies are supported. `Modal` searches from `/` until Esc or Enter.
//! `Timeout` treats every printable key as search input and starts a fresh
//! query once the previous one has been idle for the configured timeout.

use std::time::{Duration, Instant};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Modal,
    Timeout,
}

impl SearchMode {
    /// Parse the `[search] mode` config value; anything unknown is modal.
    pub fn from_name(s: &str) -> Self {
        match s {
            "timeout" | "fuzzy" => SearchMode::Timeout,
            _ => SearchMode::Modal,
        }
    }
}

/// Best match of a query among candidate names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub index: usize,
    /// Character positions of the matched letters inside the name.
    pub positions: Vec<usize>,
}

/// Current query and its timing.
#[derive(Debug)]
pub struct SearchState {
    pub mode: SearchMode,
    timeout: Duration,
    active: bool,
    query: String,
    last_input: Option<Instant>,
    /// Bumped on every keystroke; a delayed clear carrying an older value is stale.
    generation: u64,
    hit: Option<SearchHit>,
}

impl SearchState {
    pub fn new(mode: SearchMode, timeout: Duration) -> Self {
        Self {
            mode,
            timeout,
            active: false,
            query: String::new(),
            last_input: None,
            generation: 0,
            hit: None,
        }
    }

    /// Enter modal search with an empty query.
    pub fn start(&mut self) {
        self.active = true;
        self.query.clear();
        self.hit = None;
        self.generation += 1;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.query.clear();
        self.hit = None;
        self.last_input = None;
        self.generation += 1;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn hit(&self) -> Option<&SearchHit> {
        self.hit.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Add a typed character, returning the generation to pass to `expire`.
    pub fn push(&mut self, c: char, now: Instant) -> u64 {
        let idle = self
            .last_input
            .map(|t| now.saturating_duration_since(t) >= self.timeout)
            .unwrap_or(true);
        if self.mode == SearchMode::Timeout && idle {
            self.query.clear();
        }
        self.active = true;
        self.query.push(c);
        self.last_input = Some(now);
        self.generation += 1;
        self.generation
    }

    /// Remove the last character; returns false when the query was already empty.
    pub fn pop(&mut self) -> bool {
        self.generation += 1;
        self.query.pop().is_some()
    }

    /// Clear a timed-out query. Stale generations and modal searches are ignored.
    pub fn expire(&mut self, generation: u64) -> bool {
        if self.mode != SearchMode::Timeout || generation != self.generation || !self.active {
            return false;
        }
        self.stop();
        true
    }

    /// Match the query against `names` and remember the best hit.
    pub fn update<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Option<&SearchHit> {
        self.hit = best_match(&self.query, names);
        self.hit.as_ref()
    }
}

/// Highest scoring candidate; ties go to the earliest one.
pub fn best_match<'a>(query: &str, names: impl IntoIterator<Item = &'a str>) -> Option<SearchHit> {
    if query.is_empty() {
        return None;
    }
    let matcher = SkimMatcherV2::default();
    let mut best: Option<(i64, SearchHit)> = None;
    for (index, name) in names.into_iter().enumerate() {
        if let Some((score, positions)) = matcher.fuzzy_indices(name, query) {
            if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
                best = Some((score, SearchHit { index, positions }));
            }
        }
    }
    best.map(|(_, hit)| hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 5] = ["Cargo.toml", "README.md", "src", "search.rs", "target"];

    #[test]
    fn mode_from_config_string() {
        assert_eq!(SearchMode::from_name("timeout"), SearchMode::Timeout);
        assert_eq!(SearchMode::from_name("modal"), SearchMode::Modal);
        assert_eq!(SearchMode::from_name("whatever"), SearchMode::Modal);
    }

    #[test]
    fn best_match_finds_subsequence() {
        let hit = best_match("srch", NAMES).unwrap();
        assert_eq!(hit.index, 3);
        assert_eq!(hit.positions, vec![0, 3, 4, 5]);
    }

    #[test]
    fn no_match_and_empty_query() {
        assert_eq!(best_match("zzz", NAMES), None);
        assert_eq!(best_match("", NAMES), None);
    }

    #[test]
    fn modal_query_accumulates_regardless_of_time() {
        let mut search = SearchState::new(SearchMode::Modal, Duration::from_secs(1));
        let t = Instant::now();
        search.start();
        search.push('r', t);
        search.push('e', t + Duration::from_secs(5));
        assert_eq!(search.query(), "re");
        search.push('x', t);
        assert!(search.pop());
        assert_eq!(search.query(), "re");
        assert_eq!(search.update(NAMES).map(|h| h.index), Some(1));
    }

    #[test]
    fn timeout_restarts_after_idle() {
        let mut search = SearchState::new(SearchMode::Timeout, Duration::from_secs(1));
        let t = Instant::now();
        search.push('s', t);
        search.push('r', t + Duration::from_millis(300));
        assert_eq!(search.query(), "sr");
        search.push('t', t + Duration::from_millis(1500));
        assert_eq!(search.query(), "t");
    }

    #[test]
    fn stale_expiry_is_ignored() {
        let mut search = SearchState::new(SearchMode::Timeout, Duration::from_secs(1));
        let t = Instant::now();
        let first = search.push('s', t);
        let second = search.push('r', t);
        assert!(!search.expire(first));
        assert_eq!(search.query(), "sr");
        assert!(search.expire(second));
        assert_eq!(search.query(), "");
        assert!(!search.is_active());
    }

    #[test]
    fn modal_search_never_expires() {
        let mut search = SearchState::new(SearchMode::Modal, Duration::from_secs(1));
        search.start();
        let generation = search.push('x', Instant::now());
        assert!(!search.expire(generation));
        assert!(search.is_active());
    }
}
