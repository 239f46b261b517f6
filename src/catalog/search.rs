use std::time::{
    Duration,
    Instant,
};

use crate::core::{
    utils::text_matches_search,
    Item,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_CHARS: usize = 2;

/// `query` must already be normalized (see [`crate::core::utils::normalize_query`]).
pub fn matches_search(item: &Item, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    text_matches_search(item.name(), query) || text_matches_search(item.description(), query)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUpdate {
    Apply(String),
    Clear,
}

/// Holds back keystrokes until the input has been quiet for `delay`.
///
/// Driven by polling so the caller decides where time comes from. A new input replaces
/// whatever was pending.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    min_chars: usize,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_MIN_CHARS)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration, min_chars: usize) -> Self {
        Self { delay, min_chars, pending: None }
    }

    pub fn input(&mut self, text: &str, now: Instant) {
        self.pending = Some((text.to_string(), now + self.delay));
    }

    pub fn poll(&mut self, now: Instant) -> Option<SearchUpdate> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {}
            _ => return None,
        }

        let (text, _) = self.pending.take()?;
        if text.chars().count() >= self.min_chars {
            Some(SearchUpdate::Apply(text))
        } else {
            Some(SearchUpdate::Clear)
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending query fires, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}
