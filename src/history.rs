//! Navigation history for a single tab.
//!
//! A history is an ordered list of visited URLs plus a cursor. The cursor is
//! `None` until the first navigation. Navigating after stepping back drops
//! every entry ahead of the cursor, like a regular browser.

use serde::{Deserialize, Serialize};

/// Ordered URL history with a current-position cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    entries: Vec<String>,
    current: Option<usize>,
}

impl History {
    /// Creates an empty history with no current entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history holding a single entry, positioned on it.
    pub fn starting_at(url: impl Into<String>) -> Self {
        Self {
            entries: vec![url.into()],
            current: Some(0),
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Position of the current entry, or `None` before the first navigation.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The URL at the cursor.
    pub fn current_url(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no navigation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if [`back`](Self::back) would move the cursor.
    pub fn can_go_back(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    /// Returns `true` if [`forward`](Self::forward) would move the cursor.
    pub fn can_go_forward(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.entries.len())
    }

    /// Records a navigation to `url`.
    ///
    /// Entries after the cursor are discarded first, then `url` is appended
    /// and becomes current.
    pub fn push(&mut self, url: impl Into<String>) {
        let keep = self.current.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push(url.into());
        self.current = Some(self.entries.len() - 1);
    }

    /// Steps one entry back and returns the new current URL.
    ///
    /// Returns `None` and leaves the cursor untouched when already at the
    /// first entry or when the history is empty.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.current = self.current.map(|i| i - 1);
        self.current_url()
    }

    /// Steps one entry forward and returns the new current URL.
    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.current = self.current.map(|i| i + 1);
        self.current_url()
    }

    /// Rewrites the entry at the cursor without changing the history length.
    ///
    /// Returns `false` when there is no current entry.
    pub fn replace_current(&mut self, url: impl Into<String>) -> bool {
        match self.current.and_then(|i| self.entries.get_mut(i)) {
            Some(entry) => {
                *entry = url.into();
                true
            }
            None => false,
        }
    }
}
