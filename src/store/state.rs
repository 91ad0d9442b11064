//! Plain, lock-free store state and its transition function.
//!
//! `StoreState` owns every tab and window record. All mutation goes through
//! [`StoreState::apply`], which performs one [`Action`] and then settles the
//! derived fields of each window it touched: every member's `index` equals
//! its position and `is_active` is set on exactly the focused tab.

use super::action::{Action, NewFocus, Outcome, StoreEvent};
use crate::tab::{Tab, TabInit, TabPatch, Window};
use crate::{TabId, WindowLabel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Tab, window and reverse-index maps plus the events of the last transition.
#[derive(Debug, Default)]
pub struct StoreState {
    tabs: HashMap<TabId, Tab>,
    windows: HashMap<WindowLabel, Window>,
    tab_to_window: HashMap<TabId, WindowLabel>,
    pending: Vec<StoreEvent>,
}

/// Ordered, comparable copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Every tab by id.
    pub tabs: BTreeMap<TabId, Tab>,
    /// Every window by label.
    pub windows: BTreeMap<WindowLabel, Window>,
    /// Owning window of every tab.
    pub tab_to_window: BTreeMap<TabId, WindowLabel>,
}

/// A broken structural invariant, reported by [`StoreState::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A window lists a tab with no record.
    #[error("window {window} lists unknown tab {tab}")]
    MissingTab { window: WindowLabel, tab: TabId },
    /// A tab's `index` differs from its position.
    #[error("tab {tab} has index {index} but sits at position {position} of {window}")]
    IndexMismatch {
        window: WindowLabel,
        tab: TabId,
        index: usize,
        position: usize,
    },
    /// The reverse index disagrees with window membership.
    #[error("tab {tab} is not owned by exactly one window")]
    ReverseIndex { tab: TabId },
    /// A window's focus points outside its own tabs.
    #[error("window {window} focuses non-member tab {tab}")]
    ForeignFocus { window: WindowLabel, tab: TabId },
    /// `is_active` disagrees with the owning window's focus.
    #[error("tab {tab} active flag disagrees with focus of {window}")]
    ActiveFlag { window: WindowLabel, tab: TabId },
    /// A tab's url differs from its current history entry.
    #[error("tab {tab} url differs from its current history entry")]
    UrlHistory { tab: TabId },
}

impl StoreState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one action and settles derived fields.
    ///
    /// Events describing the change are queued and can be collected with
    /// [`take_events`](Self::take_events).
    pub fn apply(&mut self, action: Action) -> Outcome {
        let name = action.name();
        let outcome = match action {
            Action::EnsureWindow { window } => applied(self.ensure_window(window)),
            Action::EnsureTab { window, tab, init } => applied(self.ensure_tab(window, tab, init)),
            Action::RemoveTab { tab } => self
                .remove_tab(tab.as_str())
                .unwrap_or(Outcome::Unchanged),
            Action::MoveTab { tab, window, index } => {
                applied(self.move_tab(tab.as_str(), window, index))
            }
            Action::Focus { window, tab } => applied(self.set_focus(window.as_str(), tab.as_str())),
            Action::PushHistory { tab, url } => applied(self.push_history(tab.as_str(), url)),
            Action::GoBack { tab } => self
                .step_history(tab.as_str(), Direction::Back)
                .map_or(Outcome::Unchanged, Outcome::Url),
            Action::GoForward { tab } => self
                .step_history(tab.as_str(), Direction::Forward)
                .map_or(Outcome::Unchanged, Outcome::Url),
            Action::UpdateTab { tab, patch } => applied(self.update_tab(tab.as_str(), patch)),
        };
        if !outcome.is_applied() {
            tracing::debug!(action = name, "store action had no effect");
        }
        outcome
    }

    /// Drains the events queued by previous transitions.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.pending)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Looks up a tab record.
    pub fn tab(&self, tab: &str) -> Option<&Tab> {
        self.tabs.get(tab)
    }

    /// Looks up a window record.
    pub fn window(&self, window: &str) -> Option<&Window> {
        self.windows.get(window)
    }

    /// The window that owns `tab`.
    pub fn window_of(&self, tab: &str) -> Option<&WindowLabel> {
        self.tab_to_window.get(tab)
    }

    /// A window's tabs in order. Empty for unknown windows.
    pub fn window_tabs(&self, window: &str) -> Vec<&Tab> {
        self.windows
            .get(window)
            .map(|w| w.tab_ids.iter().filter_map(|id| self.tabs.get(id)).collect())
            .unwrap_or_default()
    }

    /// The focused tab of a window.
    pub fn focus_of(&self, window: &str) -> Option<&TabId> {
        self.windows.get(window).and_then(|w| w.focus.as_ref())
    }

    /// The URL at a tab's history cursor.
    pub fn current_url(&self, tab: &str) -> Option<&str> {
        self.tabs.get(tab).and_then(|t| t.history.current_url())
    }

    /// Number of tab records.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Copies the store contents into ordered maps.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tabs: self
                .tabs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            windows: self
                .windows
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            tab_to_window: self
                .tab_to_window
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Verifies the structural invariants of the store.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut owners: HashMap<&TabId, usize> = HashMap::new();
        for (label, window) in &self.windows {
            for (position, id) in window.tab_ids.iter().enumerate() {
                *owners.entry(id).or_default() += 1;
                let tab = self
                    .tabs
                    .get(id)
                    .ok_or_else(|| InvariantViolation::MissingTab {
                        window: label.clone(),
                        tab: id.clone(),
                    })?;
                if tab.index != position {
                    return Err(InvariantViolation::IndexMismatch {
                        window: label.clone(),
                        tab: id.clone(),
                        index: tab.index,
                        position,
                    });
                }
                if tab.is_active != window.is_focused(id.as_str()) {
                    return Err(InvariantViolation::ActiveFlag {
                        window: label.clone(),
                        tab: id.clone(),
                    });
                }
                if self.tab_to_window.get(id) != Some(label) {
                    return Err(InvariantViolation::ReverseIndex { tab: id.clone() });
                }
            }
            if let Some(focus) = &window.focus {
                if !window.contains(focus.as_str()) {
                    return Err(InvariantViolation::ForeignFocus {
                        window: label.clone(),
                        tab: focus.clone(),
                    });
                }
            }
        }
        for id in self.tabs.keys().chain(self.tab_to_window.keys()) {
            if owners.get(id).copied() != Some(1) {
                return Err(InvariantViolation::ReverseIndex { tab: id.clone() });
            }
        }
        for tab in self.tabs.values() {
            if let Some(url) = tab.history.current_url() {
                if url != tab.url {
                    return Err(InvariantViolation::UrlHistory {
                        tab: tab.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    fn ensure_window(&mut self, window: WindowLabel) -> bool {
        if self.windows.contains_key(&window) {
            return false;
        }
        self.windows.insert(window.clone(), Window::default());
        self.pending.push(StoreEvent::WindowCreated { window });
        true
    }

    fn ensure_tab(&mut self, window: WindowLabel, tab: TabId, init: TabInit) -> bool {
        if self.tabs.contains_key(&tab) {
            tracing::debug!(%tab, "tab already tracked, keeping existing data");
            return false;
        }
        self.ensure_window(window.clone());
        let Some(record) = self.windows.get_mut(&window) else {
            return false;
        };
        let len = record.tab_ids.len();
        let index = init.index.map_or(len, |i| i.min(len));
        record.tab_ids.insert(index, tab.clone());

        self.tabs.insert(tab.clone(), Tab::new(tab.clone(), init));
        self.tab_to_window.insert(tab.clone(), window.clone());
        self.settle(&window);
        self.pending
            .push(StoreEvent::TabCreated { window, tab, index });
        true
    }

    /// Returns `None` for unknown tabs, otherwise the outcome of the removal.
    fn remove_tab(&mut self, tab: &str) -> Option<Outcome> {
        let Some(window) = self.tab_to_window.get(tab).cloned() else {
            tracing::debug!(tab, "remove of unknown tab ignored");
            return None;
        };
        let record = self.windows.get_mut(&window)?;
        let closed_index = record.position(tab)?;
        let old_focus = record.focus.clone();

        let removed = record.tab_ids.remove(closed_index);
        if record.tab_ids.is_empty() {
            record.focus = None;
        } else if record.is_focused(tab) {
            let slot = closed_index.min(record.tab_ids.len() - 1);
            record.focus = record.tab_ids.get(slot).cloned();
        }
        let new_focus = record.focus.clone();

        self.tabs.remove(tab);
        self.tab_to_window.remove(tab);
        self.settle(&window);
        self.pending.push(StoreEvent::TabRemoved {
            window: window.clone(),
            tab: removed,
        });

        if new_focus == old_focus {
            return Some(Outcome::Applied);
        }
        self.pending.push(StoreEvent::FocusChanged {
            window,
            tab: new_focus.clone(),
        });
        Some(Outcome::Focus(NewFocus(new_focus)))
    }

    fn move_tab(&mut self, tab: &str, target: WindowLabel, target_index: Option<usize>) -> bool {
        let Some(source) = self.tab_to_window.get(tab).cloned() else {
            tracing::debug!(tab, "move of untracked tab ignored");
            return false;
        };
        let Some(id) = self.tabs.get(tab).map(|t| t.id.clone()) else {
            return false;
        };
        let source_focus_before = self.focus_of(source.as_str()).cloned();
        let target_focus_before = self.focus_of(target.as_str()).cloned();

        let Some(from) = self.windows.get_mut(&source) else {
            tracing::debug!(tab, window = %source, "move from unknown window ignored");
            return false;
        };
        if source == target && from.is_focused(tab) {
            let remaining = from.tab_ids.len().saturating_sub(1);
            let index = target_index.map_or(remaining, |i| i.min(remaining));
            if from.tab_ids.iter().position(|t| t == &id) == Some(index) {
                tracing::debug!(tab, window = %source, "move to current position ignored");
                return false;
            }
        }
        from.tab_ids.retain(|t| t != &id);
        if from.is_focused(tab) {
            from.focus = from.tab_ids.first().cloned();
        }

        self.ensure_window(target.clone());
        let Some(to) = self.windows.get_mut(&target) else {
            return false;
        };
        let len = to.tab_ids.len();
        let index = target_index.map_or(len, |i| i.min(len));
        to.tab_ids.insert(index, id.clone());
        to.focus = Some(id.clone());
        self.tab_to_window.insert(id.clone(), target.clone());

        self.settle(&source);
        if source != target {
            self.settle(&target);
        }
        self.pending.push(StoreEvent::TabMoved {
            tab: id,
            from: source.clone(),
            to: target.clone(),
            index,
        });
        if source != target {
            self.note_focus_change(&source, source_focus_before);
        }
        self.note_focus_change(&target, target_focus_before);
        true
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    fn set_focus(&mut self, window: &str, tab: &str) -> bool {
        let Some(record) = self.windows.get_mut(window) else {
            tracing::debug!(window, tab, "focus on unknown window ignored");
            return false;
        };
        let Some(id) = self.tabs.get(tab).map(|t| t.id.clone()) else {
            tracing::debug!(window, tab, "focus on unknown tab ignored");
            return false;
        };
        if !record.contains(tab) {
            tracing::debug!(window, tab, "focus on tab owned by another window ignored");
            return false;
        }
        if record.is_focused(tab) {
            return false;
        }
        record.focus = Some(id.clone());
        let label = WindowLabel::from(window);
        self.settle(&label);
        self.pending.push(StoreEvent::FocusChanged {
            window: label,
            tab: Some(id),
        });
        true
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    fn push_history(&mut self, tab: &str, url: String) -> bool {
        let Some(record) = self.tabs.get_mut(tab) else {
            tracing::debug!(tab, "history push on unknown tab ignored");
            return false;
        };
        record.history.push(url.clone());
        record.url = url.clone();
        let position = record.history.current_index().unwrap_or_default();
        self.pending.push(StoreEvent::HistoryChanged {
            tab: record.id.clone(),
            url,
            position,
        });
        true
    }

    fn step_history(&mut self, tab: &str, direction: Direction) -> Option<String> {
        let record = self.tabs.get_mut(tab)?;
        let url = match direction {
            Direction::Back => record.history.back(),
            Direction::Forward => record.history.forward(),
        }?
        .to_string();
        record.url = url.clone();
        self.pending.push(StoreEvent::HistoryChanged {
            tab: record.id.clone(),
            url: url.clone(),
            position: record.history.current_index().unwrap_or_default(),
        });
        Some(url)
    }

    // ------------------------------------------------------------------
    // Bulk update
    // ------------------------------------------------------------------

    fn update_tab(&mut self, tab: &str, patch: TabPatch) -> bool {
        let Some(record) = self.tabs.get_mut(tab) else {
            tracing::debug!(tab, "update of unknown tab ignored");
            return false;
        };
        if !record.merge(patch) {
            return false;
        }
        self.pending.push(StoreEvent::TabUpdated {
            tab: record.id.clone(),
        });
        true
    }

    // ------------------------------------------------------------------
    // Derived fields
    // ------------------------------------------------------------------

    /// Recomputes `index` and `is_active` for every member of `window`.
    fn settle(&mut self, window: &WindowLabel) {
        let Some(record) = self.windows.get(window) else {
            return;
        };
        for (position, id) in record.tab_ids.iter().enumerate() {
            if let Some(tab) = self.tabs.get_mut(id) {
                tab.index = position;
                tab.is_active = record.focus.as_ref() == Some(id);
            }
        }
    }

    fn note_focus_change(&mut self, window: &WindowLabel, before: Option<TabId>) {
        let after = self.focus_of(window.as_str()).cloned();
        if after != before {
            self.pending.push(StoreEvent::FocusChanged {
                window: window.clone(),
                tab: after,
            });
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Back,
    Forward,
}

fn applied(changed: bool) -> Outcome {
    if changed {
        Outcome::Applied
    } else {
        Outcome::Unchanged
    }
}
