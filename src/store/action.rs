//! Actions, outcomes and change events for the store transition function.

use crate::tab::{TabInit, TabPatch};
use crate::{TabId, WindowLabel};
use serde::{Deserialize, Serialize};

/// A single state transition request.
///
/// Every mutation of the store is expressed as one of these variants and
/// applied by [`StoreState::apply`](super::StoreState::apply), which settles
/// derived fields (dense indices and active flags) in the same pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Create an empty window if absent.
    EnsureWindow { window: WindowLabel },
    /// Create a tab if no tab with this id exists.
    EnsureTab {
        window: WindowLabel,
        tab: TabId,
        #[serde(default)]
        init: TabInit,
    },
    /// Delete a tab and repair its window's focus.
    RemoveTab { tab: TabId },
    /// Move a tab to a position in a (possibly different) window and focus it.
    MoveTab {
        tab: TabId,
        window: WindowLabel,
        index: Option<usize>,
    },
    /// Point a window's focus at one of its tabs.
    Focus { window: WindowLabel, tab: TabId },
    /// Record a navigation, truncating forward history.
    PushHistory { tab: TabId, url: String },
    /// Step one entry back in a tab's history.
    GoBack { tab: TabId },
    /// Step one entry forward in a tab's history.
    GoForward { tab: TabId },
    /// Merge partial metadata into a tab.
    UpdateTab { tab: TabId, patch: TabPatch },
}

impl Action {
    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Action::EnsureWindow { .. } => "ensure_window",
            Action::EnsureTab { .. } => "ensure_tab",
            Action::RemoveTab { .. } => "remove_tab",
            Action::MoveTab { .. } => "move_tab",
            Action::Focus { .. } => "focus",
            Action::PushHistory { .. } => "push_history",
            Action::GoBack { .. } => "go_back",
            Action::GoForward { .. } => "go_forward",
            Action::UpdateTab { .. } => "update_tab",
        }
    }
}

/// Focus value a window ended up with after a removal.
///
/// `NewFocus(None)` means the window lost its focus target (it is empty),
/// which is distinct from "focus did not change".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFocus(pub Option<TabId>);

impl NewFocus {
    /// The newly focused tab, if any.
    pub fn tab(&self) -> Option<&TabId> {
        self.0.as_ref()
    }
}

/// Result of applying an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action referenced unknown ids or changed nothing.
    Unchanged,
    /// State changed and there is nothing further to report.
    Applied,
    /// A removal moved the window's focus.
    Focus(NewFocus),
    /// A history step landed on this URL.
    Url(String),
}

impl Outcome {
    /// Returns `true` if the action changed state.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }

    /// The new focus reported by a removal.
    pub fn into_focus(self) -> Option<NewFocus> {
        match self {
            Outcome::Focus(focus) => Some(focus),
            _ => None,
        }
    }

    /// The URL reported by a history step.
    pub fn into_url(self) -> Option<String> {
        match self {
            Outcome::Url(url) => Some(url),
            _ => None,
        }
    }
}

/// Change notification broadcast to store subscribers.
///
/// One event is emitted per effective change; no-op actions emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEvent {
    /// A window record was created.
    WindowCreated { window: WindowLabel },
    /// A tab was created at `index` in `window`.
    TabCreated {
        window: WindowLabel,
        tab: TabId,
        index: usize,
    },
    /// A tab was deleted from `window`.
    TabRemoved { window: WindowLabel, tab: TabId },
    /// A tab changed window or position.
    TabMoved {
        tab: TabId,
        from: WindowLabel,
        to: WindowLabel,
        index: usize,
    },
    /// A window's focus pointer changed.
    FocusChanged {
        window: WindowLabel,
        tab: Option<TabId>,
    },
    /// A tab's history cursor moved or its history grew.
    HistoryChanged {
        tab: TabId,
        url: String,
        position: usize,
    },
    /// A tab's metadata (title, url, grouping) changed.
    TabUpdated { tab: TabId },
}
