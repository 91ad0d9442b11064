//! Tab/window state store.
//!
//! [`TabStore`] is a cloneable handle over shared [`StoreState`]. Writes take
//! the lock, run one transition through [`StoreState::apply`], and broadcast
//! the resulting [`StoreEvent`]s to subscribers before releasing the lock, so
//! subscribers observe events in the order transitions were applied.
//!
//! No operation returns an error. Unknown ids are logged at debug level and
//! produce `None`, `false` or [`Outcome::Unchanged`].

use crate::tab::{Tab, TabInit, TabPatch, Window};
use crate::{TabId, WindowLabel};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

#[cfg(test)]
mod tests;

mod action;
mod state;

pub use action::{Action, NewFocus, Outcome, StoreEvent};
pub use state::{InvariantViolation, StoreSnapshot, StoreState};

/// Default capacity for the subscriber notification channel.
pub const DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

/// Shared handle to the tab/window state.
///
/// Cloning the handle shares both the state and the subscriber channel.
///
/// # Example
///
/// ```
/// use tabstore::{TabInit, TabStore};
///
/// #[tokio::main]
/// async fn main() {
///     let store = TabStore::new();
///     store.ensure_tab("main", "t1", TabInit::with_url("https://x")).await;
///     store.ensure_tab("main", "t2", TabInit::with_url("https://y")).await;
///     store.set_focus_tab("main", "t2").await;
///
///     let new_focus = store.remove_tab("t2").await;
///     assert_eq!(new_focus.and_then(|f| f.0).as_ref().map(|t| t.as_str()), Some("t1"));
///     assert!(store.tab("t2").await.is_none());
/// }
/// ```
#[derive(Clone)]
pub struct TabStore {
    state: Arc<RwLock<StoreState>>,
    update_tx: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for TabStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabStore")
            .field("state", &self.state)
            .field("subscriber_count", &self.update_tx.receiver_count())
            .finish()
    }
}

impl TabStore {
    /// Creates an empty store with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY)
    }

    /// Creates an empty store whose subscriber channel buffers `capacity`
    /// events. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (update_tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            state: Arc::new(RwLock::new(StoreState::new())),
            update_tx,
        }
    }

    /// Subscribes to change events.
    ///
    /// Receivers that fall more than the channel capacity behind lose the
    /// oldest events and observe `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.update_tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.update_tx.receiver_count()
    }

    /// Applies one action.
    pub async fn dispatch(&self, action: Action) -> Outcome {
        let mut state = self.state.write().await;
        let outcome = state.apply(action);
        self.broadcast(state.take_events());
        outcome
    }

    /// Applies a batch of actions under a single lock acquisition.
    ///
    /// Readers never observe a partially applied batch.
    pub async fn apply_all(&self, actions: impl IntoIterator<Item = Action>) -> Vec<Outcome> {
        let mut state = self.state.write().await;
        let outcomes = actions.into_iter().map(|a| state.apply(a)).collect();
        self.broadcast(state.take_events());
        outcomes
    }

    fn broadcast(&self, events: Vec<StoreEvent>) {
        for event in events {
            match self.update_tx.send(event) {
                Ok(count) => {
                    tracing::trace!("store event sent to {} subscribers", count);
                }
                Err(_) => {
                    tracing::trace!("no subscribers for store event");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Creates an empty window if absent.
    pub async fn ensure_window(&self, window: impl Into<WindowLabel>) {
        self.dispatch(Action::EnsureWindow {
            window: window.into(),
        })
        .await;
    }

    /// Creates a tab unless one with the same id already exists.
    ///
    /// The existing record is kept untouched on a repeated call, whatever
    /// `init` carries. The window is created first if needed.
    pub async fn ensure_tab(
        &self,
        window: impl Into<WindowLabel>,
        tab: impl Into<TabId>,
        init: TabInit,
    ) -> bool {
        self.dispatch(Action::EnsureTab {
            window: window.into(),
            tab: tab.into(),
            init,
        })
        .await
        .is_applied()
    }

    /// Removes a tab, repairing its window's focus and indices.
    ///
    /// Returns the window's new focus only when the focus value changed.
    /// `Some(NewFocus(None))` means the window no longer has a focused tab.
    pub async fn remove_tab(&self, tab: impl Into<TabId>) -> Option<NewFocus> {
        self.dispatch(Action::RemoveTab { tab: tab.into() })
            .await
            .into_focus()
    }

    /// Moves a tab into `window` at `index` (appended when `None`) and makes
    /// it that window's focus.
    pub async fn move_tab(
        &self,
        tab: impl Into<TabId>,
        window: impl Into<WindowLabel>,
        index: Option<usize>,
    ) -> bool {
        self.dispatch(Action::MoveTab {
            tab: tab.into(),
            window: window.into(),
            index,
        })
        .await
        .is_applied()
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Focuses `tab` in `window`; ignored unless the tab belongs there.
    pub async fn set_focus_tab(&self, window: impl Into<WindowLabel>, tab: impl Into<TabId>) {
        self.dispatch(Action::Focus {
            window: window.into(),
            tab: tab.into(),
        })
        .await;
    }

    /// The focused tab of `window`.
    pub async fn get_focus_tab(&self, window: &str) -> Option<TabId> {
        self.state.read().await.focus_of(window).cloned()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Records a navigation of `tab` to `url`.
    pub async fn push_history(&self, tab: impl Into<TabId>, url: impl Into<String>) {
        self.dispatch(Action::PushHistory {
            tab: tab.into(),
            url: url.into(),
        })
        .await;
    }

    /// Steps back and returns the new current URL.
    pub async fn go_back(&self, tab: impl Into<TabId>) -> Option<String> {
        self.dispatch(Action::GoBack { tab: tab.into() })
            .await
            .into_url()
    }

    /// Steps forward and returns the new current URL.
    pub async fn go_forward(&self, tab: impl Into<TabId>) -> Option<String> {
        self.dispatch(Action::GoForward { tab: tab.into() })
            .await
            .into_url()
    }

    /// The URL at the tab's history cursor.
    pub async fn get_current_url(&self, tab: &str) -> Option<String> {
        self.state.read().await.current_url(tab).map(str::to_string)
    }

    // ------------------------------------------------------------------
    // Bulk update
    // ------------------------------------------------------------------

    /// Merges metadata into a tab without touching its history length.
    pub async fn update_tab_data(&self, tab: impl Into<TabId>, patch: TabPatch) {
        self.dispatch(Action::UpdateTab {
            tab: tab.into(),
            patch,
        })
        .await;
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// A copy of one tab.
    pub async fn tab(&self, tab: &str) -> Option<Tab> {
        self.state.read().await.tab(tab).cloned()
    }

    /// A copy of one window.
    pub async fn window(&self, window: &str) -> Option<Window> {
        self.state.read().await.window(window).cloned()
    }

    /// The window owning `tab`.
    pub async fn window_of(&self, tab: &str) -> Option<WindowLabel> {
        self.state.read().await.window_of(tab).cloned()
    }

    /// Copies of a window's tabs in order.
    pub async fn window_tabs(&self, window: &str) -> Vec<Tab> {
        self.state
            .read()
            .await
            .window_tabs(window)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Ordered copy of the whole store.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot()
    }

    /// Verifies the structural invariants.
    pub async fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.state.read().await.check_invariants()
    }
}

impl Default for TabStore {
    fn default() -> Self {
        Self::new()
    }
}
