//! Tests for the TabStore module.
//!
//! Tests are organized into categories:
//! - `membership`: ensure_window / ensure_tab
//! - `remove`: remove_tab and focus repair
//! - `move_tab`: cross-window and same-window moves
//! - `focus`: set_focus_tab / get_focus_tab and active flags
//! - `history`: push_history, go_back, go_forward, get_current_url
//! - `update`: update_tab_data
//! - `invariants`: structural invariants over operation sequences
//! - `subscriber`: broadcast channel and change events
//! - `concurrent`: shared handles across tasks

mod remove;

use super::TabStore;
use crate::tab::TabInit;

/// Builds a store holding `ids` in `window`, in order, each with a URL
/// derived from its id. No tab is focused.
pub(super) async fn store_with_tabs(window: &str, ids: &[&str]) -> TabStore {
    let store = TabStore::new();
    for id in ids {
        store
            .ensure_tab(window, *id, TabInit::with_url(format!("https://{}.test", id)))
            .await;
    }
    store
}

/// Ids of a window's tabs in order.
pub(super) async fn order_of(store: &TabStore, window: &str) -> Vec<String> {
    store
        .window(window)
        .await
        .map(|w| w.tab_ids.iter().map(|t| t.to_string()).collect())
        .unwrap_or_default()
}

/// `(id, index)` pairs of a window's tabs in order.
pub(super) async fn indices_of(store: &TabStore, window: &str) -> Vec<(String, usize)> {
    store
        .window_tabs(window)
        .await
        .into_iter()
        .map(|t| (t.id.to_string(), t.index))
        .collect()
}
