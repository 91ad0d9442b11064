//! remove_tab tests, including focus repair.

use super::{indices_of, order_of, store_with_tabs, TabStore};
use crate::store::NewFocus;
use crate::tab::TabInit;
use crate::TabId;

fn focus(id: &str) -> Option<NewFocus> {
    Some(NewFocus(Some(TabId::from(id))))
}

// =========================================================================
// Unknown ids
// =========================================================================

#[tokio::test]
async fn test_remove_unknown_tab_returns_none() {
    let store = store_with_tabs("main", &["a"]).await;
    let before = store.snapshot().await;

    assert_eq!(store.remove_tab("ghost").await, None);
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn test_remove_twice_second_is_noop() {
    let store = store_with_tabs("main", &["a", "b"]).await;
    store.remove_tab("a").await;
    let after_first = store.snapshot().await;

    assert_eq!(store.remove_tab("a").await, None);
    assert_eq!(store.snapshot().await, after_first);
}

// =========================================================================
// Record cleanup and reindexing
// =========================================================================

#[tokio::test]
async fn test_remove_deletes_record_and_reverse_entry() {
    let store = store_with_tabs("main", &["a", "b"]).await;
    store.remove_tab("a").await;

    assert!(store.tab("a").await.is_none());
    assert!(store.window_of("a").await.is_none());
    assert_eq!(order_of(&store, "main").await, vec!["b"]);
}

#[tokio::test]
async fn test_remove_reindexes_remaining_tabs() {
    let store = store_with_tabs("main", &["a", "b", "c", "d"]).await;
    store.remove_tab("b").await;

    assert_eq!(
        indices_of(&store, "main").await,
        vec![("a".into(), 0), ("c".into(), 1), ("d".into(), 2)]
    );
}

#[tokio::test]
async fn test_remove_leaves_other_windows_untouched() {
    let store = store_with_tabs("main", &["a", "b"]).await;
    store.ensure_tab("side", "x", TabInit::default()).await;
    store.set_focus_tab("side", "x").await;
    let side_before = store.window("side").await;

    store.remove_tab("a").await;

    assert_eq!(store.window("side").await, side_before);
}

// =========================================================================
// Focus repair
// =========================================================================

#[tokio::test]
async fn test_remove_focused_middle_tab_focuses_same_slot() {
    let store = store_with_tabs("main", &["T0", "T1", "T2"]).await;
    store.set_focus_tab("main", "T1").await;

    let new_focus = store.remove_tab("T1").await;

    assert_eq!(new_focus, focus("T2"));
    assert_eq!(store.get_focus_tab("main").await, Some(TabId::from("T2")));
    assert_eq!(
        indices_of(&store, "main").await,
        vec![("T0".into(), 0), ("T2".into(), 1)]
    );
    assert!(store.tab("T2").await.unwrap().is_active);
}

#[tokio::test]
async fn test_remove_focused_last_tab_clamps_to_new_last() {
    let store = store_with_tabs("main", &["a", "b", "c"]).await;
    store.set_focus_tab("main", "c").await;

    assert_eq!(store.remove_tab("c").await, focus("b"));
    assert_eq!(store.get_focus_tab("main").await, Some(TabId::from("b")));
}

#[tokio::test]
async fn test_remove_focused_first_tab_focuses_next() {
    let store = store_with_tabs("main", &["a", "b"]).await;
    store.set_focus_tab("main", "a").await;

    assert_eq!(store.remove_tab("a").await, focus("b"));
}

#[tokio::test]
async fn test_remove_unfocused_tab_reports_no_focus_change() {
    let store = store_with_tabs("main", &["a", "b", "c"]).await;
    store.set_focus_tab("main", "a").await;

    assert_eq!(store.remove_tab("c").await, None);
    assert_eq!(store.get_focus_tab("main").await, Some(TabId::from("a")));
    assert!(store.tab("a").await.unwrap().is_active);
}

#[tokio::test]
async fn test_remove_only_focused_tab_reports_focus_cleared() {
    let store = store_with_tabs("main", &["solo"]).await;
    store.set_focus_tab("main", "solo").await;

    assert_eq!(store.remove_tab("solo").await, Some(NewFocus(None)));
    assert_eq!(store.get_focus_tab("main").await, None);
    assert!(store.window("main").await.unwrap().tab_ids.is_empty());
}

#[tokio::test]
async fn test_remove_only_unfocused_tab_reports_no_change() {
    let store = store_with_tabs("main", &["solo"]).await;

    assert_eq!(store.remove_tab("solo").await, None);
    assert_eq!(store.get_focus_tab("main").await, None);
}

#[tokio::test]
async fn test_end_to_end_remove_focused_of_two() {
    let store = TabStore::new();
    store
        .ensure_tab("winA", "t1", TabInit::with_url("https://x"))
        .await;
    store
        .ensure_tab("winA", "t2", TabInit::with_url("https://y"))
        .await;
    store.set_focus_tab("winA", "t2").await;

    let new_focus = store.remove_tab("t2").await;

    assert_eq!(new_focus, focus("t1"));
    assert_eq!(store.get_focus_tab("winA").await, Some(TabId::from("t1")));
    assert!(store.tab("t2").await.is_none());
}
