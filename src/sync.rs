//! Seeds the store from the host and folds host-pushed events into it.

use crate::host::{HostError, HostEvent, TabEventKind, TabHost};
use crate::store::{Action, TabStore};
use crate::tab::{TabInit, TabPatch};
use crate::WindowLabel;
use tokio::sync::mpsc;

/// Bridges one host window and the store.
#[derive(Debug, Clone)]
pub struct SyncAdapter {
    store: TabStore,
    window: WindowLabel,
}

impl SyncAdapter {
    pub fn new(store: TabStore, window: impl Into<WindowLabel>) -> Self {
        Self {
            store,
            window: window.into(),
        }
    }

    /// The window this adapter mirrors.
    pub fn window(&self) -> &WindowLabel {
        &self.window
    }

    /// Seeds the store with the host's current tabs for this window.
    ///
    /// Tabs are inserted in host index order and the tab the host reports
    /// as active (or the first one) is focused. The whole seed is applied as
    /// one batch. Returns the number of tabs newly added to the store.
    pub async fn attach<H>(&self, host: &H) -> Result<usize, HostError>
    where
        H: TabHost + ?Sized,
    {
        let mut tabs = host.list_tabs(&self.window).await?;
        tabs.sort_by_key(|t| t.index);

        let focus = tabs
            .iter()
            .find(|t| t.is_active)
            .or_else(|| tabs.first())
            .map(|t| t.id.clone());

        let listed = tabs.len();
        let mut actions = vec![Action::EnsureWindow {
            window: self.window.clone(),
        }];
        actions.extend(tabs.into_iter().map(|info| Action::EnsureTab {
            window: self.window.clone(),
            tab: info.id,
            init: TabInit {
                index: None,
                url: Some(info.url),
                name: info.name,
                space_id: info.space_id,
                parent_id: info.parent_id,
            },
        }));
        if let Some(tab) = focus {
            actions.push(Action::Focus {
                window: self.window.clone(),
                tab,
            });
        }

        let seeded = self
            .store
            .apply_all(actions)
            .await
            .iter()
            .skip(1)
            .take(listed)
            .filter(|o| o.is_applied())
            .count();
        tracing::info!(window = %self.window, tabs = seeded, "attached to host window");
        Ok(seeded)
    }

    /// Folds one host event into the store.
    ///
    /// Host-reported URL changes overwrite the current history entry and
    /// never grow the history. Returns `true` if the store changed.
    pub async fn apply_event(&self, event: HostEvent) -> bool {
        let patch = match event.event {
            TabEventKind::TitleChanged => TabPatch {
                name: event.title,
                url: event.url,
                ..TabPatch::default()
            },
            TabEventKind::UrlChanged => TabPatch {
                url: event.url,
                ..TabPatch::default()
            },
        };
        if patch.is_empty() {
            tracing::debug!(tab = %event.tab_id, "host event without payload ignored");
            return false;
        }
        self.store
            .dispatch(Action::UpdateTab {
                tab: event.tab_id,
                patch,
            })
            .await
            .is_applied()
    }

    /// Applies every event already queued on `rx` without waiting.
    ///
    /// Returns the number of events consumed.
    pub async fn pump(&self, rx: &mut mpsc::UnboundedReceiver<HostEvent>) -> usize {
        let mut consumed = 0;
        while let Ok(event) = rx.try_recv() {
            self.apply_event(event).await;
            consumed += 1;
        }
        consumed
    }

    /// Applies events in arrival order until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<HostEvent>) {
        while let Some(event) = rx.recv().await {
            self.apply_event(event).await;
        }
        tracing::info!(window = %self.window, "host event channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    async fn host_with_tabs(
        urls: &[&str],
    ) -> (
        MemoryHost,
        mpsc::UnboundedReceiver<HostEvent>,
        Vec<crate::TabId>,
    ) {
        let (host, rx) = MemoryHost::new();
        host.open_window("main").await;
        let main = WindowLabel::from("main");
        let mut ids = Vec::new();
        for url in urls {
            ids.push(host.create_tab(&main, url, None).await.unwrap());
        }
        (host, rx, ids)
    }

    #[tokio::test]
    async fn test_attach_seeds_in_host_order() {
        let (host, _rx, ids) = host_with_tabs(&["https://a.test", "https://b.test"]).await;
        let store = TabStore::new();
        let adapter = SyncAdapter::new(store.clone(), "main");

        let seeded = adapter.attach(&host).await.unwrap();

        assert_eq!(seeded, 2);
        let tabs = store.window_tabs("main").await;
        let order: Vec<_> = tabs.iter().map(|t| t.id.clone()).collect();
        assert_eq!(order, ids);
        assert_eq!(tabs[1].url, "https://b.test");
        assert_eq!(tabs[1].history.entries(), &["https://b.test"]);
        store.check_invariants().await.unwrap();
    }

    #[tokio::test]
    async fn test_attach_focuses_host_active_tab() {
        let (host, _rx, ids) = host_with_tabs(&["https://a.test", "https://b.test"]).await;
        host.switch_tab(&WindowLabel::from("main"), &ids[1]).await.unwrap();
        let store = TabStore::new();

        SyncAdapter::new(store.clone(), "main").attach(&host).await.unwrap();

        assert_eq!(store.get_focus_tab("main").await, Some(ids[1].clone()));
        assert!(store.tab(ids[1].as_str()).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_attach_focuses_first_tab_without_active() {
        let (host, _rx, ids) = host_with_tabs(&["https://a.test", "https://b.test"]).await;
        let store = TabStore::new();

        SyncAdapter::new(store.clone(), "main").attach(&host).await.unwrap();

        assert_eq!(store.get_focus_tab("main").await, Some(ids[0].clone()));
    }

    #[tokio::test]
    async fn test_attach_empty_window_creates_window() {
        let (host, _rx, _ids) = host_with_tabs(&[]).await;
        let store = TabStore::new();

        let seeded = SyncAdapter::new(store.clone(), "main").attach(&host).await.unwrap();

        assert_eq!(seeded, 0);
        assert!(store.window("main").await.is_some());
        assert_eq!(store.get_focus_tab("main").await, None);
    }

    #[tokio::test]
    async fn test_attach_twice_adds_nothing() {
        let (host, _rx, _ids) = host_with_tabs(&["https://a.test"]).await;
        let store = TabStore::new();
        let adapter = SyncAdapter::new(store.clone(), "main");

        adapter.attach(&host).await.unwrap();
        let before = store.snapshot().await;
        let seeded = adapter.attach(&host).await.unwrap();

        assert_eq!(seeded, 0);
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_attach_propagates_host_error() {
        let (host, _rx) = MemoryHost::new();
        let store = TabStore::new();

        let err = SyncAdapter::new(store.clone(), "main")
            .attach(&host)
            .await
            .unwrap_err();

        assert_eq!(err, HostError::WindowNotFound(WindowLabel::from("main")));
        assert!(store.window("main").await.is_none());
    }

    #[tokio::test]
    async fn test_title_event_updates_name_and_url() {
        let (host, mut rx, ids) = host_with_tabs(&["https://a.test"]).await;
        let store = TabStore::new();
        let adapter = SyncAdapter::new(store.clone(), "main");
        adapter.attach(&host).await.unwrap();

        host.set_title(&ids[0], "Page A").await.unwrap();
        assert_eq!(adapter.pump(&mut rx).await, 1);

        let tab = store.tab(ids[0].as_str()).await.unwrap();
        assert_eq!(tab.name.as_deref(), Some("Page A"));
        assert_eq!(tab.url, "https://a.test");
    }

    #[tokio::test]
    async fn test_host_url_change_never_grows_history() {
        let (host, mut rx, ids) = host_with_tabs(&["https://a.test"]).await;
        let store = TabStore::new();
        let adapter = SyncAdapter::new(store.clone(), "main");
        adapter.attach(&host).await.unwrap();

        host.redirect(&ids[0], "https://a.test/home").await.unwrap();
        adapter.pump(&mut rx).await;

        let tab = store.tab(ids[0].as_str()).await.unwrap();
        assert_eq!(tab.url, "https://a.test/home");
        assert_eq!(tab.history.entries(), &["https://a.test/home"]);
    }

    #[tokio::test]
    async fn test_event_for_unknown_tab_is_ignored() {
        let store = TabStore::new();
        let adapter = SyncAdapter::new(store.clone(), "main");

        let changed = adapter
            .apply_event(HostEvent::url_changed("ghost", "https://x.test"))
            .await;

        assert!(!changed);
        assert!(store.tab("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_run_drains_until_channel_closes() {
        let (host, rx, ids) = host_with_tabs(&["https://a.test"]).await;
        let store = TabStore::new();
        let adapter = SyncAdapter::new(store.clone(), "main");
        adapter.attach(&host).await.unwrap();

        host.set_title(&ids[0], "One").await.unwrap();
        host.set_title(&ids[0], "Two").await.unwrap();
        drop(host);

        adapter.run(rx).await;

        let tab = store.tab(ids[0].as_str()).await.unwrap();
        assert_eq!(tab.name.as_deref(), Some("Two"));
    }
}
