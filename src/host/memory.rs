//! In-process [`TabHost`] used by the replay driver and tests.
//!
//! Keeps its own per-window tab lists and navigation stacks, the way the
//! real host does, and pushes [`HostEvent`]s into an unbounded channel.

use super::{HistoryStep, HostError, HostEvent, TabHost, TabInfo};
use crate::{TabId, WindowLabel};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct HostTab {
    id: TabId,
    name: Option<String>,
    entries: Vec<String>,
    cursor: usize,
}

impl HostTab {
    fn current_url(&self) -> &str {
        self.entries.get(self.cursor).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Default)]
struct HostWindow {
    tabs: Vec<HostTab>,
    active: Option<TabId>,
}

impl HostWindow {
    fn tab_mut(&mut self, tab: &TabId) -> Result<&mut HostTab, HostError> {
        self.tabs
            .iter_mut()
            .find(|t| &t.id == tab)
            .ok_or_else(|| HostError::TabNotFound(tab.clone()))
    }
}

#[derive(Debug)]
struct HostState {
    windows: HashMap<WindowLabel, HostWindow>,
    available: bool,
}

impl HostState {
    fn check_available(&self) -> Result<(), HostError> {
        if self.available {
            Ok(())
        } else {
            Err(HostError::Unavailable)
        }
    }

    fn window_mut(&mut self, window: &WindowLabel) -> Result<&mut HostWindow, HostError> {
        self.check_available()?;
        self.windows
            .get_mut(window)
            .ok_or_else(|| HostError::WindowNotFound(window.clone()))
    }

    fn find_tab_mut(&mut self, tab: &TabId) -> Option<&mut HostTab> {
        self.windows
            .values_mut()
            .flat_map(|w| w.tabs.iter_mut())
            .find(|t| &t.id == tab)
    }
}

/// Host simulator with uuid tab ids and an event channel.
#[derive(Debug)]
pub struct MemoryHost {
    state: Mutex<HostState>,
    events_tx: mpsc::UnboundedSender<HostEvent>,
}

impl MemoryHost {
    /// Creates a host with no windows, returning it with the receiving end
    /// of its event channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let host = Self {
            state: Mutex::new(HostState {
                windows: HashMap::new(),
                available: true,
            }),
            events_tx,
        };
        (host, events_rx)
    }

    /// Opens an empty window. Opening an existing label is a no-op.
    pub async fn open_window(&self, window: impl Into<WindowLabel>) {
        let window = window.into();
        let mut state = self.state.lock().await;
        if !state.windows.contains_key(&window) {
            tracing::debug!(window = %window, "host window opened");
            state.windows.insert(window, HostWindow::default());
        }
    }

    /// Toggles whether commands are acknowledged.
    pub async fn set_available(&self, available: bool) {
        self.state.lock().await.available = available;
    }

    /// Simulates the page reporting a new title.
    pub async fn set_title(&self, tab: &TabId, title: impl Into<String>) -> Result<(), HostError> {
        let title = title.into();
        let mut state = self.state.lock().await;
        state.check_available()?;
        let host_tab = state
            .find_tab_mut(tab)
            .ok_or_else(|| HostError::TabNotFound(tab.clone()))?;
        host_tab.name = Some(title.clone());
        let url = host_tab.current_url().to_string();
        self.emit(HostEvent::title_changed(tab, title, url));
        Ok(())
    }

    /// Simulates a host-initiated URL change such as a redirect.
    ///
    /// The current entry is replaced rather than a new one pushed.
    pub async fn redirect(&self, tab: &TabId, url: &str) -> Result<(), HostError> {
        let url = parse_url(url)?;
        let mut state = self.state.lock().await;
        state.check_available()?;
        let host_tab = state
            .find_tab_mut(tab)
            .ok_or_else(|| HostError::TabNotFound(tab.clone()))?;
        let cursor = host_tab.cursor;
        match host_tab.entries.get_mut(cursor) {
            Some(entry) => *entry = url.clone(),
            None => {
                host_tab.entries.push(url.clone());
                host_tab.cursor = host_tab.entries.len() - 1;
            }
        }
        self.emit(HostEvent::url_changed(tab, url));
        Ok(())
    }

    fn emit(&self, event: HostEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::trace!("host event dropped, receiver closed");
        }
    }
}

fn parse_url(input: &str) -> Result<String, HostError> {
    url::Url::parse(input)
        .map(|_| input.to_string())
        .map_err(|e| HostError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl TabHost for MemoryHost {
    async fn list_tabs(&self, window: &WindowLabel) -> Result<Vec<TabInfo>, HostError> {
        let mut state = self.state.lock().await;
        let host_window = state.window_mut(window)?;
        let active = host_window.active.clone();
        Ok(host_window
            .tabs
            .iter()
            .enumerate()
            .map(|(index, t)| TabInfo {
                id: t.id.clone(),
                name: t.name.clone(),
                url: t.current_url().to_string(),
                index,
                is_active: active.as_ref() == Some(&t.id),
                space_id: None,
                parent_id: None,
            })
            .collect())
    }

    async fn create_tab(
        &self,
        window: &WindowLabel,
        url: &str,
        name: Option<&str>,
    ) -> Result<TabId, HostError> {
        let entries = if url.is_empty() {
            Vec::new()
        } else {
            vec![parse_url(url)?]
        };
        let mut state = self.state.lock().await;
        let host_window = state.window_mut(window)?;
        let id = TabId::new(Uuid::new_v4().to_string());
        host_window.tabs.push(HostTab {
            id: id.clone(),
            name: name.map(str::to_string),
            entries,
            cursor: 0,
        });
        tracing::debug!(window = %window, tab = %id, "host tab created");
        Ok(id)
    }

    async fn switch_tab(&self, window: &WindowLabel, tab: &TabId) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        let host_window = state.window_mut(window)?;
        host_window.tab_mut(tab)?;
        host_window.active = Some(tab.clone());
        Ok(())
    }

    async fn close_tab(&self, window: &WindowLabel, tab: &TabId) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        let host_window = state.window_mut(window)?;
        let position = host_window
            .tabs
            .iter()
            .position(|t| &t.id == tab)
            .ok_or_else(|| HostError::TabNotFound(tab.clone()))?;
        host_window.tabs.remove(position);
        if host_window.active.as_ref() == Some(tab) {
            host_window.active = None;
        }
        Ok(())
    }

    async fn navigate(
        &self,
        window: &WindowLabel,
        tab: &TabId,
        url: &str,
    ) -> Result<bool, HostError> {
        let url = parse_url(url)?;
        let mut state = self.state.lock().await;
        let host_tab = state.window_mut(window)?.tab_mut(tab)?;
        if host_tab.current_url() == url {
            tracing::debug!(tab = %tab, "navigate to current URL, reloading");
            return Ok(false);
        }
        let keep = if host_tab.entries.is_empty() {
            0
        } else {
            host_tab.cursor + 1
        };
        host_tab.entries.truncate(keep);
        host_tab.entries.push(url.clone());
        host_tab.cursor = host_tab.entries.len() - 1;
        self.emit(HostEvent::url_changed(tab, url));
        Ok(true)
    }

    async fn step_history(
        &self,
        window: &WindowLabel,
        tab: &TabId,
        step: HistoryStep,
    ) -> Result<bool, HostError> {
        let mut state = self.state.lock().await;
        let host_tab = state.window_mut(window)?.tab_mut(tab)?;
        let moved = match step {
            HistoryStep::Reload => false,
            HistoryStep::Back if host_tab.cursor > 0 => {
                host_tab.cursor -= 1;
                true
            }
            HistoryStep::Forward if host_tab.cursor + 1 < host_tab.entries.len() => {
                host_tab.cursor += 1;
                true
            }
            _ => false,
        };
        if moved {
            let url = host_tab.current_url().to_string();
            self.emit(HostEvent::url_changed(tab, url));
        }
        Ok(moved)
    }
}
