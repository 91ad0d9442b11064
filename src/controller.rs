//! UI-facing tab commands.
//!
//! Each command waits for the host to acknowledge before it touches the
//! store. A failed round trip leaves the store exactly as it was.

use crate::host::{HistoryStep, HostError, TabHost};
use crate::store::TabStore;
use crate::tab::{Tab, TabInit};
use crate::{TabId, WindowLabel};
use std::sync::Arc;
use thiserror::Error;

/// Errors from controller commands.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The host rejected or did not acknowledge the command.
    #[error("host command failed: {0}")]
    Host(#[from] HostError),

    /// No tab was given and the window has no focused tab.
    #[error("no focused tab in window '{0}'")]
    NoFocusedTab(WindowLabel),
}

/// Issues tab commands for one window.
#[derive(Debug)]
pub struct TabController<H> {
    host: Arc<H>,
    store: TabStore,
    window: WindowLabel,
    default_url: String,
}

impl<H> Clone for TabController<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            store: self.store.clone(),
            window: self.window.clone(),
            default_url: self.default_url.clone(),
        }
    }
}

impl<H: TabHost> TabController<H> {
    pub fn new(
        store: TabStore,
        host: Arc<H>,
        window: impl Into<WindowLabel>,
        default_url: impl Into<String>,
    ) -> Self {
        Self {
            host,
            store,
            window: window.into(),
            default_url: default_url.into(),
        }
    }

    pub fn window(&self) -> &WindowLabel {
        &self.window
    }

    pub fn store(&self) -> &TabStore {
        &self.store
    }

    /// Opens a tab at the end of the window and focuses it.
    ///
    /// `url` falls back to the configured default.
    pub async fn add_tab(
        &self,
        url: Option<&str>,
        name: Option<&str>,
    ) -> Result<TabId, ControllerError> {
        let url = url.unwrap_or(self.default_url.as_str());
        let tab = self.host.create_tab(&self.window, url, name).await?;

        let init = TabInit {
            url: Some(url.to_string()),
            name: name.map(str::to_string),
            ..TabInit::default()
        };
        self.store.ensure_tab(&self.window, &tab, init).await;

        self.select_tab(&tab).await?;
        tracing::debug!(window = %self.window, tab = %tab, "tab added");
        Ok(tab)
    }

    /// Closes a tab. If the window's focus moves to another tab, the host
    /// is switched to it as well.
    pub async fn close_tab(&self, tab: &TabId) -> Result<(), ControllerError> {
        self.host.close_tab(&self.window, tab).await?;

        let new_focus = self.store.remove_tab(tab).await;
        if let Some(next) = new_focus.as_ref().and_then(|f| f.tab()) {
            self.select_tab(next).await?;
        }
        tracing::debug!(window = %self.window, tab = %tab, "tab closed");
        Ok(())
    }

    /// Shows `tab` and makes it the window's focus.
    pub async fn select_tab(&self, tab: &TabId) -> Result<(), ControllerError> {
        self.host.switch_tab(&self.window, tab).await?;
        self.store.set_focus_tab(&self.window, tab).await;
        Ok(())
    }

    /// Navigates `tab` (or the focused tab) to `url` and records it in the
    /// tab's history. A navigation the host treats as a reload records
    /// nothing.
    pub async fn navigate_tab(
        &self,
        url: &str,
        tab: Option<&TabId>,
    ) -> Result<(), ControllerError> {
        let tab = self.resolve(tab).await?;
        if self.host.navigate(&self.window, &tab, url).await? {
            self.store.push_history(&tab, url).await;
        }
        Ok(())
    }

    /// Steps `tab` (or the focused tab) through its history.
    ///
    /// Back and forward are mirrored in the store only when the host reports
    /// that its cursor moved. A reload leaves the store untouched.
    pub async fn step_history(
        &self,
        step: HistoryStep,
        tab: Option<&TabId>,
    ) -> Result<(), ControllerError> {
        let tab = self.resolve(tab).await?;
        if !self.host.step_history(&self.window, &tab, step).await? {
            return Ok(());
        }
        match step {
            HistoryStep::Back => {
                self.store.go_back(&tab).await;
            }
            HistoryStep::Forward => {
                self.store.go_forward(&tab).await;
            }
            HistoryStep::Reload => {}
        }
        Ok(())
    }

    pub async fn back_tab(&self, tab: Option<&TabId>) -> Result<(), ControllerError> {
        self.step_history(HistoryStep::Back, tab).await
    }

    pub async fn forward_tab(&self, tab: Option<&TabId>) -> Result<(), ControllerError> {
        self.step_history(HistoryStep::Forward, tab).await
    }

    pub async fn reload_tab(&self, tab: Option<&TabId>) -> Result<(), ControllerError> {
        self.step_history(HistoryStep::Reload, tab).await
    }

    /// The window's tabs in order.
    pub async fn tabs(&self) -> Vec<Tab> {
        self.store.window_tabs(self.window.as_str()).await
    }

    /// The window's focused tab.
    pub async fn active_tab(&self) -> Option<Tab> {
        let focus = self.store.get_focus_tab(self.window.as_str()).await?;
        self.store.tab(focus.as_str()).await
    }

    async fn resolve(&self, tab: Option<&TabId>) -> Result<TabId, ControllerError> {
        match tab {
            Some(tab) => Ok(tab.clone()),
            None => self
                .store
                .get_focus_tab(self.window.as_str())
                .await
                .ok_or_else(|| ControllerError::NoFocusedTab(self.window.clone())),
        }
    }
}
