//! Scripted replay of UI commands against an in-memory host.
//!
//! A script is JSON Lines: one [`Step`] object per line, tagged by `op`.
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! # open two tabs, go back on the first
//! {"op":"open","url":"https://a.test"}
//! {"op":"open","url":"https://b.test","name":"B"}
//! {"op":"navigate","url":"https://a.test/next","at":0}
//! {"op":"back","at":0}
//! {"op":"close"}
//! ```
//!
//! `at` addresses a tab by its position in the replay window. When omitted,
//! the step targets the focused tab.

use crate::controller::{ControllerError, TabController};
use crate::host::{HostError, HostEvent, MemoryHost};
use crate::store::TabStore;
use crate::sync::SyncAdapter;
use crate::{TabId, WindowLabel};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// One scripted command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    /// Open a tab at the end of the window.
    Open {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    /// Close a tab.
    Close {
        #[serde(default)]
        at: Option<usize>,
    },
    /// Focus the tab at a position.
    Select { at: usize },
    /// Load a URL, recording it in the tab's history.
    Navigate {
        url: String,
        #[serde(default)]
        at: Option<usize>,
    },
    /// Step back in the tab's history.
    Back {
        #[serde(default)]
        at: Option<usize>,
    },
    /// Step forward in the tab's history.
    Forward {
        #[serde(default)]
        at: Option<usize>,
    },
    /// Reload the current page.
    Reload {
        #[serde(default)]
        at: Option<usize>,
    },
    /// The page reports a new title.
    Title {
        title: String,
        #[serde(default)]
        at: Option<usize>,
    },
    /// Move a tab into another window. Store-only; the host has no
    /// cross-window command.
    Move {
        window: String,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        at: Option<usize>,
    },
}

/// Errors raised while replaying a script. Line numbers are one-based.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: invalid step")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: no tab at position {at}")]
    NoTabAt { line: usize, at: usize },

    #[error("line {line}: command failed")]
    Controller {
        line: usize,
        #[source]
        source: ControllerError,
    },

    #[error("failed to attach to host window")]
    Attach(#[source] HostError),

    #[error("failed to read script: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Drives a [`TabController`] over a [`MemoryHost`] and keeps the store in
/// sync with host events after every step.
pub struct Replayer {
    controller: TabController<MemoryHost>,
    host: Arc<MemoryHost>,
    adapter: SyncAdapter,
    events: mpsc::UnboundedReceiver<HostEvent>,
}

impl Replayer {
    /// Opens `window` on a fresh host and attaches it to `store`.
    pub async fn new(
        store: TabStore,
        window: impl Into<WindowLabel>,
        default_url: impl Into<String>,
    ) -> Result<Self, ReplayError> {
        let window = window.into();
        let (host, events) = MemoryHost::new();
        host.open_window(&window).await;
        let host = Arc::new(host);

        let adapter = SyncAdapter::new(store.clone(), &window);
        adapter
            .attach(host.as_ref())
            .await
            .map_err(ReplayError::Attach)?;

        let controller = TabController::new(store, Arc::clone(&host), window, default_url);
        Ok(Self {
            controller,
            host,
            adapter,
            events,
        })
    }

    /// The controller steps are issued through.
    pub fn controller(&self) -> &TabController<MemoryHost> {
        &self.controller
    }

    /// Reads and runs a script file.
    pub async fn run_file(&mut self, path: &Path) -> Result<usize, ReplayError> {
        let script = std::fs::read_to_string(path).map_err(|e| ReplayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.run_script(&script).await
    }

    /// Runs every step of `script`, stopping at the first failure.
    ///
    /// Returns the number of steps executed.
    pub async fn run_script(&mut self, script: &str) -> Result<usize, ReplayError> {
        let mut executed = 0;
        for (idx, raw) in script.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let step: Step = serde_json::from_str(trimmed)
                .map_err(|source| ReplayError::Parse { line, source })?;
            self.run_step(line, step).await?;
            executed += 1;
        }
        tracing::info!(steps = executed, "replay finished");
        Ok(executed)
    }

    /// Runs one step and folds the resulting host events into the store.
    pub async fn run_step(&mut self, line: usize, step: Step) -> Result<(), ReplayError> {
        tracing::debug!(line, ?step, "replay step");
        let ctl = &self.controller;
        let result = match step {
            Step::Open { url, name } => ctl
                .add_tab(url.as_deref(), name.as_deref())
                .await
                .map(|_| ()),
            Step::Close { at } => {
                let tab = self.target(line, at).await?;
                ctl.close_tab(&tab).await
            }
            Step::Select { at } => {
                let tab = self.tab_at(line, at).await?;
                ctl.select_tab(&tab).await
            }
            Step::Navigate { url, at } => {
                let tab = self.optional_tab_at(line, at).await?;
                ctl.navigate_tab(&url, tab.as_ref()).await
            }
            Step::Back { at } => {
                let tab = self.optional_tab_at(line, at).await?;
                ctl.back_tab(tab.as_ref()).await
            }
            Step::Forward { at } => {
                let tab = self.optional_tab_at(line, at).await?;
                ctl.forward_tab(tab.as_ref()).await
            }
            Step::Reload { at } => {
                let tab = self.optional_tab_at(line, at).await?;
                ctl.reload_tab(tab.as_ref()).await
            }
            Step::Title { title, at } => {
                let tab = self.target(line, at).await?;
                self.host
                    .set_title(&tab, title)
                    .await
                    .map_err(ControllerError::from)
            }
            Step::Move { window, index, at } => {
                let tab = self.target(line, at).await?;
                ctl.store().move_tab(&tab, window, index).await;
                match ctl.store().get_focus_tab(ctl.window().as_str()).await {
                    Some(focus) => ctl.select_tab(&focus).await,
                    None => Ok(()),
                }
            }
        };
        result.map_err(|source| ReplayError::Controller { line, source })?;
        self.adapter.pump(&mut self.events).await;
        Ok(())
    }

    async fn tab_at(&self, line: usize, at: usize) -> Result<TabId, ReplayError> {
        self.controller
            .tabs()
            .await
            .into_iter()
            .nth(at)
            .map(|t| t.id)
            .ok_or(ReplayError::NoTabAt { line, at })
    }

    async fn optional_tab_at(
        &self,
        line: usize,
        at: Option<usize>,
    ) -> Result<Option<TabId>, ReplayError> {
        match at {
            Some(at) => self.tab_at(line, at).await.map(Some),
            None => Ok(None),
        }
    }

    /// The tab at `at`, or the focused tab.
    async fn target(&self, line: usize, at: Option<usize>) -> Result<TabId, ReplayError> {
        match at {
            Some(at) => self.tab_at(line, at).await,
            None => self
                .controller
                .active_tab()
                .await
                .map(|t| t.id)
                .ok_or_else(|| ReplayError::Controller {
                    line,
                    source: ControllerError::NoFocusedTab(self.controller.window().clone()),
                }),
        }
    }
}
