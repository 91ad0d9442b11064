//! Command surface of the external host that owns the real webviews.
//!
//! The store never talks to the host directly. The [`controller`](crate::controller)
//! issues commands through [`TabHost`] and the [`sync`](crate::sync) adapter
//! consumes the [`HostEvent`]s the host pushes back.

use crate::{TabId, WindowLabel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub use memory::MemoryHost;

/// Errors reported by a host round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host has no window with this label.
    #[error("window not found: {0}")]
    WindowNotFound(WindowLabel),

    /// The host has no tab with this id in the addressed window.
    #[error("tab not found: {0}")]
    TabNotFound(TabId),

    /// The URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A history step outside `-1..=1`.
    #[error("invalid history step {0} (expected -1, 0 or 1)")]
    InvalidStep(i32),

    /// The host did not acknowledge the command.
    #[error("host unavailable")]
    Unavailable,
}

/// One entry of the host's tab list, as returned on attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    /// Host-assigned identifier.
    pub id: TabId,
    /// Current title.
    #[serde(default)]
    pub name: Option<String>,
    /// Current address.
    #[serde(default)]
    pub url: String,
    /// Position within the window as the host sees it.
    pub index: usize,
    /// Whether the host shows this tab.
    #[serde(default)]
    pub is_active: bool,
    /// Grouping reference.
    #[serde(default)]
    pub space_id: Option<String>,
    /// Parent reference.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Kind of a host-pushed tab update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabEventKind {
    /// The page title changed.
    TitleChanged,
    /// The committed URL changed.
    UrlChanged,
}

/// Host-pushed tab update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEvent {
    /// What changed.
    pub event: TabEventKind,
    /// Affected tab.
    pub tab_id: TabId,
    /// New title, for `TitleChanged`.
    #[serde(default)]
    pub title: Option<String>,
    /// Committed URL.
    #[serde(default)]
    pub url: Option<String>,
}

impl HostEvent {
    /// A title change carrying the page URL at the time.
    pub fn title_changed(
        tab: impl Into<TabId>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            event: TabEventKind::TitleChanged,
            tab_id: tab.into(),
            title: Some(title.into()),
            url: Some(url.into()),
        }
    }

    /// A committed URL change.
    pub fn url_changed(tab: impl Into<TabId>, url: impl Into<String>) -> Self {
        Self {
            event: TabEventKind::UrlChanged,
            tab_id: tab.into(),
            title: None,
            url: Some(url.into()),
        }
    }
}

/// Signed history step: back, reload or forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum HistoryStep {
    Back,
    Reload,
    Forward,
}

impl TryFrom<i32> for HistoryStep {
    type Error = HostError;

    fn try_from(offset: i32) -> Result<Self, Self::Error> {
        match offset {
            -1 => Ok(HistoryStep::Back),
            0 => Ok(HistoryStep::Reload),
            1 => Ok(HistoryStep::Forward),
            other => Err(HostError::InvalidStep(other)),
        }
    }
}

impl From<HistoryStep> for i32 {
    fn from(step: HistoryStep) -> Self {
        match step {
            HistoryStep::Back => -1,
            HistoryStep::Reload => 0,
            HistoryStep::Forward => 1,
        }
    }
}

/// Commands the external host acknowledges.
///
/// Every method resolves only after the host has applied the command, so
/// callers can mirror the change locally once it returns `Ok`. Navigation
/// acknowledgments also say whether the host's history moved.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The window's current tabs, in no particular order.
    async fn list_tabs(&self, window: &WindowLabel) -> Result<Vec<TabInfo>, HostError>;

    /// Opens a tab and returns its new id.
    async fn create_tab(
        &self,
        window: &WindowLabel,
        url: &str,
        name: Option<&str>,
    ) -> Result<TabId, HostError>;

    /// Shows `tab` and hides the previously shown tab.
    async fn switch_tab(&self, window: &WindowLabel, tab: &TabId) -> Result<(), HostError>;

    /// Closes `tab`.
    async fn close_tab(&self, window: &WindowLabel, tab: &TabId) -> Result<(), HostError>;

    /// Loads `url` in `tab`.
    ///
    /// Returns `false` when `url` is already current and the host only
    /// reloaded, so no history entry was recorded.
    async fn navigate(&self, window: &WindowLabel, tab: &TabId, url: &str)
        -> Result<bool, HostError>;

    /// Moves `tab` through its history or reloads it.
    ///
    /// Returns `true` if the history cursor moved.
    async fn step_history(
        &self,
        window: &WindowLabel,
        tab: &TabId,
        step: HistoryStep,
    ) -> Result<bool, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_step_from_signed_offset() {
        assert_eq!(HistoryStep::try_from(-1), Ok(HistoryStep::Back));
        assert_eq!(HistoryStep::try_from(0), Ok(HistoryStep::Reload));
        assert_eq!(HistoryStep::try_from(1), Ok(HistoryStep::Forward));
        assert_eq!(HistoryStep::try_from(2), Err(HostError::InvalidStep(2)));
        assert_eq!(i32::from(HistoryStep::Back), -1);
    }

    #[test]
    fn history_step_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&HistoryStep::Forward).unwrap(), "1");
        let step: HistoryStep = serde_json::from_str("-1").unwrap();
        assert_eq!(step, HistoryStep::Back);
        assert!(serde_json::from_str::<HistoryStep>("5").is_err());
    }

    #[test]
    fn host_event_uses_camel_case_wire_format() {
        let json = r#"{"event":"titleChanged","tabId":"t1","title":"Hi","url":"https://x"}"#;
        let event: HostEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, HostEvent::title_changed("t1", "Hi", "https://x"));
    }

    #[test]
    fn tab_info_tolerates_missing_optional_fields() {
        let json = r#"{"id":"t1","index":3}"#;
        let info: TabInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.index, 3);
        assert_eq!(info.url, "");
        assert!(!info.is_active);
        assert_eq!(info.name, None);
    }

    #[test]
    fn host_error_messages_name_the_subject() {
        let err = HostError::TabNotFound(TabId::from("t9"));
        assert!(err.to_string().contains("t9"));
        let err = HostError::InvalidStep(7);
        assert!(err.to_string().contains('7'));
    }
}
