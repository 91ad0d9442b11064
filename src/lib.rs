//! Tab and window state core for a multi-window browser shell.
//!
//! This crate tracks which tabs exist, which window owns each tab, which tab
//! has focus in each window, and the navigation history of every tab. The
//! rendered page lives in an external host process; this crate only mirrors
//! the bookkeeping the UI needs.
//!
//! # Layout
//!
//! - [`store`]: the state container and its single transition function.
//! - [`host`]: the command surface of the external host plus an in-memory
//!   implementation.
//! - [`sync`]: seeds the store from the host and absorbs host events.
//! - [`controller`]: UI-facing commands that round-trip through the host
//!   before touching the store.
//! - [`replay`]: scripted driver used by the CLI.
//! - [`config`] and [`logging`]: TOML settings and tracing setup.

use std::borrow::Borrow;
use std::fmt;

/// Configuration loading and XDG path resolution.
pub mod config;

/// UI-facing tab commands that sequence host round trips and store updates.
pub mod controller;

/// Per-tab navigation history.
pub mod history;

/// External host interface and wire types.
pub mod host;

/// Tracing subscriber initialization.
pub mod logging;

/// Scripted replay of UI actions and host events.
pub mod replay;

/// The tab/window state store.
pub mod store;

/// Bootstrap and event sync between the host and the store.
pub mod sync;

/// Tab and window records.
pub mod tab;

pub use controller::{ControllerError, TabController};
pub use history::History;
pub use host::{
    HistoryStep, HostError, HostEvent, MemoryHost, TabEventKind, TabHost, TabInfo,
};
pub use replay::{ReplayError, Replayer, Step};
pub use store::{Action, NewFocus, Outcome, StoreEvent, StoreSnapshot, TabStore};
pub use sync::SyncAdapter;
pub use tab::{Tab, TabInit, TabPatch, Window};

/// Opaque tab identifier assigned by the external host.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// Creates a tab id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TabId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TabId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&TabId> for TabId {
    fn from(id: &TabId) -> Self {
        id.clone()
    }
}

/// Label of a top-level window, as known to the external host.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct WindowLabel(String);

impl WindowLabel {
    /// Creates a window label from any string-like value.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for WindowLabel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WindowLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WindowLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&WindowLabel> for WindowLabel {
    fn from(label: &WindowLabel) -> Self {
        label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_id_display_matches_inner() {
        let id = TabId::new("tab-1");
        assert_eq!(id.to_string(), "tab-1");
        assert_eq!(id.as_str(), "tab-1");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = TabId::from("abc");
        let label = WindowLabel::from("main");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"main\"");

        let back: TabId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_from_owned_and_borrowed_are_equal() {
        assert_eq!(TabId::from("x"), TabId::from("x".to_string()));
        assert_eq!(WindowLabel::from("w"), WindowLabel::new("w"));
    }
}
