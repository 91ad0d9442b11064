//! Tab and window records held by the store.

use crate::history::History;
use crate::TabId;
use serde::{Deserialize, Serialize};

/// Bookkeeping metadata for one browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Host-assigned identifier.
    pub id: TabId,
    /// Grouping reference; may point outside the store.
    pub space_id: Option<String>,
    /// Parent reference; may point outside the store.
    pub parent_id: Option<String>,
    /// Display title, unset until the host reports one.
    pub name: Option<String>,
    /// Current address. Matches the current history entry when there is one.
    pub url: String,
    /// Position within the owning window.
    pub index: usize,
    /// Navigation history.
    pub history: History,
    /// Whether this tab is its window's focus target.
    pub is_active: bool,
}

impl Tab {
    /// Builds a new tab record from creation data.
    ///
    /// The index and active flag are placeholders; the store assigns both
    /// when it settles the owning window.
    pub(crate) fn new(id: TabId, init: TabInit) -> Self {
        let url = init.url.unwrap_or_default();
        let history = if url.is_empty() {
            History::new()
        } else {
            History::starting_at(url.clone())
        };
        Self {
            id,
            space_id: init.space_id,
            parent_id: init.parent_id,
            name: init.name,
            url,
            index: 0,
            history,
            is_active: false,
        }
    }

    /// Applies a partial update, returning `true` if any field changed.
    ///
    /// A new URL rewrites the current history entry in place so that the
    /// URL and history never disagree; it never appends.
    pub(crate) fn merge(&mut self, patch: TabPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            if self.name.as_deref() != Some(name.as_str()) {
                self.name = Some(name);
                changed = true;
            }
        }
        if let Some(url) = patch.url {
            if self.url != url {
                self.history.replace_current(url.clone());
                self.url = url;
                changed = true;
            }
        }
        if let Some(space_id) = patch.space_id {
            if self.space_id.as_deref() != Some(space_id.as_str()) {
                self.space_id = Some(space_id);
                changed = true;
            }
        }
        if let Some(parent_id) = patch.parent_id {
            if self.parent_id.as_deref() != Some(parent_id.as_str()) {
                self.parent_id = Some(parent_id);
                changed = true;
            }
        }
        changed
    }
}

/// Ordered tab membership and focus pointer of one window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// Focused tab, always a member of `tab_ids` when set.
    pub focus: Option<TabId>,
    /// Member tabs; position in this list is each tab's `index`.
    pub tab_ids: Vec<TabId>,
}

impl Window {
    /// Position of `tab` in this window's order.
    pub fn position(&self, tab: &str) -> Option<usize> {
        self.tab_ids.iter().position(|id| id.as_str() == tab)
    }

    /// Returns `true` if `tab` is a member of this window.
    pub fn contains(&self, tab: &str) -> bool {
        self.tab_ids.iter().any(|id| id.as_str() == tab)
    }

    /// Returns `true` if `tab` is this window's focus target.
    pub fn is_focused(&self, tab: &str) -> bool {
        self.focus.as_ref().map(TabId::as_str) == Some(tab)
    }
}

/// Creation data for [`TabStore::ensure_tab`](crate::TabStore::ensure_tab).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabInit {
    /// Requested position; appended when absent.
    pub index: Option<usize>,
    /// Initial address; seeds the history when non-empty.
    pub url: Option<String>,
    /// Initial title.
    pub name: Option<String>,
    /// Grouping reference.
    pub space_id: Option<String>,
    /// Parent reference.
    pub parent_id: Option<String>,
}

impl TabInit {
    /// Creation data carrying only a URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the requested position.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the initial title.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Partial field update for [`TabStore::update_tab_data`](crate::TabStore::update_tab_data).
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabPatch {
    /// New title.
    pub name: Option<String>,
    /// New address; rewrites the current history entry.
    pub url: Option<String>,
    /// New grouping reference.
    pub space_id: Option<String>,
    /// New parent reference.
    pub parent_id: Option<String>,
}

impl TabPatch {
    /// Patch that only sets the title.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch that only sets the URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Returns `true` if the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.space_id.is_none()
            && self.parent_id.is_none()
    }
}
