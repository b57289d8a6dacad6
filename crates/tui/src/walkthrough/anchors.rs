//! Registry of on-screen view frames that highlighted steps point at.

use std::fmt;

use indexmap::IndexMap;
use ratatui::layout::Rect;

/// Identifier of a view registered by the host screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ViewId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Live frames of the host screen's views.
///
/// Host screens record each anchorable view while rendering, so a step that
/// references a view always resolves against the frame drawn most recently.
#[derive(Debug, Default, Clone)]
pub struct AnchorMap {
    frames: IndexMap<ViewId, Rect>,
}

impl AnchorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or move) a view's frame.
    pub fn record(&mut self, id: impl Into<ViewId>, frame: Rect) {
        self.frames.insert(id.into(), frame);
    }

    /// Forget a view that is no longer on screen.
    pub fn remove(&mut self, id: &ViewId) -> Option<Rect> {
        self.frames.shift_remove(id)
    }

    pub fn resolve(&self, id: &ViewId) -> Option<Rect> {
        self.frames.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ViewId, &Rect)> {
        self.frames.iter()
    }
}
