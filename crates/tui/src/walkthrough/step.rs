//! Walkthrough steps.
//!
//! A step is either a standalone bubble (positioned on its own) or a bubble
//! pointing at a highlighted area of the screen. A standalone bubble carries
//! exactly one placement strategy; the enum makes "neither" and "both"
//! unrepresentable.

use std::fmt;
use std::time::Duration;

use lumen_types::{Offset, TextLocation};
use ratatui::layout::Rect;

use super::anchors::ViewId;
use super::content::Content;
use crate::layout::constraint::{LayoutConstraint, LayoutContext};

/// Produces the full constraint set of a standalone bubble.
pub type LayoutHandler = Box<dyn Fn(&LayoutContext<'_>) -> Vec<LayoutConstraint>>;

/// Where a standalone bubble goes.
pub enum StandalonePlacement {
    /// Constraints supplied by the caller; nothing is added to them.
    Layout(LayoutHandler),
    /// Offset of the bubble centre from the container centre.
    CenterOffset(Offset),
}

impl fmt::Debug for StandalonePlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandalonePlacement::Layout(_) => f.write_str("Layout(..)"),
            StandalonePlacement::CenterOffset(offset) => f.debug_tuple("CenterOffset").field(offset).finish(),
        }
    }
}

/// Area a highlighted step points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// A registered view, looked up each time the step is laid out.
    View(ViewId),
    /// A fixed rectangle relative to the container origin.
    Rect(Rect),
}

impl From<ViewId> for Anchor {
    fn from(value: ViewId) -> Self {
        Anchor::View(value)
    }
}

impl From<&str> for Anchor {
    fn from(value: &str) -> Self {
        Anchor::View(ViewId::from(value))
    }
}

impl From<Rect> for Anchor {
    fn from(value: Rect) -> Self {
        Anchor::Rect(value)
    }
}

#[derive(Debug)]
pub struct StandaloneStep {
    pub content: Content,
    pub placement: StandalonePlacement,
    pub needs_interaction: bool,
    /// Overrides the walkthrough's automatic delay for this step.
    pub auto_advance: Option<Duration>,
}

impl StandaloneStep {
    pub fn centered(content: impl Into<Content>, offset: Offset) -> Self {
        Self {
            content: content.into(),
            placement: StandalonePlacement::CenterOffset(offset),
            needs_interaction: false,
            auto_advance: None,
        }
    }

    pub fn with_layout(content: impl Into<Content>, handler: impl Fn(&LayoutContext<'_>) -> Vec<LayoutConstraint> + 'static) -> Self {
        Self {
            content: content.into(),
            placement: StandalonePlacement::Layout(Box::new(handler)),
            needs_interaction: false,
            auto_advance: None,
        }
    }

    /// Only an explicit step call moves past this step.
    #[must_use]
    pub fn requiring_interaction(mut self) -> Self {
        self.needs_interaction = true;
        self
    }

    #[must_use]
    pub fn auto_advance_after(mut self, delay: Duration) -> Self {
        self.auto_advance = Some(delay);
        self
    }
}

#[derive(Debug)]
pub struct HighlightedStep {
    pub content: Content,
    pub anchor: Anchor,
    pub text_location: TextLocation,
    pub needs_interaction: bool,
    pub auto_advance: Option<Duration>,
}

impl HighlightedStep {
    pub fn new(anchor: impl Into<Anchor>, text_location: TextLocation, content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            anchor: anchor.into(),
            text_location,
            needs_interaction: false,
            auto_advance: None,
        }
    }

    pub fn above(anchor: impl Into<Anchor>, content: impl Into<Content>) -> Self {
        Self::new(anchor, TextLocation::Above, content)
    }

    pub fn below(anchor: impl Into<Anchor>, content: impl Into<Content>) -> Self {
        Self::new(anchor, TextLocation::Below, content)
    }

    #[must_use]
    pub fn requiring_interaction(mut self) -> Self {
        self.needs_interaction = true;
        self
    }

    #[must_use]
    pub fn auto_advance_after(mut self, delay: Duration) -> Self {
        self.auto_advance = Some(delay);
        self
    }
}

#[derive(Debug)]
pub enum Step {
    Standalone(StandaloneStep),
    Highlighted(HighlightedStep),
}

impl Step {
    pub fn content(&self) -> &Content {
        match self {
            Step::Standalone(step) => &step.content,
            Step::Highlighted(step) => &step.content,
        }
    }

    pub fn content_mut(&mut self) -> &mut Content {
        match self {
            Step::Standalone(step) => &mut step.content,
            Step::Highlighted(step) => &mut step.content,
        }
    }

    pub fn needs_interaction(&self) -> bool {
        match self {
            Step::Standalone(step) => step.needs_interaction,
            Step::Highlighted(step) => step.needs_interaction,
        }
    }

    pub fn auto_advance(&self) -> Option<Duration> {
        match self {
            Step::Standalone(step) => step.auto_advance,
            Step::Highlighted(step) => step.auto_advance,
        }
    }

    pub fn is_standalone(&self) -> bool {
        matches!(self, Step::Standalone(_))
    }
}

impl From<StandaloneStep> for Step {
    fn from(value: StandaloneStep) -> Self {
        Step::Standalone(value)
    }
}

impl From<HighlightedStep> for Step {
    fn from(value: HighlightedStep) -> Self {
        Step::Highlighted(value)
    }
}
