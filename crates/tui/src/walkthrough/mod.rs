//! Walkthrough model and sequencing.
//!
//! Steps, content and styling describe what a walkthrough shows; the
//! [`sequencer`] runs one, and the [`host`] attaches runs and floating
//! bubbles to a screen.

pub mod anchors;
pub mod content;
pub mod definition;
pub mod host;
pub mod provider;
pub mod sequencer;
pub mod settings;
pub mod step;
pub mod style;

pub use anchors::{AnchorMap, ViewId};
pub use content::{Content, ContentAction, CustomContent};
pub use definition::DefinedWalkthrough;
pub use host::{BUBBLE_REMOVAL, BubbleHandle, BubbleOptions, WalkthroughHandle, WalkthroughHost, WalkthroughRequest};
pub use provider::{WalkthroughDelegate, WalkthroughProvider};
pub use sequencer::{AdvanceTrigger, Transition, Walkthrough, WalkthroughState};
pub use settings::{PresentationMode, WalkthroughSettings};
pub use step::{Anchor, HighlightedStep, StandalonePlacement, StandaloneStep, Step};
pub use style::{BubbleStyle, ShadowStyle};
