//! Shared type definitions for Lumen walkthroughs.
//!
//! `geometry` and `layout` hold the value types used by both definition files
//! and the terminal renderer; `walkthrough` holds the serde model of a
//! walkthrough definition file.

pub mod geometry;
pub mod layout;
pub mod walkthrough;

pub use geometry::{CellRect, CellSize, EdgeInsets, Offset};
pub use layout::{Axis, LayoutEdge, LayoutPriority, LayoutRelation, TextLocation};
pub use walkthrough::{
    AnchorDefinition, ContentDefinition, DefinitionError, DimDefinition, HighlightedStepDefinition, LayoutRuleDefinition,
    PresentationModeDefinition, SettingsDefinition, ShadowDefinition, SpanDefinition, StandaloneStepDefinition, StepDefinition,
    StyleDefinition, StylePreset, WalkthroughDefinition,
};
