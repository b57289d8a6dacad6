//! Bubble layout: a small priority-based constraint solver and the
//! constraint sets that place bubbles and arrows.

pub mod constraint;
pub mod placement;

pub use constraint::{Bounds, LayoutConstraint, LayoutContext, PlacementError, Reference, solve};
pub use placement::{ArrowDirection, center_offset_constraints, margin_constraints};
