//! Terminal views: the dimming overlay, speech bubbles and their animation,
//! plus the showcase app and the runtime that drives it.

pub mod animation;
pub mod bubble;
pub(crate) mod chrome;
pub mod demo;
pub mod overlay;
pub mod runtime;
