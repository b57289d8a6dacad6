//! # Lumen terminal walkthroughs
//!
//! Onboarding walkthroughs and hint bubbles for ratatui applications.
//!
//! A walkthrough is a sequence of steps. Each step shows a speech bubble,
//! either pointing at a view of the host screen or placed on its own, while
//! the rest of the screen is dimmed around a highlight hole. Steps advance on
//! a tap, after a delay, or when custom bubble content asks for it, and the
//! completion of a walkthrough is remembered per provider.
//!
//! ## Architecture
//!
//! - [`walkthrough`] holds the step model, the state machine and the host
//!   that screens embed.
//! - [`layout`] places bubbles and arrows with prioritized edge constraints.
//! - [`ui`] renders the overlay and bubbles, and contains the showcase app
//!   and its event loop.

pub mod layout;
pub mod ui;
pub mod walkthrough;

use anyhow::Result;

pub use ui::demo::{DemoApp, DemoOptions};
pub use walkthrough::{
    BubbleOptions, BubbleStyle, Content, DefinedWalkthrough, HighlightedStep, PresentationMode, StandaloneStep, Step,
    WalkthroughHost, WalkthroughProvider, WalkthroughRequest, WalkthroughSettings,
};

/// Run the showcase app until the user quits.
///
/// # Errors
///
/// Terminal setup or teardown failures.
pub async fn run(app: DemoApp) -> Result<()> {
    ui::runtime::run_app(app).await
}
