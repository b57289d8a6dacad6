//! Walkthrough behaviour settings.

use std::time::Duration;

use lumen_types::CellSize;
use ratatui::style::Color;

/// Default dimming strength.
pub const DEFAULT_DIM_ALPHA: f32 = 0.7;

/// How the screen behind a walkthrough is presented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresentationMode {
    /// Dim the screen and cut a hole around the highlighted area.
    DimAndHighlight { color: Color, alpha: f32 },
    /// Dim the whole screen.
    Dim { color: Color, alpha: f32 },
    /// Leave the screen untouched; only the bubble is drawn and the host
    /// screen keeps receiving input.
    None,
}

impl PresentationMode {
    pub const fn dim_and_highlight() -> Self {
        PresentationMode::DimAndHighlight {
            color: Color::Rgb(0, 0, 0),
            alpha: DEFAULT_DIM_ALPHA,
        }
    }

    pub const fn dim() -> Self {
        PresentationMode::Dim {
            color: Color::Rgb(0, 0, 0),
            alpha: DEFAULT_DIM_ALPHA,
        }
    }

    /// Dim color and strength, when an overlay is shown.
    pub const fn dimming(&self) -> Option<(Color, f32)> {
        match *self {
            PresentationMode::DimAndHighlight { color, alpha } | PresentationMode::Dim { color, alpha } => Some((color, alpha)),
            PresentationMode::None => None,
        }
    }

    pub const fn highlights(&self) -> bool {
        matches!(self, PresentationMode::DimAndHighlight { .. })
    }
}

impl Default for PresentationMode {
    fn default() -> Self {
        Self::dim_and_highlight()
    }
}

/// Global settings of one walkthrough run.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughSettings {
    /// Duration of the animated move from one step to the next.
    pub step_transition: Duration,
    /// Added to the highlighted area's width and height to form the hole.
    pub highlighting_offset: CellSize,
    /// Advance automatically after this delay. `None` leaves advancing to the user.
    pub automatic_delay: Option<Duration>,
    pub min_bubble_horizontal_margin: u16,
    /// Preferred maximum width of the bubble text.
    pub preferred_bubble_max_width: Option<u16>,
    pub presentation_mode: PresentationMode,
    /// Whether Esc dismisses the walkthrough.
    pub dismiss_on_escape: bool,
}

impl Default for WalkthroughSettings {
    fn default() -> Self {
        Self {
            step_transition: Duration::from_millis(300),
            highlighting_offset: CellSize::new(2, 2),
            automatic_delay: None,
            min_bubble_horizontal_margin: 1,
            preferred_bubble_max_width: Some(40),
            presentation_mode: PresentationMode::default(),
            dismiss_on_escape: true,
        }
    }
}

impl WalkthroughSettings {
    #[must_use]
    pub fn with_automatic_delay(mut self, delay: Option<Duration>) -> Self {
        self.automatic_delay = delay;
        self
    }

    #[must_use]
    pub fn with_presentation_mode(mut self, mode: PresentationMode) -> Self {
        self.presentation_mode = mode;
        self
    }

    #[must_use]
    pub fn with_step_transition(mut self, duration: Duration) -> Self {
        self.step_transition = duration;
        self
    }
}
