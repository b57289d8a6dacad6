//! Walkthrough state machine.
//!
//! A run moves `NotStarted -> Probing -> Running(0) -> .. -> Running(n-1)`
//! and ends in either `Completed` (walked past the last step) or `Dismissed`.
//! The run owns the dimming overlay and the bubble view; both are dropped as
//! soon as it ends.
//!
//! Time only enters through the injected [`Clock`]: the pending auto-advance
//! deadline is checked in [`Walkthrough::tick`], and at most one deadline is
//! pending at any time.

use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use lumen_util::{Clock, CompletionStore};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use tracing::{debug, info, warn};

use super::anchors::AnchorMap;
use super::content::ContentAction;
use super::provider::{WalkthroughDelegate, WalkthroughProvider};
use super::settings::WalkthroughSettings;
use super::step::Step;
use super::style::BubbleStyle;
use crate::layout::constraint::{LayoutContext, PlacementError};
use crate::layout::placement::AnchorTarget;
use crate::ui::bubble::BubbleView;
use crate::ui::overlay::{DimmingOverlay, Hole, OverlayEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkthroughState {
    NotStarted,
    /// Views are attached and the starting geometry is being laid out.
    Probing,
    /// Showing the step at this index.
    Running(usize),
    Completed,
    Dismissed,
}

impl WalkthroughState {
    pub fn is_active(&self) -> bool {
        matches!(self, WalkthroughState::Probing | WalkthroughState::Running(_))
    }
}

/// What asked the walkthrough to move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    /// Click or key on the dimmed background.
    BackgroundTap,
    /// The step's auto-advance delay elapsed.
    Timer,
    /// A direct step call, usually from a control inside custom content.
    Explicit,
}

/// Outcome of an advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    Stepped(usize),
    Completed,
}

struct CompletionTracking {
    provider: Rc<dyn WalkthroughProvider>,
    store: Arc<dyn CompletionStore>,
}

/// Views owned by a running walkthrough.
struct RunViews {
    overlay: Option<DimmingOverlay>,
    bubble: BubbleView,
    /// Start of a step transition the overlay has not picked up yet.
    hole_transition: Option<Instant>,
    last_error: Option<PlacementError>,
}

pub struct Walkthrough {
    steps: Vec<Step>,
    settings: WalkthroughSettings,
    style: BubbleStyle,
    clock: Rc<dyn Clock>,
    state: WalkthroughState,
    completion: Option<CompletionTracking>,
    delegate: Option<Box<dyn WalkthroughDelegate>>,
    pending_advance: Option<Instant>,
    views: Option<RunViews>,
}

impl Walkthrough {
    pub fn new(steps: Vec<Step>, settings: WalkthroughSettings, style: BubbleStyle, clock: Rc<dyn Clock>) -> Self {
        Self {
            steps,
            settings,
            style,
            clock,
            state: WalkthroughState::NotStarted,
            completion: None,
            delegate: None,
            pending_advance: None,
            views: None,
        }
    }

    /// Mark the provider's walkthrough as completed in `store` on natural completion.
    #[must_use]
    pub fn with_completion(mut self, provider: Rc<dyn WalkthroughProvider>, store: Arc<dyn CompletionStore>) -> Self {
        self.completion = Some(CompletionTracking { provider, store });
        self
    }

    #[must_use]
    pub fn with_delegate(mut self, delegate: Box<dyn WalkthroughDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn state(&self) -> WalkthroughState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn settings(&self) -> &WalkthroughSettings {
        &self.settings
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            WalkthroughState::Running(index) => Some(index),
            _ => None,
        }
    }

    fn current_step_mut(&mut self) -> Option<&mut Step> {
        let index = self.current_index()?;
        self.steps.get_mut(index)
    }

    /// Deadline of the pending auto-advance, if one is armed.
    pub fn pending_advance(&self) -> Option<Instant> {
        self.pending_advance
    }

    pub fn has_overlay(&self) -> bool {
        self.views.as_ref().is_some_and(|views| views.overlay.is_some())
    }

    /// Attach the views and show the first step. Returns `false` when there
    /// is nothing to show or the walkthrough already ran.
    pub fn start(&mut self) -> bool {
        if self.state != WalkthroughState::NotStarted {
            debug!(state = ?self.state, "walkthrough already started");
            return false;
        }
        if self.steps.is_empty() {
            debug!("walkthrough has no steps");
            return false;
        }

        let now = self.clock.now();
        self.state = WalkthroughState::Probing;
        self.views = Some(RunViews {
            overlay: self
                .settings
                .presentation_mode
                .dimming()
                .map(|(color, alpha)| DimmingOverlay::new(color, alpha, now)),
            bubble: BubbleView::new(
                self.style.clone(),
                self.settings.min_bubble_horizontal_margin,
                self.settings.preferred_bubble_max_width,
                self.settings.step_transition,
            ),
            hole_transition: None,
            last_error: None,
        });
        info!(steps = self.steps.len(), mode = ?self.settings.presentation_mode, "walkthrough started");
        self.show_step(0);
        true
    }

    /// Move to the next step, or complete after the last one.
    ///
    /// Background taps and timers never leave a step that needs interaction.
    pub fn advance(&mut self, trigger: AdvanceTrigger) -> Transition {
        let WalkthroughState::Running(index) = self.state else {
            debug!(state = ?self.state, ?trigger, "advance ignored: walkthrough not running");
            return Transition::Ignored;
        };
        if trigger != AdvanceTrigger::Explicit && self.steps.get(index).is_some_and(Step::needs_interaction) {
            debug!(index, ?trigger, "step needs interaction; not advancing");
            return Transition::Ignored;
        }

        self.pending_advance = None;
        let next = index + 1;
        if next < self.steps.len() {
            self.show_step(next);
            Transition::Stepped(next)
        } else {
            self.complete();
            Transition::Completed
        }
    }

    /// Same as an explicit advance.
    pub fn step_walkthrough(&mut self) -> Transition {
        self.advance(AdvanceTrigger::Explicit)
    }

    /// Fire the auto-advance timer when it is due.
    pub fn tick(&mut self) -> Transition {
        match self.pending_advance {
            Some(due) if self.clock.now() >= due => {
                self.pending_advance = None;
                self.advance(AdvanceTrigger::Timer)
            }
            _ => Transition::Ignored,
        }
    }

    /// End the run without marking it completed or notifying the delegate.
    pub fn dismiss(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        info!(at = ?self.current_index(), "walkthrough dismissed");
        self.state = WalkthroughState::Dismissed;
        self.teardown();
        self.delegate = None;
        true
    }

    fn show_step(&mut self, index: usize) {
        let now = self.clock.now();
        self.state = WalkthroughState::Running(index);
        if let Some(views) = self.views.as_mut() {
            views.bubble.begin_transition(now);
            views.hole_transition = Some(now);
            views.last_error = None;
        }
        self.pending_advance = self
            .steps
            .get(index)
            .and_then(|step| self.delay_for(step))
            .and_then(|delay| now.checked_add(delay));
        debug!(index, auto_advance = ?self.pending_advance.map(|due| due - now), "showing walkthrough step");
    }

    /// Steps that need interaction never arm a timer.
    fn delay_for(&self, step: &Step) -> Option<Duration> {
        if step.needs_interaction() {
            return None;
        }
        step.auto_advance().or(self.settings.automatic_delay)
    }

    fn complete(&mut self) {
        self.state = WalkthroughState::Completed;
        if let Some(tracking) = &self.completion {
            tracking.provider.set_completed_walkthrough(tracking.store.as_ref(), true);
        }
        self.teardown();
        info!(steps = self.steps.len(), "walkthrough completed");
        if let Some(mut delegate) = self.delegate.take() {
            delegate.walkthrough_completed();
        }
    }

    fn teardown(&mut self) {
        self.pending_advance = None;
        self.views = None;
    }

    /// Route input to the walkthrough. Returns `true` when the input was
    /// consumed and must not reach the host screen.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_active() {
            return false;
        }
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let action = self
            .current_step_mut()
            .map_or(ContentAction::Ignored, |step| step.content_mut().handle_key(key));
        match action {
            ContentAction::StepWalkthrough => {
                self.advance(AdvanceTrigger::Explicit);
                return true;
            }
            ContentAction::Consumed => return true,
            ContentAction::Ignored => {}
        }

        if !self.has_overlay() {
            return false;
        }
        match key.code {
            KeyCode::Esc if self.settings.dismiss_on_escape => {
                self.dismiss();
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('n') => {
                self.advance(AdvanceTrigger::BackgroundTap);
            }
            _ => {}
        }
        true
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let Some(views) = self.views.as_ref() else {
            return false;
        };
        let position = Position::new(mouse.column, mouse.row);
        let is_click = mouse.kind == MouseEventKind::Down(MouseButton::Left);

        if views.bubble.contains(position) {
            let content_area = views.bubble.content_area().filter(|area| area.contains(position));
            let has_overlay = views.overlay.is_some();
            let action = match (content_area, self.current_step_mut()) {
                (Some(area), Some(step)) => step.content_mut().handle_mouse(mouse, area),
                _ => ContentAction::Ignored,
            };
            match action {
                ContentAction::StepWalkthrough => {
                    self.advance(AdvanceTrigger::Explicit);
                }
                ContentAction::Ignored if is_click && !has_overlay => {
                    self.advance(AdvanceTrigger::BackgroundTap);
                }
                _ => {}
            }
            return true;
        }

        match views.overlay.as_ref().map(|overlay| overlay.handle_mouse(&mouse)) {
            Some(Some(OverlayEvent::BackgroundTapped)) => {
                self.advance(AdvanceTrigger::BackgroundTap);
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    pub fn needs_animation(&self) -> bool {
        let now = self.clock.now();
        self.views.as_ref().is_some_and(|views| {
            views.bubble.is_animating(now) || views.overlay.as_ref().is_some_and(|overlay| overlay.is_animating(now))
        })
    }

    /// Draw the overlay and the current step's bubble over `area`, resolving
    /// anchors against the host's current view frames.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, anchors: &AnchorMap) {
        let Some(index) = self.current_index() else {
            return;
        };
        let now = self.clock.now();
        let (Some(views), Some(step)) = (self.views.as_mut(), self.steps.get_mut(index)) else {
            return;
        };
        let context = LayoutContext::new(area, anchors);

        match views.bubble.layout(step, &context, now) {
            Ok(_) => views.last_error = None,
            Err(error) => {
                if views.last_error.as_ref() != Some(&error) {
                    warn!(index, %error, "could not place walkthrough bubble");
                    views.last_error = Some(error);
                }
            }
        }

        if let Some(overlay) = views.overlay.as_mut() {
            if overlay.target_hole().is_none() {
                overlay.settle_hole(Hole::covering(area), now);
            }
            let target = hole_target(step, &self.settings, &context, overlay.target_hole());
            let transition = views.hole_transition.take().map(|started| (started, self.settings.step_transition));
            overlay.update_hole(target, now, transition);
            overlay.render(area, buf, now);
        }
        views.bubble.render(step.content_mut(), area, buf, now);
    }
}

/// Hole around the highlighted area, or the previous hole closed to zero
/// height when nothing is highlighted.
fn hole_target(step: &Step, settings: &WalkthroughSettings, context: &LayoutContext<'_>, previous: Option<Hole>) -> Hole {
    let highlighted = match step {
        Step::Highlighted(step) if settings.presentation_mode.highlights() => {
            AnchorTarget::from_anchor(&step.anchor).resolve(context).ok()
        }
        _ => None,
    };
    match highlighted {
        Some(bounds) => Hole::around(bounds, settings.highlighting_offset),
        None => previous.unwrap_or_else(|| Hole::covering(context.container)).closed(),
    }
}
