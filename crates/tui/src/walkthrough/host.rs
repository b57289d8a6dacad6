//! Attaching walkthroughs and floating bubbles to a host screen.
//!
//! A [`WalkthroughHost`] lives next to the screen it augments. The screen
//! records the frames of its views in [`WalkthroughHost::anchors_mut`] while
//! drawing, forwards input through [`WalkthroughHost::handle_event`] and
//! draws the host last so overlays end up on top.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::Event;
use lumen_util::{Clock, CompletionStore};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::{debug, warn};

use super::anchors::AnchorMap;
use super::provider::{WalkthroughDelegate, WalkthroughProvider};
use super::sequencer::{Transition, Walkthrough, WalkthroughState};
use super::settings::WalkthroughSettings;
use super::step::Step;
use super::style::BubbleStyle;
use crate::layout::constraint::{LayoutContext, PlacementError};
use crate::ui::bubble::BubbleView;

/// How long a removed floating bubble takes to shrink away.
pub const BUBBLE_REMOVAL: Duration = Duration::from_millis(300);

/// Parameters of a walkthrough run.
pub struct WalkthroughRequest {
    provider: Option<Rc<dyn WalkthroughProvider>>,
    settings: WalkthroughSettings,
    style: BubbleStyle,
    delegate: Option<Box<dyn WalkthroughDelegate>>,
    show_even_if_completed: bool,
}

impl Default for WalkthroughRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkthroughRequest {
    pub fn new() -> Self {
        Self {
            provider: None,
            settings: WalkthroughSettings::default(),
            style: BubbleStyle::default(),
            delegate: None,
            show_even_if_completed: false,
        }
    }

    /// Use this provider instead of the host's own.
    #[must_use]
    pub fn with_provider(mut self, provider: Rc<dyn WalkthroughProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: WalkthroughSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: BubbleStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_delegate(mut self, delegate: impl WalkthroughDelegate + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    /// Run even when the provider's completion flag is set.
    #[must_use]
    pub fn show_even_if_completed(mut self, show: bool) -> Self {
        self.show_even_if_completed = show;
        self
    }
}

/// Parameters of a floating bubble.
pub struct BubbleOptions {
    pub style: BubbleStyle,
    /// Remove the bubble after this long. `None` keeps it until removed.
    pub duration: Option<Duration>,
    pub min_horizontal_margin: u16,
    pub preferred_max_width: Option<u16>,
    on_finished: Option<Box<dyn FnOnce()>>,
}

impl Default for BubbleOptions {
    fn default() -> Self {
        let settings = WalkthroughSettings::default();
        Self {
            style: BubbleStyle::default(),
            duration: None,
            min_horizontal_margin: settings.min_bubble_horizontal_margin,
            preferred_max_width: settings.preferred_bubble_max_width,
            on_finished: None,
        }
    }
}

impl BubbleOptions {
    #[must_use]
    pub fn with_style(mut self, style: BubbleStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_preferred_max_width(mut self, width: Option<u16>) -> Self {
        self.preferred_max_width = width;
        self
    }

    /// Called once when the duration elapses, as the bubble starts shrinking
    /// away. Not called on [`BubbleHandle::remove`].
    #[must_use]
    pub fn on_finished(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_finished = Some(Box::new(callback));
        self
    }
}

struct FloatingBubble {
    step: Step,
    view: BubbleView,
    clock: Rc<dyn Clock>,
    expires_at: Option<Instant>,
    on_finished: Option<Box<dyn FnOnce()>>,
    /// Set on removal; the bubble shrinks until then and is dropped after.
    gone_at: Option<Instant>,
    last_error: Option<PlacementError>,
}

impl FloatingBubble {
    fn is_removed(&self) -> bool {
        self.gone_at.is_some()
    }

    fn is_gone(&self, now: Instant) -> bool {
        self.gone_at.is_some_and(|at| now >= at)
    }

    fn remove(&mut self) {
        if self.is_removed() {
            return;
        }
        let now = self.clock.now();
        self.view.begin_collapse(now, BUBBLE_REMOVAL);
        self.gone_at = Some(now.checked_add(BUBBLE_REMOVAL).unwrap_or(now));
    }

    /// Remove the bubble once its time is up, handing back its callback.
    fn expire(&mut self, now: Instant) -> Option<Box<dyn FnOnce()>> {
        if self.is_removed() || self.expires_at.is_none_or(|at| now < at) {
            return None;
        }
        self.remove();
        self.on_finished.take()
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, anchors: &AnchorMap, now: Instant) {
        if self.is_gone(now) {
            return;
        }
        if !self.is_removed() {
            match self.view.layout(&self.step, &LayoutContext::new(area, anchors), now) {
                Ok(_) => self.last_error = None,
                Err(error) => {
                    if self.last_error.as_ref() != Some(&error) {
                        warn!(%error, "could not place floating bubble");
                        self.last_error = Some(error);
                    }
                }
            }
        }
        self.view.render(self.step.content_mut(), area, buf, now);
    }
}

/// Weak handle to a running walkthrough. Becomes inert once the host has
/// released the run.
#[derive(Clone)]
pub struct WalkthroughHandle {
    inner: Weak<RefCell<Walkthrough>>,
}

impl WalkthroughHandle {
    /// Advance explicitly, even past a step that needs interaction.
    pub fn step_walkthrough(&self) -> Transition {
        self.with_walkthrough(Walkthrough::step_walkthrough).unwrap_or(Transition::Ignored)
    }

    pub fn dismiss(&self) -> bool {
        self.with_walkthrough(Walkthrough::dismiss).unwrap_or(false)
    }

    /// `None` once the host no longer holds the run.
    pub fn state(&self) -> Option<WalkthroughState> {
        let walkthrough = self.inner.upgrade()?;
        walkthrough.try_borrow().ok().map(|walkthrough| walkthrough.state())
    }

    pub fn is_active(&self) -> bool {
        self.state().is_some_and(|state| state.is_active())
    }

    fn with_walkthrough<T>(&self, action: impl FnOnce(&mut Walkthrough) -> T) -> Option<T> {
        let walkthrough = self.inner.upgrade()?;
        match walkthrough.try_borrow_mut() {
            Ok(mut walkthrough) => Some(action(&mut walkthrough)),
            Err(_) => {
                warn!("walkthrough is busy; ignoring re-entrant call");
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct BubbleHandle {
    inner: Weak<RefCell<FloatingBubble>>,
}

impl BubbleHandle {
    /// Shrink the bubble away without running its completion callback.
    pub fn remove(&self) {
        if let Some(bubble) = self.inner.upgrade()
            && let Ok(mut bubble) = bubble.try_borrow_mut()
        {
            bubble.remove();
        }
    }

    /// `false` as soon as the bubble is removed, even while it shrinks away.
    pub fn is_visible(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|bubble| bubble.try_borrow().is_ok_and(|bubble| !bubble.is_removed()))
    }
}

pub struct WalkthroughHost {
    clock: Rc<dyn Clock>,
    store: Arc<dyn CompletionStore>,
    anchors: AnchorMap,
    provider: Option<Rc<dyn WalkthroughProvider>>,
    active: Option<Rc<RefCell<Walkthrough>>>,
    bubbles: Vec<Rc<RefCell<FloatingBubble>>>,
}

impl WalkthroughHost {
    pub fn new(clock: Rc<dyn Clock>, store: Arc<dyn CompletionStore>) -> Self {
        Self {
            clock,
            store,
            anchors: AnchorMap::new(),
            provider: None,
            active: None,
            bubbles: Vec::new(),
        }
    }

    /// Provider used when a request does not bring its own.
    #[must_use]
    pub fn with_provider(mut self, provider: Rc<dyn WalkthroughProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn store(&self) -> &dyn CompletionStore {
        self.store.as_ref()
    }

    pub fn anchors(&self) -> &AnchorMap {
        &self.anchors
    }

    pub fn anchors_mut(&mut self) -> &mut AnchorMap {
        &mut self.anchors
    }

    /// Start a walkthrough unless one is already running, the provider has
    /// no steps, or it was completed before and the request does not insist.
    ///
    /// # Panics
    ///
    /// When neither the request nor the host supplies a provider.
    pub fn start_walkthrough(&mut self, request: WalkthroughRequest) -> Option<WalkthroughHandle> {
        let provider = request
            .provider
            .or_else(|| self.provider.clone())
            .unwrap_or_else(|| panic!("walkthrough started without a provider: pass one in the request or attach one to the host"));
        self.reap();

        if self.active.is_some() {
            debug!("walkthrough already running on this host");
            return None;
        }
        if !request.show_even_if_completed && provider.has_completed_walkthrough(self.store.as_ref()) {
            debug!(identity = %provider.walkthrough_identity(), "walkthrough already completed");
            return None;
        }
        let steps = provider.walkthrough_steps();
        if steps.is_empty() {
            debug!(identity = %provider.walkthrough_identity(), "walkthrough has no steps");
            return None;
        }

        let mut walkthrough = Walkthrough::new(steps, request.settings, request.style, self.clock.clone())
            .with_completion(provider, self.store.clone());
        if let Some(delegate) = request.delegate {
            walkthrough = walkthrough.with_delegate(delegate);
        }
        if !walkthrough.start() {
            return None;
        }

        let walkthrough = Rc::new(RefCell::new(walkthrough));
        let handle = WalkthroughHandle {
            inner: Rc::downgrade(&walkthrough),
        };
        self.active = Some(walkthrough);
        Some(handle)
    }

    /// Handle to the running walkthrough, if any.
    pub fn active_walkthrough(&self) -> Option<WalkthroughHandle> {
        self.active.as_ref().map(|walkthrough| WalkthroughHandle {
            inner: Rc::downgrade(walkthrough),
        })
    }

    /// Show a single bubble without dimming or sequencing.
    pub fn show_bubble(&mut self, step: impl Into<Step>, options: BubbleOptions) -> BubbleHandle {
        let now = self.clock.now();
        let bubble = Rc::new(RefCell::new(FloatingBubble {
            step: step.into(),
            view: BubbleView::new(options.style, options.min_horizontal_margin, options.preferred_max_width, Duration::ZERO),
            clock: self.clock.clone(),
            expires_at: options.duration.and_then(|duration| now.checked_add(duration)),
            on_finished: options.on_finished,
            gone_at: None,
            last_error: None,
        }));
        let handle = BubbleHandle {
            inner: Rc::downgrade(&bubble),
        };
        self.bubbles.push(bubble);
        handle
    }

    /// Route input to the walkthrough first. Returns `true` when it was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let consumed = self
            .active
            .as_ref()
            .is_some_and(|walkthrough| walkthrough.borrow_mut().handle_event(event));
        self.reap();
        consumed
    }

    /// Fire due timers: the walkthrough's auto-advance and bubble expiry.
    pub fn tick(&mut self) {
        if let Some(walkthrough) = &self.active {
            walkthrough.borrow_mut().tick();
        }
        let now = self.clock.now();
        let finished: Vec<_> = self.bubbles.iter().filter_map(|bubble| bubble.borrow_mut().expire(now)).collect();
        self.reap();
        for callback in finished {
            callback();
        }
    }

    /// Draw floating bubbles and then the walkthrough over `area`.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let now = self.clock.now();
        for bubble in &self.bubbles {
            bubble.borrow_mut().render(area, buf, &self.anchors, now);
        }
        if let Some(walkthrough) = &self.active {
            walkthrough.borrow_mut().render(area, buf, &self.anchors);
        }
    }

    /// The host screen is going away: dismiss the walkthrough and drop all
    /// bubbles at once.
    pub fn disappear(&mut self) {
        if let Some(walkthrough) = self.active.take() {
            walkthrough.borrow_mut().dismiss();
        }
        self.bubbles.clear();
    }

    pub fn needs_animation(&self) -> bool {
        let now = self.clock.now();
        self.active.as_ref().is_some_and(|walkthrough| walkthrough.borrow().needs_animation())
            || self.bubbles.iter().any(|bubble| bubble.borrow().view.is_animating(now))
    }

    pub fn is_walkthrough_active(&self) -> bool {
        self.active.as_ref().is_some_and(|walkthrough| walkthrough.borrow().is_active())
    }

    /// Number of dimming overlays currently attached.
    pub fn overlay_count(&self) -> usize {
        self.active.iter().filter(|walkthrough| walkthrough.borrow().has_overlay()).count()
    }

    /// Bubbles not yet removed. Bubbles still shrinking away are not counted.
    pub fn bubble_count(&self) -> usize {
        self.bubbles.iter().filter(|bubble| !bubble.borrow().is_removed()).count()
    }

    /// Release finished runs and bubbles that have finished shrinking.
    fn reap(&mut self) {
        if self.active.as_ref().is_some_and(|walkthrough| !walkthrough.borrow().is_active()) {
            self.active = None;
        }
        let now = self.clock.now();
        self.bubbles.retain(|bubble| !bubble.borrow().is_gone(now));
    }
}
