//! Interactive showcase: a sample screen with a walkthrough and floating
//! bubbles attached.

pub mod bubbles;
pub mod screen;
pub mod tour;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crossterm::event::{Event, KeyEventKind};
use lumen_util::{Clock, CompletionStore};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::info;

use self::bubbles::BubbleShowcase;
use self::screen::{DemoScreen, ScreenAction};
use self::tour::DemoTour;
use crate::walkthrough::host::{WalkthroughHost, WalkthroughRequest};
use crate::walkthrough::provider::WalkthroughProvider;
use crate::walkthrough::settings::WalkthroughSettings;
use crate::walkthrough::style::BubbleStyle;

/// How the showcase runs its walkthrough.
#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    pub settings: WalkthroughSettings,
    pub style: BubbleStyle,
    /// Start the walkthrough even if it was completed before.
    pub force: bool,
    /// Play the bubble showcase right away.
    pub bubbles: bool,
}

pub struct DemoApp {
    screen: DemoScreen,
    host: WalkthroughHost,
    tour: Rc<dyn WalkthroughProvider>,
    settings: WalkthroughSettings,
    style: BubbleStyle,
    showcase: Option<BubbleShowcase>,
    status: Rc<RefCell<String>>,
    clock: Rc<dyn Clock>,
    quit: bool,
}

impl DemoApp {
    /// Showcase running the built-in tour.
    pub fn new(clock: Rc<dyn Clock>, store: Arc<dyn CompletionStore>, options: DemoOptions) -> Self {
        Self::with_tour(Rc::new(DemoTour), clock, store, options)
    }

    /// Showcase running any walkthrough against the sample screen.
    pub fn with_tour(tour: Rc<dyn WalkthroughProvider>, clock: Rc<dyn Clock>, store: Arc<dyn CompletionStore>, options: DemoOptions) -> Self {
        let status = Rc::new(RefCell::new(String::new()));
        let mut app = Self {
            screen: DemoScreen::new("Lumen", status.clone()),
            host: WalkthroughHost::new(clock.clone(), store).with_provider(tour.clone()),
            tour,
            settings: options.settings,
            style: options.style,
            showcase: None,
            status,
            clock,
            quit: false,
        };
        app.start(options.force);
        if options.bubbles {
            app.start_showcase();
        }
        app
    }

    /// Start the walkthrough unless it runs already or was completed before.
    pub fn start(&mut self, force: bool) -> bool {
        let status = self.status.clone();
        let request = WalkthroughRequest::new()
            .with_settings(self.settings.clone())
            .with_style(self.style.clone())
            .show_even_if_completed(force)
            .with_delegate(move || *status.borrow_mut() = "Walkthrough completed. Press w to see it again.".to_string());
        let started = self.host.start_walkthrough(request).is_some();
        if !started && !self.host.is_walkthrough_active() {
            self.set_status("Walkthrough already completed. Press w to see it again, r to reset.");
        }
        started
    }

    pub fn start_showcase(&mut self) {
        self.showcase = Some(BubbleShowcase::new(self.clock.now(), self.status.clone()));
    }

    pub fn host(&self) -> &WalkthroughHost {
        &self.host
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.borrow_mut() = message.into();
    }

    pub fn handle_event(&mut self, event: &Event) {
        if self.host.handle_event(event) {
            return;
        }
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match self.screen.handle_key(*key) {
                ScreenAction::None => {}
                ScreenAction::Quit => self.quit = true,
                ScreenAction::RestartWalkthrough => {
                    self.start(true);
                }
                ScreenAction::ShowBubbles => self.start_showcase(),
                ScreenAction::ForgetCompletion => {
                    self.tour.set_completed_walkthrough(self.host.store(), false);
                    info!(identity = %self.tour.walkthrough_identity(), "walkthrough completion reset");
                    self.set_status("Completion flag cleared.");
                }
            },
            Event::Mouse(mouse) => self.screen.handle_mouse(*mouse),
            _ => {}
        }
    }

    pub fn tick(&mut self) {
        if let Some(showcase) = &mut self.showcase {
            showcase.tick(&mut self.host, self.clock.now());
            if showcase.is_finished() {
                self.showcase = None;
            }
        }
        self.host.tick();
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.screen.render(area, buf, self.host.anchors_mut());
        self.host.render(area, buf);
    }

    pub fn needs_animation(&self) -> bool {
        self.host.needs_animation()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use lumen_util::{InMemoryCompletionStore, ManualClock};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app(store: Arc<InMemoryCompletionStore>) -> DemoApp {
        let options = DemoOptions {
            settings: WalkthroughSettings::default().with_step_transition(std::time::Duration::ZERO),
            ..DemoOptions::default()
        };
        DemoApp::new(Rc::new(ManualClock::new()), store, options)
    }

    #[test]
    fn tour_runs_to_completion_and_is_remembered() {
        let store = Arc::new(InMemoryCompletionStore::new());
        let mut app = app(store.clone());
        let area = Rect::new(0, 0, 80, 24);
        assert!(app.host().is_walkthrough_active());

        for _ in 0..4 {
            app.render(area, &mut Buffer::empty(area));
            app.handle_event(&press(KeyCode::Enter));
        }
        // the custom stripes step ignores background taps until its button is used
        app.render(area, &mut Buffer::empty(area));
        app.handle_event(&press(KeyCode::Char('n')));
        assert!(app.host().is_walkthrough_active());
        app.handle_event(&press(KeyCode::Enter));
        for _ in 0..2 {
            app.render(area, &mut Buffer::empty(area));
            app.handle_event(&press(KeyCode::Enter));
        }
        assert!(!app.host().is_walkthrough_active());
        assert!(app.status().starts_with("Walkthrough completed"));

        let mut again = self::app(store);
        assert!(!again.host().is_walkthrough_active());
        again.handle_event(&press(KeyCode::Char('w')));
        assert!(again.host().is_walkthrough_active());
    }

    #[test]
    fn screen_keys_pass_through_once_the_tour_is_gone() {
        let mut app = app(Arc::new(InMemoryCompletionStore::new()));
        app.handle_event(&press(KeyCode::Esc));
        assert!(!app.host().is_walkthrough_active());
        assert!(!app.should_quit());

        app.handle_event(&press(KeyCode::Char('q')));
        assert!(app.should_quit());
    }
}
