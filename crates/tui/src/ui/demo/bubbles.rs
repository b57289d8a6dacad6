//! Timed showcase of standalone bubbles.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use lumen_types::{LayoutEdge, Offset};
use ratatui::style::Color;
use tracing::debug;

use super::screen::BUTTONS;
use crate::layout::constraint::{LayoutConstraint, Reference};
use crate::walkthrough::host::{BubbleHandle, BubbleOptions, WalkthroughHost};
use crate::walkthrough::step::{HighlightedStep, StandaloneStep};
use crate::walkthrough::style::{BubbleStyle, ShadowStyle};

const ORANGE: Color = Color::Rgb(0xFF, 0x95, 0x00);
const TEAL: Color = Color::Rgb(0x5A, 0xC8, 0xFA);

/// Seconds after start at which each stage is shown.
const STAGES: [u64; 5] = [0, 2, 4, 5, 6];

/// Shows a handful of bubbles one after another, driven by [`tick`](Self::tick).
pub struct BubbleShowcase {
    started: Instant,
    next: usize,
    keep: Rc<RefCell<Vec<BubbleHandle>>>,
    status: Rc<RefCell<String>>,
}

impl BubbleShowcase {
    pub fn new(now: Instant, status: Rc<RefCell<String>>) -> Self {
        Self {
            started: now,
            next: 0,
            keep: Rc::new(RefCell::new(Vec::new())),
            status,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next >= STAGES.len()
    }

    /// Show every stage that is due.
    pub fn tick(&mut self, host: &mut WalkthroughHost, now: Instant) {
        while let Some(offset) = STAGES.get(self.next) {
            if now < self.started + Duration::from_secs(*offset) {
                break;
            }
            debug!(stage = self.next, "showing bubble");
            self.show(self.next, host);
            self.next += 1;
        }
    }

    fn show(&mut self, stage: usize, host: &mut WalkthroughHost) {
        match stage {
            0 => {
                host.show_bubble(
                    HighlightedStep::below(BUTTONS[0], "Bubbles can be shown on their own, without a walkthrough."),
                    BubbleOptions::default().with_duration(Duration::from_secs(10)),
                );
            }
            1 => {
                let style = BubbleStyle::default()
                    .with_colors(Color::White, ORANGE)
                    .with_shadow(Some(ShadowStyle::dark()));
                let mut options = BubbleOptions::default().with_style(style).with_preferred_max_width(Some(30));
                options.min_horizontal_margin = 4;
                let handle = host.show_bubble(
                    StandaloneStep::centered("They stay until removed when no duration is given.", Offset::new(-10, 4)),
                    options,
                );
                self.keep.borrow_mut().push(handle);
            }
            2 => {
                let style = BubbleStyle::default().with_colors(Color::Black, TEAL);
                let handle = host.show_bubble(
                    StandaloneStep::with_layout("Or placed with layout constraints.", |_| {
                        vec![
                            LayoutConstraint::equal(LayoutEdge::CenterX, Reference::Container(LayoutEdge::CenterX), 0),
                            LayoutConstraint::equal(LayoutEdge::Bottom, Reference::Container(LayoutEdge::Bottom), -4),
                        ]
                    }),
                    BubbleOptions::default().with_style(style),
                );
                self.keep.borrow_mut().push(handle);
            }
            3 => {
                let status = self.status.clone();
                host.show_bubble(
                    HighlightedStep::above(BUTTONS[1], "This one leaves after three seconds."),
                    BubbleOptions::default()
                        .with_duration(Duration::from_secs(3))
                        .on_finished(move || *status.borrow_mut() = "A timed bubble finished.".to_string()),
                );
            }
            _ => {
                let keep = self.keep.clone();
                let status = self.status.clone();
                host.show_bubble(
                    StandaloneStep::centered("When this one goes, it takes the others along.", Offset::new(0, -6)),
                    BubbleOptions::default()
                        .with_duration(Duration::from_secs(6))
                        .on_finished(move || {
                            for handle in keep.borrow_mut().drain(..) {
                                handle.remove();
                            }
                            *status.borrow_mut() = "Bubble showcase finished.".to_string();
                        }),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_util::{Clock, InMemoryCompletionStore, ManualClock};
    use std::sync::Arc;

    #[test]
    fn stages_appear_on_schedule_and_clean_up() {
        let clock = Rc::new(ManualClock::new());
        let mut host = WalkthroughHost::new(clock.clone(), Arc::new(InMemoryCompletionStore::new()));
        let status = Rc::new(RefCell::new(String::new()));
        let mut showcase = BubbleShowcase::new(clock.now(), status.clone());

        showcase.tick(&mut host, clock.now());
        assert_eq!(host.bubble_count(), 1);

        clock.advance(Duration::from_secs(6));
        showcase.tick(&mut host, clock.now());
        host.tick();
        assert!(showcase.is_finished());
        assert_eq!(host.bubble_count(), 5);

        clock.advance(Duration::from_secs(3));
        host.tick();
        assert_eq!(status.borrow().as_str(), "A timed bubble finished.");
        assert_eq!(host.bubble_count(), 4);

        clock.advance(Duration::from_secs(3));
        host.tick();
        assert_eq!(status.borrow().as_str(), "Bubble showcase finished.");
        assert_eq!(host.bubble_count(), 0);
    }
}
