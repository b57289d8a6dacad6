//! Speech bubble view: sizing, placement, step transitions and drawing.
//!
//! The view keeps the constraint set of the step it shows and re-solves it
//! on every frame, so the bubble follows its anchor when the host screen
//! moves things around. Switching steps rebuilds the constraints and starts
//! an eased move from wherever the bubble currently is.

use std::time::{Duration, Instant};

use lumen_types::{CellSize, TextLocation};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use tracing::debug;

use super::animation::Tween;
use super::chrome::{draw_arrow, draw_body, draw_shadow, inset_bounds};
use crate::layout::constraint::{Bounds, LayoutConstraint, LayoutContext, PlacementError, solve};
use crate::layout::placement::{AnchorTarget, StepConstraints, step_constraints, target_constraints};
use crate::layout::ArrowDirection;
use crate::walkthrough::content::Content;
use crate::walkthrough::step::Step;
use crate::walkthrough::style::BubbleStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowLayout {
    pub bounds: Bounds,
    pub direction: ArrowDirection,
}

/// Resolved destination of a bubble and its arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleLayout {
    pub bubble: Bounds,
    pub arrow: Option<ArrowLayout>,
}

/// Arrow direction change that takes effect halfway through a transition.
#[derive(Debug, Clone, Copy)]
struct ArrowFlip {
    from: ArrowDirection,
    at: Instant,
}

/// Where the bubble was drawn last.
#[derive(Debug, Clone, Copy)]
struct Drawn {
    bubble: Bounds,
    content: Option<Rect>,
}

#[derive(Debug)]
pub struct BubbleView {
    style: BubbleStyle,
    margin: u16,
    preferred_width: Option<u16>,
    transition: Duration,
    constraints: Vec<LayoutConstraint>,
    arrow_constraints: Option<(Vec<LayoutConstraint>, ArrowDirection)>,
    needs_configure: bool,
    transition_started: Option<Instant>,
    frame: Option<Tween<Bounds>>,
    arrow: Option<Tween<Bounds>>,
    arrow_direction: Option<ArrowDirection>,
    arrow_flip: Option<ArrowFlip>,
    visible: bool,
    drawn: Option<Drawn>,
}

impl BubbleView {
    pub fn new(style: BubbleStyle, margin: u16, preferred_width: Option<u16>, transition: Duration) -> Self {
        Self {
            style,
            margin,
            preferred_width,
            transition,
            constraints: Vec::new(),
            arrow_constraints: None,
            needs_configure: true,
            transition_started: None,
            frame: None,
            arrow: None,
            arrow_direction: None,
            arrow_flip: None,
            visible: false,
            drawn: None,
        }
    }

    pub fn style(&self) -> &BubbleStyle {
        &self.style
    }

    /// Show a new step: its constraints are rebuilt on the next layout and
    /// the bubble moves there over the transition duration, counted from `now`.
    pub fn begin_transition(&mut self, now: Instant) {
        self.needs_configure = true;
        self.transition_started = Some(now);
    }

    /// Shrink the bubble and its arrow into the bubble's centre over
    /// `duration`. The caller stops calling [`layout`](Self::layout) afterwards.
    pub fn begin_collapse(&mut self, now: Instant, duration: Duration) {
        let Some(frame) = self.frame_at(now).filter(|_| self.visible) else {
            self.visible = false;
            return;
        };
        let point = Bounds::new(frame.center_x(), frame.center_y(), 0, 0);
        let transition = Some((now, duration));
        retarget(&mut self.frame, point, now, transition);
        if self.arrow.is_some() {
            retarget(&mut self.arrow, point, now, transition);
        }
        self.arrow_flip = None;
    }

    /// Size of the bubble around `content` inside `container`.
    pub fn bubble_size(&self, content: &Content, container: Rect) -> CellSize {
        let insets = self.style.text_insets;
        let available = container.width.saturating_sub(self.margin.saturating_mul(2));
        let text_width = available.saturating_sub(insets.horizontal());
        let text_width = self.preferred_width.map_or(text_width, |preferred| preferred.min(text_width));
        let measured = content.measure(text_width);
        CellSize::new(
            measured.width.saturating_add(insets.horizontal()).min(available),
            measured.height.saturating_add(insets.vertical()).min(container.height),
        )
    }

    /// Resolve the step's placement against the current screen and point the
    /// bubble at it.
    ///
    /// The very first layout places an empty bubble above the container, so
    /// the first step slides in from there.
    pub fn layout(&mut self, step: &Step, context: &LayoutContext<'_>, now: Instant) -> Result<BubbleLayout, PlacementError> {
        if self.frame.is_none() {
            self.probe(context, now)?;
        }
        if self.needs_configure {
            if !self.constraints.is_empty() {
                debug!(count = self.constraints.len(), "replacing bubble constraints");
            }
            let StepConstraints { bubble, arrow } = step_constraints(step, &self.style, self.margin, context);
            self.constraints = bubble;
            self.arrow_constraints = arrow;
        }

        let layout = match self.solve(self.bubble_size(step.content(), context.container), context) {
            Ok(layout) => layout,
            Err(error) => {
                if self.needs_configure {
                    self.visible = false;
                }
                return Err(error);
            }
        };

        let transition = if self.needs_configure {
            self.transition_started.map(|started| (started, self.transition))
        } else {
            None
        };
        self.apply(layout, now, transition);
        self.needs_configure = false;
        self.visible = true;
        Ok(layout)
    }

    fn probe(&mut self, context: &LayoutContext<'_>, now: Instant) -> Result<(), PlacementError> {
        let probe = target_constraints(&AnchorTarget::Container, TextLocation::Above, &self.style, self.margin);
        let size = self.bubble_size(&Content::plain(""), context.container);
        let bubble = solve(&probe.bubble, size, context)?;
        self.frame = Some(Tween::settled(bubble, now));
        Ok(())
    }

    fn solve(&self, size: CellSize, context: &LayoutContext<'_>) -> Result<BubbleLayout, PlacementError> {
        let bubble = solve(&self.constraints, size, context)?;
        let arrow = match &self.arrow_constraints {
            Some((constraints, direction)) => Some(ArrowLayout {
                bounds: solve(constraints, self.style.arrow_size, &context.with_bubble(bubble))?,
                direction: *direction,
            }),
            None => None,
        };
        Ok(BubbleLayout { bubble, arrow })
    }

    fn apply(&mut self, layout: BubbleLayout, now: Instant, transition: Option<(Instant, Duration)>) {
        let current = self.frame_at(now).unwrap_or(layout.bubble);
        retarget(&mut self.frame, layout.bubble, now, transition);

        let Some(arrow) = layout.arrow else {
            self.arrow = None;
            self.arrow_direction = None;
            self.arrow_flip = None;
            return;
        };
        if self.arrow.is_none() {
            // A new arrow rides along with the bubble.
            let start = arrow
                .bounds
                .translate(current.x.saturating_sub(layout.bubble.x), current.y.saturating_sub(layout.bubble.y));
            self.arrow = Some(Tween::settled(start, now));
        }
        retarget(&mut self.arrow, arrow.bounds, now, transition);

        if let (Some(previous), Some((started, duration))) = (self.direction_at(now), transition)
            && previous != arrow.direction
            && let Some(at) = started.checked_add(duration / 2)
        {
            self.arrow_flip = Some(ArrowFlip { from: previous, at });
        }
        self.arrow_direction = Some(arrow.direction);
    }

    pub fn frame_at(&self, now: Instant) -> Option<Bounds> {
        self.frame.as_ref().map(|frame| frame.value_at(now))
    }

    pub fn arrow_at(&self, now: Instant) -> Option<ArrowLayout> {
        let bounds = self.arrow.as_ref()?.value_at(now);
        let direction = self.direction_at(now)?;
        Some(ArrowLayout { bounds, direction })
    }

    fn direction_at(&self, now: Instant) -> Option<ArrowDirection> {
        match self.arrow_flip {
            Some(flip) if now < flip.at => Some(flip.from),
            _ => self.arrow_direction,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.frame.as_ref().is_some_and(|frame| frame.is_running(now))
            || self.arrow.as_ref().is_some_and(|arrow| arrow.is_running(now))
            || self.arrow_flip.is_some_and(|flip| now < flip.at)
    }

    pub fn render(&mut self, content: &mut Content, area: Rect, buf: &mut Buffer, now: Instant) {
        self.drawn = None;
        if !self.visible {
            return;
        }
        let Some(bubble) = self.frame_at(now) else {
            return;
        };
        if let Some(shadow) = self.style.shadow {
            draw_shadow(buf, area, bubble, &self.style, &shadow);
        }
        draw_body(buf, area, bubble, &self.style);
        if let Some(arrow) = self.arrow_at(now) {
            draw_arrow(buf, area, arrow.bounds, arrow.direction, self.style.background_color);
        }
        let content_area = inset_bounds(bubble, &self.style).clip(area);
        if let Some(content_area) = content_area {
            content.render(content_area, buf, &self.style);
        }
        self.drawn = Some(Drawn {
            bubble,
            content: content_area,
        });
    }

    /// Whether the bubble as last drawn covers `position`.
    pub fn contains(&self, position: Position) -> bool {
        self.drawn.is_some_and(|drawn| drawn.bubble.contains(position))
    }

    /// Where the content was last drawn.
    pub fn content_area(&self) -> Option<Rect> {
        self.drawn.and_then(|drawn| drawn.content)
    }
}

fn retarget(tween: &mut Option<Tween<Bounds>>, to: Bounds, now: Instant, transition: Option<(Instant, Duration)>) {
    match (tween.as_mut(), transition) {
        (None, _) => *tween = Some(Tween::settled(to, now)),
        (Some(tween), Some((started, duration))) => tween.retarget(to, now, started, duration),
        (Some(tween), None) => tween.update_target(to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walkthrough::anchors::AnchorMap;
    use crate::layout::constraint::Reference;
    use crate::walkthrough::step::{HighlightedStep, StandaloneStep};
    use lumen_types::{LayoutEdge, Offset};
    use ratatui::style::Color;

    const CONTAINER: Rect = Rect::new(0, 0, 80, 24);
    const TRANSITION: Duration = Duration::from_millis(300);

    fn anchors() -> AnchorMap {
        let mut anchors = AnchorMap::new();
        anchors.record("button", Rect::new(30, 10, 10, 3));
        anchors
    }

    fn view() -> BubbleView {
        BubbleView::new(BubbleStyle::default(), 1, Some(40), TRANSITION)
    }

    #[test]
    fn bubble_wraps_content_with_insets() {
        let view = view();
        assert_eq!(view.bubble_size(&Content::plain("Hello there"), CONTAINER), CellSize::new(15, 3));

        let long = Content::plain("word ".repeat(40));
        let size = view.bubble_size(&long, CONTAINER);
        assert!(size.width <= 44);
        assert!(size.height > 3);
    }

    #[test]
    fn bubble_never_exceeds_container_minus_margins() {
        let view = BubbleView::new(BubbleStyle::default(), 2, None, TRANSITION);
        let size = view.bubble_size(&Content::plain("word ".repeat(40)), Rect::new(0, 0, 20, 10));
        assert!(size.width <= 16);
    }

    #[test]
    fn highlighted_step_places_bubble_and_arrow_below_anchor() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let step: Step = HighlightedStep::below("button", "Hello there").into();
        let mut view = view();
        let now = Instant::now();

        let layout = view.layout(&step, &context, now).unwrap();
        assert_eq!(layout.bubble, Bounds::new(28, 15, 15, 3));
        assert_eq!(
            layout.arrow,
            Some(ArrowLayout {
                bounds: Bounds::new(34, 14, 3, 1),
                direction: ArrowDirection::Up,
            })
        );
    }

    #[test]
    fn first_step_slides_in_from_the_probe() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let step: Step = StandaloneStep::centered("Welcome", Offset::ZERO).into();
        let mut view = view();
        let now = Instant::now();

        view.begin_transition(now);
        let layout = view.layout(&step, &context, now).unwrap();
        let start = view.frame_at(now).unwrap();
        assert!(start.bottom() <= 0, "probe sits above the container: {start:?}");
        assert!(view.is_animating(now));
        assert_eq!(view.frame_at(now + TRANSITION), Some(layout.bubble));
    }

    #[test]
    fn layout_handler_owns_placement_without_margins() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let step: Step = StandaloneStep::with_layout("Pinned to the left edge", |_| {
            vec![
                LayoutConstraint::equal(LayoutEdge::Left, Reference::Container(LayoutEdge::Left), 0),
                LayoutConstraint::equal(LayoutEdge::Bottom, Reference::Container(LayoutEdge::Bottom), 0),
            ]
        })
        .into();
        let mut view = BubbleView::new(BubbleStyle::default(), 2, None, TRANSITION);

        let layout = view.layout(&step, &context, Instant::now()).unwrap();
        assert_eq!(layout.bubble.left(), 0);
        assert_eq!(layout.bubble.bottom(), 24);
        assert_eq!(layout.arrow, None);
    }

    #[test]
    fn arrow_flips_halfway_through_the_transition() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let below: Step = HighlightedStep::below("button", "Below").into();
        let above: Step = HighlightedStep::above("button", "Above").into();
        let mut view = view();
        let now = Instant::now();
        view.layout(&below, &context, now).unwrap();

        view.begin_transition(now);
        view.layout(&above, &context, now).unwrap();
        assert_eq!(view.arrow_at(now).map(|arrow| arrow.direction), Some(ArrowDirection::Up));
        let late = now + TRANSITION / 2 + Duration::from_millis(1);
        assert_eq!(view.arrow_at(late).map(|arrow| arrow.direction), Some(ArrowDirection::Down));
    }

    #[test]
    fn standalone_step_drops_the_arrow() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let mut view = view();
        let now = Instant::now();
        view.layout(&HighlightedStep::below("button", "x").into(), &context, now).unwrap();

        view.begin_transition(now);
        let layout = view.layout(&StandaloneStep::centered("y", Offset::ZERO).into(), &context, now).unwrap();
        assert_eq!(layout.arrow, None);
        assert_eq!(view.arrow_at(now), None);
    }

    #[test]
    fn bubble_follows_a_moving_anchor_without_restarting() {
        let mut anchors = anchors();
        let step: Step = HighlightedStep::below("button", "Hello there").into();
        let mut view = view();
        let now = Instant::now();
        view.layout(&step, &LayoutContext::new(CONTAINER, &anchors), now).unwrap();

        anchors.record("button", Rect::new(30, 4, 10, 3));
        view.layout(&step, &LayoutContext::new(CONTAINER, &anchors), now).unwrap();
        assert_eq!(view.frame_at(now).map(|frame| frame.top()), Some(9));
    }

    #[test]
    fn unresolved_anchor_hides_a_fresh_step() {
        let anchors = AnchorMap::new();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let step: Step = HighlightedStep::below("missing", "x").into();
        let mut view = view();

        assert!(view.layout(&step, &context, Instant::now()).is_err());
        assert!(!view.is_visible());
    }

    #[test]
    fn collapse_shrinks_into_the_centre() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let step: Step = HighlightedStep::below("button", "Hello there").into();
        let mut view = view();
        let now = Instant::now();
        let layout = view.layout(&step, &context, now).unwrap();

        view.begin_collapse(now, TRANSITION);
        assert!(view.is_animating(now));
        let halfway = view.frame_at(now + TRANSITION / 2).unwrap();
        assert!(halfway.width < layout.bubble.width && halfway.width > 0);

        let done = now + TRANSITION;
        assert!(!view.is_animating(done));
        let end = view.frame_at(done).unwrap();
        assert_eq!((end.width, end.height), (0, 0));
        assert_eq!((end.x, end.y), (layout.bubble.center_x(), layout.bubble.center_y()));
        assert_eq!(view.arrow_at(done).map(|arrow| arrow.bounds), Some(end));
    }

    #[test]
    fn render_draws_body_arrow_and_text() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let mut step: Step = HighlightedStep::below("button", "Hello there").into();
        let mut view = view();
        let now = Instant::now();
        view.layout(&step, &context, now).unwrap();

        let mut buf = Buffer::empty(CONTAINER);
        view.render(step.content_mut(), CONTAINER, &mut buf, now);

        assert_eq!(buf[(29, 15)].bg, view.style().background_color);
        assert_eq!(buf[(35, 14)].fg, view.style().background_color);
        assert_eq!(buf[(30, 16)].symbol(), "H");
        assert_eq!(buf[(0, 0)].bg, Color::Reset);
        assert!(view.contains(Position::new(30, 16)));
        assert_eq!(view.content_area(), Some(Rect::new(30, 16, 11, 1)));
    }
}
