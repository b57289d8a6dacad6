//! Constraint sets for bubbles and their arrows.
//!
//! These functions only describe where things go; [`super::constraint::solve`]
//! turns the descriptions into bounds against the live screen geometry.

use lumen_types::{Axis, LayoutEdge, Offset, TextLocation};
use ratatui::layout::Rect;

use super::constraint::{Bounds, LayoutConstraint, LayoutContext, PlacementError, Reference};
use crate::walkthrough::anchors::ViewId;
use crate::walkthrough::step::{Anchor, StandalonePlacement, Step};
use crate::walkthrough::style::BubbleStyle;

/// Which way the arrow points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    /// Arrow above the bubble, pointing at an area above it.
    Up,
    /// Arrow below the bubble, pointing at an area below it.
    Down,
}

impl ArrowDirection {
    /// Text above the highlighted area needs an arrow pointing down at it.
    pub const fn for_location(location: TextLocation) -> Self {
        match location {
            TextLocation::Above => ArrowDirection::Down,
            TextLocation::Below => ArrowDirection::Up,
        }
    }
}

/// Area a bubble is attached to, including the whole container used by the
/// probe pass that precedes the first step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AnchorTarget {
    Container,
    View(ViewId),
    Rect(Rect),
}

impl AnchorTarget {
    pub(crate) fn from_anchor(anchor: &Anchor) -> Self {
        match anchor {
            Anchor::View(id) => AnchorTarget::View(id.clone()),
            Anchor::Rect(rect) => AnchorTarget::Rect(*rect),
        }
    }

    /// Reference and constant describing `edge` of this target.
    fn reference(&self, edge: LayoutEdge) -> (Reference, i32) {
        match self {
            AnchorTarget::Container => (Reference::Container(edge), 0),
            AnchorTarget::View(id) => (Reference::View(id.clone(), edge), 0),
            AnchorTarget::Rect(rect) => {
                let offset = Bounds::new(i32::from(rect.x), i32::from(rect.y), rect.width, rect.height).edge(edge);
                let origin = match edge.axis() {
                    Axis::Horizontal => LayoutEdge::Left,
                    Axis::Vertical => LayoutEdge::Top,
                };
                (Reference::Container(origin), offset)
            }
        }
    }

    /// Current on-screen bounds of the target.
    pub(crate) fn resolve(&self, context: &LayoutContext<'_>) -> Result<Bounds, PlacementError> {
        match self {
            AnchorTarget::Container => Ok(Bounds::from_rect(context.container)),
            AnchorTarget::View(id) => context
                .anchors
                .resolve(id)
                .map(Bounds::from_rect)
                .ok_or_else(|| PlacementError::UnresolvedAnchor(id.clone())),
            AnchorTarget::Rect(rect) => Ok(Bounds::from_rect(*rect).translate(i32::from(context.container.x), i32::from(context.container.y))),
        }
    }

    fn constraint(&self, item_edge: LayoutEdge, target_edge: LayoutEdge, constant: i32) -> LayoutConstraint {
        let (reference, offset) = self.reference(target_edge);
        LayoutConstraint::equal(item_edge, reference, offset.saturating_add(constant))
    }
}

/// Keeps the bubble `margin` cells away from the container's sides.
pub fn margin_constraints(margin: u16) -> [LayoutConstraint; 2] {
    let margin = i32::from(margin);
    [
        LayoutConstraint::at_least(LayoutEdge::Left, Reference::Container(LayoutEdge::Left), margin),
        LayoutConstraint::at_most(LayoutEdge::Right, Reference::Container(LayoutEdge::Right), -margin),
    ]
}

/// Bubble centred on the target horizontally and stacked above or below it.
pub(crate) fn highlight_constraints(target: &AnchorTarget, location: TextLocation, style: &BubbleStyle, margin: u16) -> Vec<LayoutConstraint> {
    let gap = style.highlight_gap();
    let vertical = match location {
        TextLocation::Above => target.constraint(LayoutEdge::Bottom, LayoutEdge::Top, -gap),
        TextLocation::Below => target.constraint(LayoutEdge::Top, LayoutEdge::Bottom, gap),
    };
    let mut constraints = vec![target.constraint(LayoutEdge::CenterX, LayoutEdge::CenterX, 0).low(), vertical];
    constraints.extend(margin_constraints(margin));
    constraints
}

/// Bubble centred in the container, moved by `offset`.
pub fn center_offset_constraints(offset: Offset, margin: u16) -> Vec<LayoutConstraint> {
    let mut constraints = vec![
        LayoutConstraint::equal(LayoutEdge::CenterX, Reference::Container(LayoutEdge::CenterX), offset.x).low(),
        LayoutConstraint::equal(LayoutEdge::CenterY, Reference::Container(LayoutEdge::CenterY), offset.y).low(),
    ];
    constraints.extend(margin_constraints(margin));
    constraints
}

/// Arrow flush against the bubble's near edge, aimed at the target centre
/// but kept `corner_radius` cells inside the bubble's sides.
pub(crate) fn arrow_constraints(target: &AnchorTarget, location: TextLocation, style: &BubbleStyle) -> Vec<LayoutConstraint> {
    let radius = i32::from(style.corner_radius);
    let vertical = match location {
        TextLocation::Above => LayoutConstraint::equal(LayoutEdge::Top, Reference::Bubble(LayoutEdge::Bottom), 0),
        TextLocation::Below => LayoutConstraint::equal(LayoutEdge::Bottom, Reference::Bubble(LayoutEdge::Top), 0),
    };
    vec![
        vertical,
        LayoutConstraint::at_least(LayoutEdge::Left, Reference::Bubble(LayoutEdge::Left), radius).low(),
        LayoutConstraint::at_most(LayoutEdge::Right, Reference::Bubble(LayoutEdge::Right), -radius).low(),
        target.constraint(LayoutEdge::CenterX, LayoutEdge::CenterX, 0).low(),
    ]
}

/// Constraint sets for a step: the bubble's and, for highlighted steps, the arrow's.
pub(crate) struct StepConstraints {
    pub bubble: Vec<LayoutConstraint>,
    pub arrow: Option<(Vec<LayoutConstraint>, ArrowDirection)>,
}

pub(crate) fn step_constraints(step: &Step, style: &BubbleStyle, margin: u16, context: &LayoutContext<'_>) -> StepConstraints {
    match step {
        Step::Standalone(standalone) => {
            let bubble = match &standalone.placement {
                StandalonePlacement::Layout(handler) => handler(context),
                StandalonePlacement::CenterOffset(offset) => center_offset_constraints(*offset, margin),
            };
            StepConstraints { bubble, arrow: None }
        }
        Step::Highlighted(highlighted) => {
            let target = AnchorTarget::from_anchor(&highlighted.anchor);
            target_constraints(&target, highlighted.text_location, style, margin)
        }
    }
}

pub(crate) fn target_constraints(target: &AnchorTarget, location: TextLocation, style: &BubbleStyle, margin: u16) -> StepConstraints {
    StepConstraints {
        bubble: highlight_constraints(target, location, style, margin),
        arrow: Some((arrow_constraints(target, location, style), ArrowDirection::for_location(location))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::constraint::solve;
    use crate::walkthrough::anchors::AnchorMap;
    use lumen_types::CellSize;

    const CONTAINER: Rect = Rect::new(0, 0, 80, 24);

    fn anchors() -> AnchorMap {
        let mut anchors = AnchorMap::new();
        anchors.record("button", Rect::new(30, 10, 10, 3));
        anchors.record("corner", Rect::new(74, 2, 6, 1));
        anchors
    }

    #[test]
    fn above_places_bubble_bottom_gap_cells_above_anchor_top() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let style = BubbleStyle::default();
        let target = AnchorTarget::View(ViewId::from("button"));
        let constraints = highlight_constraints(&target, TextLocation::Above, &style, 1);

        let bubble = solve(&constraints, CellSize::new(20, 3), &context).unwrap();
        assert_eq!(bubble.bottom() - 10, -style.highlight_gap());
        assert_eq!(bubble.center_x(), 35);
    }

    #[test]
    fn below_places_bubble_top_gap_cells_below_anchor_bottom() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let style = BubbleStyle::default().with_y_offset(3);
        let target = AnchorTarget::View(ViewId::from("button"));
        let constraints = highlight_constraints(&target, TextLocation::Below, &style, 1);

        let bubble = solve(&constraints, CellSize::new(20, 3), &context).unwrap();
        assert_eq!(bubble.top() - 13, style.highlight_gap());
        assert_eq!(bubble.top(), 17);
    }

    #[test]
    fn margins_dominate_centering_near_the_edge() {
        let anchors = anchors();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let style = BubbleStyle::default();
        let target = AnchorTarget::View(ViewId::from("corner"));
        let constraints = highlight_constraints(&target, TextLocation::Below, &style, 4);

        let bubble = solve(&constraints, CellSize::new(30, 3), &context).unwrap();
        assert_eq!(bubble.right(), 76);
        assert_ne!(bubble.center_x(), 77);
    }

    #[test]
    fn rect_anchor_is_relative_to_the_container_origin() {
        let anchors = AnchorMap::new();
        let container = Rect::new(5, 2, 60, 20);
        let context = LayoutContext::new(container, &anchors);
        let style = BubbleStyle::default();
        let target = AnchorTarget::Rect(Rect::new(10, 4, 8, 2));
        let constraints = highlight_constraints(&target, TextLocation::Below, &style, 1);

        let bubble = solve(&constraints, CellSize::new(10, 3), &context).unwrap();
        // Rect spans columns 15..23 and rows 6..8 on screen.
        assert_eq!(bubble.center_x(), 19);
        assert_eq!(bubble.top(), 8 + style.highlight_gap());
        assert_eq!(target.resolve(&context).unwrap(), Bounds::new(15, 6, 8, 2));
    }

    #[test]
    fn arrow_tracks_anchor_but_stays_inside_rounded_bubble() {
        let anchors = anchors();
        let style = BubbleStyle::default().with_corner_radius(2);
        let target = AnchorTarget::View(ViewId::from("corner"));
        let bubble = Bounds::new(45, 6, 30, 3);
        let context = LayoutContext::new(CONTAINER, &anchors).with_bubble(bubble);

        let arrow = solve(&arrow_constraints(&target, TextLocation::Below, &style), style.arrow_size, &context).unwrap();
        assert_eq!(arrow.bottom(), bubble.top());
        assert_eq!(arrow.right(), bubble.right() - 2);
    }

    #[test]
    fn arrow_points_toward_the_highlighted_area() {
        assert_eq!(ArrowDirection::for_location(TextLocation::Above), ArrowDirection::Down);
        assert_eq!(ArrowDirection::for_location(TextLocation::Below), ArrowDirection::Up);
    }

    #[test]
    fn center_offset_moves_from_container_centre() {
        let anchors = AnchorMap::new();
        let context = LayoutContext::new(CONTAINER, &anchors);
        let bubble = solve(&center_offset_constraints(Offset::new(0, -4), 1), CellSize::new(20, 4), &context).unwrap();
        assert_eq!(bubble.center_x(), 40);
        assert_eq!(bubble.center_y(), 8);
    }
}
