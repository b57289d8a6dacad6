//! Priority-based linear constraints for bubble and arrow placement.
//!
//! Each constraint relates one edge of the laid out item to a live reference
//! value plus a constant. Resolution is done per axis:
//!
//! 1. Required constraints form a feasible interval (equalities pin it).
//! 2. Low-priority inequalities narrow the interval, but only while it stays
//!    non-empty.
//! 3. The first low-priority equality is the preferred position, clamped into
//!    whatever interval remains.
//!
//! A required constraint therefore always wins over a low one: a bubble that
//! would be centred past the container margin is pushed back inside it.

use lumen_types::{Axis, CellSize, LayoutEdge, LayoutPriority, LayoutRelation};
use ratatui::layout::{Position, Rect};
use thiserror::Error;
use tracing::debug;

use crate::walkthrough::anchors::{AnchorMap, ViewId};

/// Errors raised while resolving constraint references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("anchor view '{0}' is not registered on screen")]
    UnresolvedAnchor(ViewId),
    #[error("constraint references the bubble before the bubble was placed")]
    BubbleNotPlaced,
}

/// Rectangle with a signed origin. Placements may lie partly or entirely
/// outside the screen; they are clipped when drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub const fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x as i32, rect.y as i32, rect.width, rect.height)
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    pub const fn center_x(&self) -> i32 {
        self.x.saturating_add((self.width / 2) as i32)
    }

    pub const fn center_y(&self) -> i32 {
        self.y.saturating_add((self.height / 2) as i32)
    }

    pub const fn size(&self) -> CellSize {
        CellSize::new(self.width, self.height)
    }

    pub const fn edge(&self, edge: LayoutEdge) -> i32 {
        match edge {
            LayoutEdge::Left => self.left(),
            LayoutEdge::Right => self.right(),
            LayoutEdge::CenterX => self.center_x(),
            LayoutEdge::Top => self.top(),
            LayoutEdge::Bottom => self.bottom(),
            LayoutEdge::CenterY => self.center_y(),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        let (column, row) = (i32::from(position.x), i32::from(position.y));
        column >= self.left() && column < self.right() && row >= self.top() && row < self.bottom()
    }

    /// Visible part of the bounds inside `area`.
    pub fn clip(&self, area: Rect) -> Option<Rect> {
        clip_edges(self.left(), self.top(), self.right(), self.bottom(), area)
    }

    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }
}

/// Intersect an edge-described rectangle with `area`.
pub(crate) fn clip_edges(left: i32, top: i32, right: i32, bottom: i32, area: Rect) -> Option<Rect> {
    let left = left.max(i32::from(area.left()));
    let top = top.max(i32::from(area.top()));
    let right = right.min(i32::from(area.right()));
    let bottom = bottom.min(i32::from(area.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(left as u16, top as u16, (right - left) as u16, (bottom - top) as u16))
}

/// Live value a constraint is measured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Edge of the container the walkthrough is attached to.
    Container(LayoutEdge),
    /// Edge of a registered view, resolved at evaluation time.
    View(ViewId, LayoutEdge),
    /// Edge of the already placed bubble (arrow constraints only).
    Bubble(LayoutEdge),
    /// The constant alone, in absolute screen cells.
    Absolute,
}

/// `item.edge <relation> reference + constant` at a priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConstraint {
    pub edge: LayoutEdge,
    pub relation: LayoutRelation,
    pub reference: Reference,
    pub constant: i32,
    pub priority: LayoutPriority,
}

impl LayoutConstraint {
    pub fn new(edge: LayoutEdge, relation: LayoutRelation, reference: Reference, constant: i32) -> Self {
        Self {
            edge,
            relation,
            reference,
            constant,
            priority: LayoutPriority::Required,
        }
    }

    pub fn equal(edge: LayoutEdge, reference: Reference, constant: i32) -> Self {
        Self::new(edge, LayoutRelation::Equal, reference, constant)
    }

    pub fn at_least(edge: LayoutEdge, reference: Reference, constant: i32) -> Self {
        Self::new(edge, LayoutRelation::GreaterOrEqual, reference, constant)
    }

    pub fn at_most(edge: LayoutEdge, reference: Reference, constant: i32) -> Self {
        Self::new(edge, LayoutRelation::LessOrEqual, reference, constant)
    }

    #[must_use]
    pub fn with_priority(mut self, priority: LayoutPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Shorthand for [`LayoutPriority::Low`].
    #[must_use]
    pub fn low(self) -> Self {
        self.with_priority(LayoutPriority::Low)
    }

    pub fn axis(&self) -> Axis {
        self.edge.axis()
    }
}

/// Geometry that constraint references resolve against.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub container: Rect,
    pub anchors: &'a AnchorMap,
    pub bubble: Option<Bounds>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(container: Rect, anchors: &'a AnchorMap) -> Self {
        Self {
            container,
            anchors,
            bubble: None,
        }
    }

    #[must_use]
    pub fn with_bubble(mut self, bubble: Bounds) -> Self {
        self.bubble = Some(bubble);
        self
    }

    pub fn resolve(&self, reference: &Reference) -> Result<i32, PlacementError> {
        match reference {
            Reference::Container(edge) => Ok(Bounds::from_rect(self.container).edge(*edge)),
            Reference::View(id, edge) => self
                .anchors
                .resolve(id)
                .map(|frame| Bounds::from_rect(frame).edge(*edge))
                .ok_or_else(|| PlacementError::UnresolvedAnchor(id.clone())),
            Reference::Bubble(edge) => self.bubble.map(|bubble| bubble.edge(*edge)).ok_or(PlacementError::BubbleNotPlaced),
            Reference::Absolute => Ok(0),
        }
    }
}

/// Place an item of `size` so that it satisfies `constraints`. Arithmetic
/// saturates, so extreme constants park the item far off screen.
pub fn solve(constraints: &[LayoutConstraint], size: CellSize, context: &LayoutContext<'_>) -> Result<Bounds, PlacementError> {
    let x = solve_axis(constraints, Axis::Horizontal, size.width, context)?;
    let y = solve_axis(constraints, Axis::Vertical, size.height, context)?;
    Ok(Bounds::new(x, y, size.width, size.height))
}

fn origin_for(edge: LayoutEdge, value: i32, extent: u16) -> i32 {
    match edge {
        LayoutEdge::Left | LayoutEdge::Top => value,
        LayoutEdge::Right | LayoutEdge::Bottom => value.saturating_sub(i32::from(extent)),
        LayoutEdge::CenterX | LayoutEdge::CenterY => value.saturating_sub(i32::from(extent / 2)),
    }
}

fn solve_axis(constraints: &[LayoutConstraint], axis: Axis, extent: u16, context: &LayoutContext<'_>) -> Result<i32, PlacementError> {
    let mut lower: Option<i32> = None;
    let mut upper: Option<i32> = None;
    let mut pinned: Option<i32> = None;
    let mut preferred: Option<i32> = None;
    let mut low_inequalities = Vec::new();

    for constraint in constraints.iter().filter(|constraint| constraint.axis() == axis) {
        let value = context.resolve(&constraint.reference)?.saturating_add(constraint.constant);
        let origin = origin_for(constraint.edge, value, extent);
        match (constraint.priority, constraint.relation) {
            (LayoutPriority::Required, LayoutRelation::Equal) => match pinned {
                Some(existing) if existing != origin => {
                    debug!(?axis, existing, ignored = origin, "conflicting required equalities; keeping the first");
                }
                _ => pinned = Some(origin),
            },
            (LayoutPriority::Required, LayoutRelation::GreaterOrEqual) => lower = Some(lower.map_or(origin, |lower| lower.max(origin))),
            (LayoutPriority::Required, LayoutRelation::LessOrEqual) => upper = Some(upper.map_or(origin, |upper| upper.min(origin))),
            (LayoutPriority::Low, LayoutRelation::Equal) => {
                preferred.get_or_insert(origin);
            }
            (LayoutPriority::Low, relation) => low_inequalities.push((relation, origin)),
        }
    }

    if let (Some(low), Some(high)) = (lower, upper)
        && low > high
    {
        debug!(?axis, low, high, "required constraints cannot all hold; favouring the leading edge");
        return Ok(low);
    }

    if let Some(pinned) = pinned {
        return Ok(clamp_optional(pinned, lower, upper));
    }

    for (relation, origin) in low_inequalities {
        match relation {
            LayoutRelation::GreaterOrEqual if upper.is_none_or(|upper| origin <= upper) => {
                lower = Some(lower.map_or(origin, |lower| lower.max(origin)));
            }
            LayoutRelation::LessOrEqual if lower.is_none_or(|lower| origin >= lower) => {
                upper = Some(upper.map_or(origin, |upper| upper.min(origin)));
            }
            _ => {}
        }
    }

    let origin = match preferred {
        Some(preferred) => clamp_optional(preferred, lower, upper),
        None => lower.or(upper).unwrap_or(0),
    };
    Ok(origin)
}

fn clamp_optional(value: i32, lower: Option<i32>, upper: Option<i32>) -> i32 {
    let value = lower.map_or(value, |lower| value.max(lower));
    upper.map_or(value, |upper| value.min(upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(anchors: &AnchorMap) -> LayoutContext<'_> {
        LayoutContext::new(Rect::new(0, 0, 80, 24), anchors)
    }

    #[test]
    fn low_centering_is_used_when_unconstrained() {
        let anchors = AnchorMap::new();
        let constraints = vec![
            LayoutConstraint::equal(LayoutEdge::CenterX, Reference::Container(LayoutEdge::CenterX), 0).low(),
            LayoutConstraint::equal(LayoutEdge::Top, Reference::Container(LayoutEdge::Top), 3),
        ];
        let bounds = solve(&constraints, CellSize::new(20, 4), &context(&anchors)).unwrap();
        assert_eq!(bounds, Bounds::new(30, 3, 20, 4));
    }

    #[test]
    fn required_margin_beats_low_centering() {
        let mut anchors = AnchorMap::new();
        anchors.record("edge", Rect::new(76, 10, 4, 1));
        let constraints = vec![
            LayoutConstraint::equal(LayoutEdge::CenterX, Reference::View(ViewId::from("edge"), LayoutEdge::CenterX), 0).low(),
            LayoutConstraint::at_least(LayoutEdge::Left, Reference::Container(LayoutEdge::Left), 2),
            LayoutConstraint::at_most(LayoutEdge::Right, Reference::Container(LayoutEdge::Right), -2),
        ];
        let bounds = solve(&constraints, CellSize::new(30, 3), &context(&anchors)).unwrap();
        assert_eq!(bounds.right(), 78);
    }

    #[test]
    fn low_inequalities_yield_when_infeasible() {
        let anchors = AnchorMap::new();
        let bubble = Bounds::new(10, 0, 4, 2);
        let ctx = context(&anchors).with_bubble(bubble);
        let constraints = vec![
            LayoutConstraint::at_least(LayoutEdge::Left, Reference::Bubble(LayoutEdge::Left), 2).low(),
            LayoutConstraint::at_most(LayoutEdge::Right, Reference::Bubble(LayoutEdge::Right), -2).low(),
            LayoutConstraint::equal(LayoutEdge::CenterX, Reference::Absolute, 0).low(),
        ];
        let bounds = solve(&constraints, CellSize::new(3, 1), &ctx).unwrap();
        // Only the first inequality fits; the centre target is clamped against it.
        assert_eq!(bounds.x, 12);
    }

    #[test]
    fn unresolved_view_is_reported() {
        let anchors = AnchorMap::new();
        let constraints = vec![LayoutConstraint::equal(
            LayoutEdge::Top,
            Reference::View(ViewId::from("missing"), LayoutEdge::Bottom),
            1,
        )];
        let error = solve(&constraints, CellSize::new(1, 1), &context(&anchors)).unwrap_err();
        assert_eq!(error, PlacementError::UnresolvedAnchor(ViewId::from("missing")));
    }

    #[test]
    fn bubble_reference_requires_a_placed_bubble() {
        let anchors = AnchorMap::new();
        let constraints = vec![LayoutConstraint::equal(LayoutEdge::Top, Reference::Bubble(LayoutEdge::Bottom), 0)];
        assert_eq!(
            solve(&constraints, CellSize::new(1, 1), &context(&anchors)).unwrap_err(),
            PlacementError::BubbleNotPlaced
        );
    }

    #[test]
    fn extreme_constants_saturate_off_screen() {
        let anchors = AnchorMap::new();
        let constraints = vec![
            LayoutConstraint::equal(LayoutEdge::Left, Reference::Container(LayoutEdge::Right), i32::MAX),
            LayoutConstraint::equal(LayoutEdge::Bottom, Reference::Container(LayoutEdge::Top), i32::MIN),
        ];
        let bounds = solve(&constraints, CellSize::new(20, 4), &context(&anchors)).unwrap();
        assert_eq!(bounds.x, i32::MAX);
        assert_eq!(bounds.y, i32::MIN);
        assert_eq!(bounds.right(), i32::MAX);
        assert_eq!(bounds.clip(Rect::new(0, 0, 80, 24)), None);
        assert_eq!(bounds.translate(1, -1), bounds);
    }

    #[test]
    fn bounds_clip_to_visible_area() {
        let area = Rect::new(0, 0, 10, 5);
        assert_eq!(Bounds::new(-3, -1, 6, 3).clip(area), Some(Rect::new(0, 0, 3, 2)));
        assert_eq!(Bounds::new(12, 0, 3, 3).clip(area), None);
        assert!(Bounds::new(-3, -1, 6, 3).contains(Position::new(2, 1)));
        assert!(!Bounds::new(-3, -1, 6, 3).contains(Position::new(3, 1)));
    }
}
