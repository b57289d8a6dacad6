//! Dimming overlay with a highlight hole.
//!
//! The overlay dims everything except a rectangular hole. The dimmed region
//! is made of four strips around the hole (top, bottom, left, right) whose
//! length exceeds any terminal, so they cover the whole container wherever
//! the hole is. The strips are recomputed from the container on every render
//! and the hole is animated with the step transition.

use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use lumen_types::CellSize;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Color;

use super::animation::{Lerp, Tween, lerp_i32, lerp_u16};
use super::chrome::dim_cell;
use crate::layout::Bounds;
use crate::layout::constraint::clip_edges;

/// Fade-in time after the overlay is attached.
pub const FADE_IN: Duration = Duration::from_millis(300);

/// Length of each dimming strip, larger than any terminal dimension.
const STRIP_LENGTH: i32 = u16::MAX as i32;

/// Undimmed region, described by its centre and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hole {
    pub center_x: i32,
    pub center_y: i32,
    pub width: u16,
    pub height: u16,
}

impl Hole {
    /// Hole around `target`, grown by `padding` in width and height.
    pub fn around(target: Bounds, padding: CellSize) -> Self {
        Self {
            center_x: target.center_x(),
            center_y: target.center_y(),
            width: target.width.saturating_add(padding.width),
            height: target.height.saturating_add(padding.height),
        }
    }

    /// Hole covering the whole area.
    pub fn covering(area: Rect) -> Self {
        Self::around(Bounds::from_rect(area), CellSize::default())
    }

    /// Same centre and width, zero height.
    #[must_use]
    pub fn closed(self) -> Self {
        Self { height: 0, ..self }
    }

    pub fn is_closed(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.center_x.saturating_sub(i32::from(self.width / 2)),
            self.center_y.saturating_sub(i32::from(self.height / 2)),
            self.width,
            self.height,
        )
    }
}

impl Lerp for Hole {
    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            center_x: lerp_i32(self.center_x, to.center_x, t),
            center_y: lerp_i32(self.center_y, to.center_y, t),
            width: lerp_u16(self.width, to.width, t),
            height: lerp_u16(self.height, to.height, t),
        }
    }
}

/// Input the overlay turns into walkthrough events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    BackgroundTapped,
}

/// The four dimming strips around `hole`, clipped to `container`.
pub fn strips(container: Rect, hole: Bounds) -> Vec<Rect> {
    let center = hole.center_x();
    [
        // top
        clip_edges(
            center.saturating_sub(STRIP_LENGTH),
            hole.top().saturating_sub(STRIP_LENGTH),
            center.saturating_add(STRIP_LENGTH),
            hole.top(),
            container,
        ),
        // bottom
        clip_edges(
            center.saturating_sub(STRIP_LENGTH),
            hole.bottom(),
            center.saturating_add(STRIP_LENGTH),
            hole.bottom().saturating_add(STRIP_LENGTH),
            container,
        ),
        // left
        clip_edges(hole.left().saturating_sub(STRIP_LENGTH), hole.top(), hole.left(), hole.bottom(), container),
        // right
        clip_edges(hole.right(), hole.top(), hole.right().saturating_add(STRIP_LENGTH), hole.bottom(), container),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[derive(Debug, Clone)]
pub struct DimmingOverlay {
    color: Color,
    alpha: f32,
    attached_at: Instant,
    hole: Option<Tween<Hole>>,
    last_area: Option<Rect>,
}

impl DimmingOverlay {
    pub fn new(color: Color, alpha: f32, now: Instant) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
            attached_at: now,
            hole: None,
            last_area: None,
        }
    }

    /// Current dim strength, ramping up over [`FADE_IN`] after attach.
    pub fn opacity(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.attached_at);
        let fade = (elapsed.as_secs_f32() / FADE_IN.as_secs_f32()).min(1.0);
        self.alpha * fade
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.attached_at) < FADE_IN
    }

    pub fn hole(&self, now: Instant) -> Option<Hole> {
        self.hole.as_ref().map(|hole| hole.value_at(now))
    }

    /// Destination of the hole animation.
    pub fn target_hole(&self) -> Option<Hole> {
        self.hole.as_ref().map(Tween::target)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.is_fading(now) || self.hole.as_ref().is_some_and(|hole| hole.is_running(now))
    }

    /// Place the hole immediately.
    pub fn settle_hole(&mut self, hole: Hole, now: Instant) {
        self.hole = Some(Tween::settled(hole, now));
    }

    /// Move the hole. With `transition`, animate from its current shape;
    /// without, keep any running animation and only change its destination.
    pub fn update_hole(&mut self, target: Hole, now: Instant, transition: Option<(Instant, Duration)>) {
        match (&mut self.hole, transition) {
            (None, _) => self.settle_hole(target, now),
            (Some(hole), Some((started, duration))) => hole.retarget(target, now, started, duration),
            (Some(hole), None) => hole.update_target(target),
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, now: Instant) {
        self.last_area = Some(area);
        let opacity = self.opacity(now);
        let hole = self.hole(now).unwrap_or_else(|| Hole::covering(area).closed());
        for strip in strips(area, hole.bounds()) {
            for position in strip.positions() {
                if let Some(cell) = buf.cell_mut(position) {
                    dim_cell(cell, self.color, opacity);
                }
            }
        }
    }

    /// Swallows every mouse event over the container; a left click becomes a
    /// background tap.
    pub fn handle_mouse(&self, mouse: &MouseEvent) -> Option<OverlayEvent> {
        let inside = self
            .last_area
            .is_none_or(|area| area.contains(Position::new(mouse.column, mouse.row)));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => Some(OverlayEvent::BackgroundTapped),
            _ => None,
        }
    }
}
