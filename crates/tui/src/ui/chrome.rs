//! Low-level drawing of bubble chrome: body, shadow, arrow and dimming.

use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier};

use crate::layout::{ArrowDirection, Bounds};
use crate::walkthrough::style::{BubbleStyle, ShadowStyle};

/// Mix `overlay` into `base` with strength `alpha`.
///
/// Only RGB colors can be mixed. Any other color is replaced by `overlay`
/// once `alpha` reaches one half and kept otherwise.
pub fn blend(base: Color, overlay: Color, alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    match (base, overlay) {
        (Color::Rgb(br, bg, bb), Color::Rgb(or, og, ob)) => {
            let mix = |b: u8, o: u8| (f32::from(b) * (1.0 - alpha) + f32::from(o) * alpha).round().clamp(0.0, 255.0) as u8;
            Color::Rgb(mix(br, or), mix(bg, og), mix(bb, ob))
        }
        _ if alpha >= 0.5 => overlay,
        (base, _) => base,
    }
}

/// Darken a cell toward `color`. Foregrounds that cannot be mixed are dimmed
/// with the `DIM` modifier instead so the text stays legible.
pub(crate) fn dim_cell(cell: &mut Cell, color: Color, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    cell.bg = blend(cell.bg, color, alpha);
    match cell.fg {
        Color::Rgb(..) => cell.fg = blend(cell.fg, color, alpha),
        _ => cell.modifier.insert(Modifier::DIM),
    }
}

/// Visit every visible cell of `bounds`.
pub(crate) fn for_each_cell(buf: &mut Buffer, area: Rect, bounds: Bounds, mut visit: impl FnMut(&mut Cell, Position)) {
    let Some(visible) = bounds.clip(area) else {
        return;
    };
    for position in visible.positions() {
        if let Some(cell) = buf.cell_mut(position) {
            visit(cell, position);
        }
    }
}

/// Whether `position` is a clipped corner of a rounded bubble.
fn is_clipped_corner(bubble: Bounds, radius: u16, position: Position) -> bool {
    if radius == 0 || bubble.width < 3 || bubble.height < 2 {
        return false;
    }
    let column = i32::from(position.x);
    let row = i32::from(position.y);
    let on_side = column == bubble.left() || column == bubble.right().saturating_sub(1);
    let on_end = row == bubble.top() || row == bubble.bottom().saturating_sub(1);
    on_side && on_end
}

pub(crate) fn draw_shadow(buf: &mut Buffer, area: Rect, bubble: Bounds, style: &BubbleStyle, shadow: &ShadowStyle) {
    let cast = bubble.translate(shadow.offset.x, shadow.offset.y);
    for_each_cell(buf, area, cast, |cell, position| {
        if bubble.contains(position) || is_clipped_corner(cast, style.corner_radius, position) {
            return;
        }
        cell.bg = blend(cell.bg, shadow.color, shadow.opacity);
        if let Color::Rgb(..) = cell.fg {
            cell.fg = blend(cell.fg, shadow.color, shadow.opacity);
        }
    });
}

pub(crate) fn draw_body(buf: &mut Buffer, area: Rect, bubble: Bounds, style: &BubbleStyle) {
    for_each_cell(buf, area, bubble, |cell, position| {
        if is_clipped_corner(bubble, style.corner_radius, position) {
            return;
        }
        cell.reset();
        cell.set_symbol(" ");
        cell.bg = style.background_color;
        cell.fg = style.text_color;
    });
}

/// Triangle pointing in `direction`, drawn in the bubble's background color
/// over whatever is behind it.
pub(crate) fn draw_arrow(buf: &mut Buffer, area: Rect, arrow: Bounds, direction: ArrowDirection, color: Color) {
    if arrow.clip(area).is_none() {
        return;
    }
    let center = arrow.center_x();
    let height = arrow.height;
    for row_from_tip in 0..height {
        let span = (u32::from(row_from_tip + 1) * u32::from(arrow.width)).div_ceil(u32::from(height)) as i32;
        let span = span.clamp(1, i32::from(arrow.width));
        let left = center - span / 2;
        let row = match direction {
            ArrowDirection::Up => arrow.top() + i32::from(row_from_tip),
            ArrowDirection::Down => arrow.bottom() - 1 - i32::from(row_from_tip),
        };
        let (tip, left_slope, right_slope) = match direction {
            ArrowDirection::Up => ('▲', '◢', '◣'),
            ArrowDirection::Down => ('▼', '◥', '◤'),
        };
        for column in left..left + span {
            let symbol = if span == 1 {
                tip
            } else if span >= 3 && column == left {
                left_slope
            } else if span >= 3 && column == left + span - 1 {
                right_slope
            } else {
                '█'
            };
            for_each_cell(buf, area, Bounds::new(column, row, 1, 1), |cell, _| {
                cell.set_char(symbol);
                cell.fg = color;
            });
        }
    }
}

/// Area inside the bubble's text insets.
pub(crate) fn inset_bounds(bubble: Bounds, style: &BubbleStyle) -> Bounds {
    let insets = style.text_insets;
    Bounds::new(
        bubble.x.saturating_add(i32::from(insets.left)),
        bubble.y.saturating_add(i32::from(insets.top)),
        bubble.width.saturating_sub(insets.horizontal()),
        bubble.height.saturating_sub(insets.vertical()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_mixes_rgb_channels() {
        assert_eq!(blend(Color::Rgb(200, 100, 0), Color::Rgb(0, 0, 0), 0.5), Color::Rgb(100, 50, 0));
        assert_eq!(blend(Color::Rgb(10, 10, 10), Color::Rgb(250, 250, 250), 0.0), Color::Rgb(10, 10, 10));
    }

    #[test]
    fn blend_replaces_unmixable_colors_past_half() {
        assert_eq!(blend(Color::Reset, Color::Rgb(0, 0, 0), 0.7), Color::Rgb(0, 0, 0));
        assert_eq!(blend(Color::Blue, Color::Rgb(0, 0, 0), 0.2), Color::Blue);
    }

    #[test]
    fn dim_cell_marks_named_foregrounds_dim() {
        let mut cell = Cell::default();
        cell.fg = Color::White;
        dim_cell(&mut cell, Color::Rgb(0, 0, 0), 0.7);
        assert!(cell.modifier.contains(Modifier::DIM));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn rounded_body_leaves_corners_untouched() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        let style = BubbleStyle::default();
        draw_body(&mut buf, area, Bounds::new(1, 1, 6, 3), &style);

        assert_eq!(buf[(1, 1)].bg, Color::Reset);
        assert_eq!(buf[(2, 1)].bg, style.background_color);
        assert_eq!(buf[(1, 2)].bg, style.background_color);
        assert_eq!(buf[(6, 3)].bg, Color::Reset);
    }

    #[test]
    fn arrow_draws_tip_glyph_for_its_direction() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        draw_arrow(&mut buf, area, Bounds::new(3, 2, 3, 1), ArrowDirection::Down, Color::White);
        assert_eq!(buf[(3, 2)].symbol(), "◥");
        assert_eq!(buf[(4, 2)].symbol(), "█");
        assert_eq!(buf[(5, 2)].symbol(), "◤");

        let mut buf = Buffer::empty(area);
        draw_arrow(&mut buf, area, Bounds::new(3, 0, 3, 2), ArrowDirection::Up, Color::White);
        assert_eq!(buf[(4, 0)].symbol(), "█");
        assert_eq!(buf[(3, 1)].symbol(), "◢");
    }

    #[test]
    fn drawing_outside_the_area_is_clipped() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        draw_body(&mut buf, area, Bounds::new(-10, -10, 30, 30), &BubbleStyle::default().with_corner_radius(0));
        assert_eq!(buf[(0, 0)].bg, BubbleStyle::default().background_color);
        assert_eq!(buf[(3, 1)].bg, BubbleStyle::default().background_color);
    }
}
