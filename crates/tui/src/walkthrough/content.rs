//! What a bubble shows: plain text, rich text, or a custom view.

use std::fmt;

use crossterm::event::{KeyEvent, MouseEvent};
use lumen_types::CellSize;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Widget, Wrap};

use super::style::BubbleStyle;

/// Result of routing input to custom content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentAction {
    /// Not handled; the walkthrough treats the input as usual.
    Ignored,
    /// Handled by the content; nothing else happens.
    Consumed,
    /// The content asks the walkthrough to move on, even past a step that
    /// needs interaction.
    StepWalkthrough,
}

/// A view embedded in a bubble.
pub trait CustomContent {
    /// Size of the content when at most `max_width` cells are available.
    fn preferred_size(&self, max_width: u16) -> CellSize;

    fn render(&mut self, area: Rect, buf: &mut Buffer, style: &BubbleStyle);

    fn handle_key(&mut self, _key: KeyEvent) -> ContentAction {
        ContentAction::Ignored
    }

    /// `area` is where the content was last drawn.
    fn handle_mouse(&mut self, _mouse: MouseEvent, _area: Rect) -> ContentAction {
        ContentAction::Ignored
    }
}

pub enum Content {
    PlainText(String),
    RichText(Text<'static>),
    Custom(Box<dyn CustomContent>),
}

impl Content {
    pub fn plain(text: impl Into<String>) -> Self {
        Content::PlainText(text.into())
    }

    pub fn rich(text: impl Into<Text<'static>>) -> Self {
        Content::RichText(text.into())
    }

    pub fn custom(content: impl CustomContent + 'static) -> Self {
        Content::Custom(Box::new(content))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Content::Custom(_))
    }

    /// Size of the content wrapped to at most `max_width` cells.
    pub fn measure(&self, max_width: u16) -> CellSize {
        if max_width == 0 {
            return CellSize::default();
        }
        match self {
            Content::PlainText(text) => measure_text(Text::raw(text.as_str()), max_width),
            Content::RichText(text) => measure_text(text.clone(), max_width),
            Content::Custom(custom) => {
                let size = custom.preferred_size(max_width);
                CellSize::new(size.width.min(max_width), size.height)
            }
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, style: &BubbleStyle) {
        if area.is_empty() {
            return;
        }
        let base = Style::default().fg(style.text_color).bg(style.background_color);
        match self {
            Content::PlainText(text) => wrapped(Text::raw(text.as_str())).style(base).render(area, buf),
            Content::RichText(text) => wrapped(text.clone()).style(base).render(area, buf),
            Content::Custom(custom) => custom.render(area, buf, style),
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> ContentAction {
        match self {
            Content::Custom(custom) => custom.handle_key(key),
            _ => ContentAction::Ignored,
        }
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) -> ContentAction {
        match self {
            Content::Custom(custom) => custom.handle_mouse(mouse, area),
            _ => ContentAction::Ignored,
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::PlainText(text) => f.debug_tuple("PlainText").field(text).finish(),
            Content::RichText(text) => f.debug_tuple("RichText").field(text).finish(),
            Content::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::plain(value)
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::PlainText(value)
    }
}

impl From<Text<'static>> for Content {
    fn from(value: Text<'static>) -> Self {
        Content::RichText(value)
    }
}

fn wrapped<'a>(text: Text<'a>) -> Paragraph<'a> {
    Paragraph::new(text).wrap(Wrap { trim: true })
}

fn measure_text(text: Text<'_>, max_width: u16) -> CellSize {
    let paragraph = wrapped(text);
    let natural = u16::try_from(paragraph.line_width()).unwrap_or(u16::MAX);
    let width = natural.min(max_width);
    if width == 0 {
        return CellSize::default();
    }
    let height = u16::try_from(paragraph.line_count(width)).unwrap_or(u16::MAX);
    CellSize::new(width, height)
}
