//! The built-in walkthrough of the showcase screen.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use lumen_types::{CellSize, LayoutEdge, Offset};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use super::screen::{BUTTONS, SLIDER};
use crate::layout::constraint::{LayoutConstraint, Reference};
use crate::walkthrough::content::{Content, ContentAction, CustomContent};
use crate::walkthrough::provider::WalkthroughProvider;
use crate::walkthrough::step::{HighlightedStep, StandaloneStep, Step};
use crate::walkthrough::style::BubbleStyle;

const STRIPES: [Color; 3] = [
    Color::Rgb(0xFF, 0xCC, 0x00),
    Color::Rgb(0xFF, 0x95, 0x00),
    Color::Rgb(0xFF, 0x3B, 0x30),
];
const STRIPES_LABEL: &str = "You can even put a custom view in a bubble like this. Press Enter or click the button to go on.";
const STRIPES_BUTTON: &str = "[ Got it ]";
const STRIPES_MAX_WIDTH: u16 = 36;

#[derive(Debug, Default)]
pub struct DemoTour;

impl WalkthroughProvider for DemoTour {
    fn walkthrough_steps(&self) -> Vec<Step> {
        let rich = Text::from(Line::from(vec![
            Span::raw("You can also use rich text. "),
            Span::styled("For example some bold text.", Style::default().add_modifier(Modifier::BOLD)),
        ]));

        vec![
            StandaloneStep::with_layout(
                "This is a demo of Lumen. Use it to introduce your app to new users or highlight new features.",
                |context| {
                    vec![
                        LayoutConstraint::equal(LayoutEdge::CenterX, Reference::Container(LayoutEdge::CenterX), 0),
                        LayoutConstraint::equal(
                            LayoutEdge::Top,
                            Reference::Container(LayoutEdge::Top),
                            i32::from(context.container.height / 3),
                        ),
                    ]
                },
            )
            .into(),
            HighlightedStep::below(
                SLIDER,
                "It can be configured to progress automatically and/or require a key press or click to move to the next element. This is by the way a slider.",
            )
            .into(),
            HighlightedStep::below(BUTTONS[0], "If you press this button ... nothing happens.").into(),
            HighlightedStep::above(BUTTONS[1], rich).into(),
            HighlightedStep::below(BUTTONS[2], Content::custom(ColorStrips::default()))
                .requiring_interaction()
                .into(),
            HighlightedStep::above(
                BUTTONS[3],
                "This is the fourth and last button on this screen, and also the end of the onboarding.",
            )
            .into(),
            StandaloneStep::centered(
                "For more advanced usage scenarios, you can add a delegate to take action on walkthrough completion.\nThanks for your attention!",
                Offset::new(0, -4),
            )
            .into(),
        ]
    }
}

/// Three colored stripes, a label and a button that moves the walkthrough on.
#[derive(Debug, Default)]
pub struct ColorStrips {
    button: Option<Rect>,
}

impl ColorStrips {
    fn label(max_width: u16) -> (Paragraph<'static>, u16) {
        let paragraph = Paragraph::new(STRIPES_LABEL).wrap(Wrap { trim: true });
        let lines = u16::try_from(paragraph.line_count(max_width)).unwrap_or(u16::MAX);
        (paragraph, lines)
    }
}

impl CustomContent for ColorStrips {
    fn preferred_size(&self, max_width: u16) -> CellSize {
        let width = max_width.min(STRIPES_MAX_WIDTH);
        let (_, label_lines) = Self::label(width);
        // label, stripes, gap, button
        CellSize::new(width, label_lines.saturating_add(3))
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, style: &BubbleStyle) {
        let (label, label_lines) = Self::label(area.width);
        let [label_area, stripes_area, _, button_area] = Layout::vertical([
            Constraint::Length(label_lines),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        label.style(Style::default().fg(style.text_color)).render(label_area, buf);
        let stripes = Layout::horizontal([Constraint::Fill(1); 3]).split(stripes_area);
        for (stripe, color) in stripes.iter().zip(STRIPES) {
            buf.set_style(*stripe, Style::default().bg(color));
        }

        let [button] = Layout::horizontal([Constraint::Length(STRIPES_BUTTON.width() as u16)])
            .flex(Flex::Center)
            .areas(button_area);
        Paragraph::new(STRIPES_BUTTON)
            .style(Style::default().fg(style.background_color).bg(style.text_color).add_modifier(Modifier::BOLD))
            .render(button, buf);
        self.button = Some(button);
    }

    fn handle_key(&mut self, key: KeyEvent) -> ContentAction {
        match key.code {
            KeyCode::Enter => ContentAction::StepWalkthrough,
            _ => ContentAction::Ignored,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, _area: Rect) -> ContentAction {
        let on_button = self
            .button
            .is_some_and(|button| button.contains(Position::new(mouse.column, mouse.row)));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if on_button => ContentAction::StepWalkthrough,
            _ => ContentAction::Consumed,
        }
    }
}
