//! Showcase screen: a title, a slider and four buttons for walkthroughs to
//! point at.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::walkthrough::anchors::AnchorMap;

pub const TITLE: &str = "title";
pub const SLIDER: &str = "slider";
pub const BUTTONS: [&str; 4] = ["button1", "button2", "button3", "button4"];

const ACCENT: Color = Color::Rgb(0x4A, 0x90, 0xE2);
const MUTED: Color = Color::Rgb(0x8A, 0x8F, 0x98);
const SLIDER_WIDTH: u16 = 40;
const BUTTON_WIDTH: u16 = 16;

/// What the screen wants the app to do after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    Quit,
    RestartWalkthrough,
    ShowBubbles,
    ForgetCompletion,
}

#[derive(Debug, Default, Clone, Copy)]
struct Frames {
    slider: Rect,
    buttons: [Rect; 4],
}

#[derive(Debug)]
pub struct DemoScreen {
    title: String,
    level: u16,
    pressed: Option<usize>,
    status: Rc<RefCell<String>>,
    frames: Frames,
}

impl DemoScreen {
    pub fn new(title: impl Into<String>, status: Rc<RefCell<String>>) -> Self {
        Self {
            title: title.into(),
            level: 50,
            pressed: None,
            status,
            frames: Frames::default(),
        }
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.borrow_mut() = message.into();
    }

    fn press(&mut self, index: usize) {
        self.pressed = Some(index);
        let message = match index {
            0 => "Button 1 pressed ... nothing happens.".to_string(),
            _ => format!("Button {} pressed.", index + 1),
        };
        self.set_status(message);
    }

    fn nudge(&mut self, delta: i32) {
        self.level = (i32::from(self.level) + delta).clamp(0, 100) as u16;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Quit,
            KeyCode::Char('w') => return ScreenAction::RestartWalkthrough,
            KeyCode::Char('b') => return ScreenAction::ShowBubbles,
            KeyCode::Char('r') => return ScreenAction::ForgetCompletion,
            KeyCode::Left => self.nudge(-5),
            KeyCode::Right => self.nudge(5),
            KeyCode::Char(digit @ '1'..='4') => self.press(usize::from(digit as u8 - b'1')),
            _ => {}
        }
        ScreenAction::None
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) && mouse.kind != MouseEventKind::Drag(MouseButton::Left) {
            return;
        }
        let position = Position::new(mouse.column, mouse.row);
        if self.frames.slider.contains(position) {
            let track = self.frames.slider.width.saturating_sub(1).max(1);
            let offset = mouse.column - self.frames.slider.x;
            self.level = (u32::from(offset) * 100 / u32::from(track)).min(100) as u16;
            return;
        }
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && let Some(index) = self.frames.buttons.iter().position(|frame| frame.contains(position))
        {
            self.press(index);
        }
    }

    /// Draw the screen and record where its views ended up.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, anchors: &mut AnchorMap) {
        let [title_area, slider_area, buttons_area, status_area, hints_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let [title] = Layout::horizontal([Constraint::Length(self.title.width() as u16 + 4)])
            .flex(Flex::Center)
            .areas(title_area);
        Paragraph::new(Line::from(Span::styled(
            self.title.as_str(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )))
        .centered()
        .block(Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(MUTED)))
        .render(title, buf);
        anchors.record(TITLE, title);

        let [slider] = Layout::horizontal([Constraint::Length(SLIDER_WIDTH)])
            .flex(Flex::Center)
            .areas(Rect::new(slider_area.x, slider_area.y + 1, slider_area.width, slider_area.height.min(1)));
        self.render_slider(slider, buf);
        anchors.record(SLIDER, slider);
        self.frames.slider = slider;

        let rows = Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Length(3)])
            .flex(Flex::Center)
            .split(buttons_area);
        for (row, indices) in [(rows[0], [0, 1]), (rows[2], [2, 3])] {
            let columns = Layout::horizontal([Constraint::Length(BUTTON_WIDTH); 2])
                .flex(Flex::SpaceAround)
                .split(row);
            for (column, index) in columns.iter().zip(indices) {
                self.render_button(index, *column, buf);
                anchors.record(BUTTONS[index], *column);
                self.frames.buttons[index] = *column;
            }
        }

        Paragraph::new(self.status.borrow().as_str())
            .style(Style::default().fg(ACCENT))
            .centered()
            .render(status_area, buf);
        Paragraph::new("←/→ slider · 1-4 buttons · w walkthrough · b bubbles · r reset · q quit")
            .style(Style::default().fg(MUTED))
            .centered()
            .render(hints_area, buf);
    }

    fn render_slider(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }
        let track = area.width - 1;
        let knob = (u32::from(track) * u32::from(self.level) / 100) as u16;
        let line = Line::from(vec![
            Span::styled("━".repeat(usize::from(knob)), Style::default().fg(ACCENT)),
            Span::styled("●", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled("─".repeat(usize::from(track - knob)), Style::default().fg(MUTED)),
        ]);
        line.render(area, buf);
    }

    fn render_button(&self, index: usize, area: Rect, buf: &mut Buffer) {
        let pressed = self.pressed == Some(index);
        let border = if pressed { ACCENT } else { MUTED };
        Paragraph::new(format!("Button {}", index + 1))
            .centered()
            .style(Style::default().add_modifier(if pressed { Modifier::BOLD } else { Modifier::empty() }))
            .block(Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(border)))
            .render(area, buf);
    }
}
