//! Runtime: terminal lifecycle and the event loop driving a [`DemoApp`].
//!
//! - A dedicated blocking task reads `crossterm` events and forwards them
//!   over a channel, throttling mouse moves.
//! - Ticks are fast while a bubble or the overlay is animating and slow
//!   otherwise; every tick fires due walkthrough timers.
//! - A frame is drawn after every input event and every tick.
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::prelude::CrosstermBackend;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::ui::demo::DemoApp;

const INPUT_POLL: Duration = Duration::from_millis(16);
const FAST_TICK: Duration = Duration::from_millis(33);
const IDLE_TICK: Duration = Duration::from_millis(250);

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Spawn a blocking task that polls terminal input and forwards events.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);

    tokio::task::spawn_blocking(move || {
        let mut last_mouse_move = Instant::now();
        loop {
            match event::poll(INPUT_POLL) {
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                    continue;
                }
                Ok(true) => {}
                Err(error) => {
                    warn!(%error, "failed to poll terminal input");
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(error) => {
                    warn!(%error, "failed to read terminal input");
                    break;
                }
            };
            if event.as_mouse_event().is_some_and(|mouse| mouse.kind == MouseEventKind::Moved) {
                if last_mouse_move.elapsed() < INPUT_POLL {
                    continue;
                }
                last_mouse_move = Instant::now();
            }
            if sender.blocking_send(event).is_err() {
                break;
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Term, app: &mut DemoApp) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        app.render(area, frame.buffer_mut());
    })?;
    Ok(())
}

fn is_ctrl_c(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Run `app` in the alternate screen until it quits or Ctrl+C is pressed.
pub async fn run_app(mut app: DemoApp) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut terminal = setup_terminal()?;

    let mut current_interval = IDLE_TICK;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = async {
        render(&mut terminal, &mut app)?;
        loop {
            let animating = app.needs_animation();
            let target_interval = if animating { FAST_TICK } else { IDLE_TICK };
            if target_interval != current_interval {
                current_interval = target_interval;
                ticker = time::interval(current_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            }

            tokio::select! {
                maybe_event = input_receiver.recv() => {
                    let Some(event) = maybe_event else {
                        debug!("input channel closed");
                        break;
                    };
                    if is_ctrl_c(&event) {
                        break;
                    }
                    app.handle_event(&event);
                }
                _ = ticker.tick() => {
                    // timers may have fired even when nothing was moving
                    app.tick();
                }
                _ = signal::ctrl_c() => { break; }
            }

            if app.should_quit() {
                break;
            }
            render(&mut terminal, &mut app)?;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    cleanup_terminal(&mut terminal)?;
    outcome
}
