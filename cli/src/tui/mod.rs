//! Interactive status grid.
//!
//! Redraws on every change notification from the probe workers, polls the
//! keyboard between redraws, and leaves the final grid on screen for the
//! configured exit delay once every port is up.

mod app;
mod ui;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use portwatch_core::Config;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::commands::wait::{WaitOutcome, WaitSession};
use app::App;

/// Keyboard polling interval while nothing changes.
const TICK: Duration = Duration::from_millis(100);

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(session: WaitSession, config: &Config) -> Result<WaitOutcome> {
    let mut terminal = setup()?;
    let result = event_loop(&mut terminal, session, config).await;
    restore(&mut terminal)?;
    result
}

fn setup() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn restore(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Tui,
    mut session: WaitSession,
    config: &Config,
) -> Result<WaitOutcome> {
    let mut app = App::new(Arc::clone(&session.table), config.host.clone());

    let completed = loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        tokio::select! {
            _ = session.signal.notified() => {}
            done = &mut session.done => break done.is_ok(),
            _ = tokio::time::sleep(TICK) => {
                if quit_requested()? {
                    return Ok(WaitOutcome::Interrupted);
                }
            }
        }
    };

    if !completed {
        return Err(session.failure().await);
    }

    app.finish();
    terminal.draw(|f| ui::draw(f, &app))?;
    tokio::time::sleep(config.exit_delay()).await;
    Ok(WaitOutcome::Completed)
}

/// Drain pending key events; true if the user asked to quit.
fn quit_requested() -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(true)
            }
            _ => {}
        }
    }
    Ok(false)
}
