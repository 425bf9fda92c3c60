pub mod render;
pub mod state;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::feed::{spawn_fetch, FeedSource, FetchEvent};

/// Run the feed viewer against the given source until the user quits.
pub async fn run_viewer(source: Arc<dyn FeedSource>) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = viewer_loop(&mut terminal, source).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn viewer_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    source: Arc<dyn FeedSource>,
) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::channel::<FetchEvent>(4);
    let mut state = AppState::new();
    let mut fetch = spawn_fetch(source.clone(), events_tx.clone());
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    let mut spinner_frame: u8 = 0;

    loop {
        terminal.draw(|f| render::draw(f, &state, spinner_frame))?;

        tokio::select! {
            _ = tick.tick() => {
                spinner_frame = spinner_frame.wrapping_add(1);
            }
            Some(event) = events_rx.recv() => {
                match event {
                    FetchEvent::Loaded(posts) => state.set_posts(posts),
                    FetchEvent::Failed(message) => state.set_error(message),
                }
            }
            Some(Ok(event)) = input.next() => {
                if let Event::Key(key) = event {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Esc => {
                            fetch.cancel();
                            return Ok(());
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            fetch.cancel();
                            return Ok(());
                        }
                        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            // Manual refresh supersedes any in-flight fetch.
                            fetch.cancel();
                            state.begin_refresh();
                            fetch = spawn_fetch(source.clone(), events_tx.clone());
                        }
                        KeyCode::Char(ch) => state.push_query_char(ch),
                        KeyCode::Backspace => state.backspace_query(),
                        KeyCode::Down => state.select_next(),
                        KeyCode::Up => state.select_prev(),
                        _ => {}
                    }
                }
            }
        }
    }
}
