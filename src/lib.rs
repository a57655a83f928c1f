//! # grid-quiz
//!
//! A terminal quiz where each answer is a dot placed on a 5x5 grid. Finished
//! answers are written to a shared realtime database under a group code, and
//! everyone else in the same group who has finished shows up as a match.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grid_quiz::{run_tui, AppError, Backend, Config, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::new(Backend::Offline);
//!     run_tui(MemoryStore::new(), config).await
//! }
//! ```

mod app;
mod config;
mod data;
mod flow;
mod grid;
mod models;
mod poller;
mod scorer;
mod session;
mod store;
pub mod terminal;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use thiserror::Error;
use tracing::info;

pub use app::{App, EntryField, EntryForm, Screen};
pub use config::{Backend, Config, StartScreen, DATABASE_URL_ENV};
pub use data::{default_questions, load_questions_from_json, LoadError};
pub use flow::{Advance, FlowError, FlowState, QuizFlow, DEFAULT_SUBMIT_TIMEOUT};
pub use grid::{map_click, GridCanvas};
pub use models::{Answer, Percentages, Question, QuizResponse};
pub use poller::{filter_matches, MatchPoller, MatchState, PollConfig, PollHandle};
pub use scorer::{compatibility, rank_by_compatibility, RankedMatch, ScoreError};
pub use session::{sanitize_key, Identity, IdentityError, Session};
pub use store::{FailureCategory, FirebaseStore, MemoryStore, ResponseStore, StoreError};

/// How long to wait for input before redrawing, so poll results show up.
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load questions: {0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Identity(#[from] IdentityError),

    #[error("{0}")]
    Config(String),

    #[error("{user} has not finished the quiz in group {group} yet")]
    NotFinished { user: String, group: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Run the interactive quiz in the terminal until the user quits.
pub async fn run_tui<S: ResponseStore + Clone>(store: S, config: Config) -> Result<(), AppError> {
    let mut app = App::new(store, config);
    let mut term = terminal::init()?;
    let result = run_event_loop(&mut term, &mut app).await;
    terminal::restore()?;
    result
}

async fn run_event_loop<S: ResponseStore + Clone>(
    terminal: &mut terminal::AppTerminal,
    app: &mut App<S>,
) -> Result<(), AppError> {
    loop {
        let completed = terminal.draw(|frame| ui::render(frame, app))?;
        let area = completed.area;
        app.set_viewport(area);

        if app.should_quit {
            break;
        }

        if !event::poll(INPUT_POLL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(response) = handle_key(app, key.code) {
                    // Show "Processing..." while the write is in flight.
                    terminal.draw(|frame| ui::render(frame, app))?;
                    app.submit(response).await;
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                app.click(mouse.column, mouse.row);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Returns a response that must be submitted, if the key finished the quiz.
fn handle_key<S: ResponseStore + Clone>(app: &mut App<S>, key: KeyCode) -> Option<QuizResponse> {
    match &mut app.screen {
        Screen::Entry(form) => {
            match key {
                KeyCode::Esc => app.should_quit = true,
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    form.toggle_focus()
                }
                KeyCode::Backspace => form.pop(),
                KeyCode::Char(c) => form.push(c),
                KeyCode::Enter => app.submit_entry(),
                _ => {}
            }
            None
        }
        Screen::Quiz(_) => match key {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => app.advance(),
            KeyCode::Left | KeyCode::Char('h') => {
                app.nudge(-1.0, 0.0);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.nudge(1.0, 0.0);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.nudge(0.0, -1.0);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.nudge(0.0, 1.0);
                None
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                app.should_quit = true;
                None
            }
            _ => None,
        },
        Screen::Waiting(handle) => {
            let failed = matches!(handle.state(), MatchState::Failed(_));
            match key {
                KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') if failed => {
                    app.start_over()
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
                _ => {}
            }
            None
        }
    }
}

/// Rank everyone else in the group by how closely they answered like the
/// given user.
pub async fn compatibility_report<S: ResponseStore>(
    store: &S,
    identity: &Identity,
) -> Result<Vec<RankedMatch>, AppError> {
    let group = store.read_group(identity.group_code()).await?;

    let me = group
        .values()
        .find(|response| response.user_name == identity.user_name())
        .cloned()
        .ok_or_else(|| AppError::NotFinished {
            user: identity.user_name().to_string(),
            group: identity.group_code().to_string(),
        })?;

    let others = filter_matches(group.into_values(), identity.user_name());
    let ranked = rank_by_compatibility(&me, &others);
    info!(peers = ranked.len(), "scored group");

    Ok(ranked)
}
