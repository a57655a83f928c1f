//! Resolved runtime settings.

use std::time::Duration;

use tracing::info;

use crate::data::default_questions;
use crate::flow::DEFAULT_SUBMIT_TIMEOUT;
use crate::models::Question;
use crate::poller::PollConfig;
use crate::session::Identity;

/// Environment variable consulted for the database URL.
pub const DATABASE_URL_ENV: &str = "GRID_QUIZ_DATABASE_URL";

/// Where responses are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Realtime database at this base URL.
    Remote(String),
    /// In-process store; nothing leaves the machine.
    Offline,
}

/// Which screen the TUI opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartScreen {
    #[default]
    Quiz,
    Waiting,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub questions: Vec<Question>,
    pub poll: PollConfig,
    pub submit_timeout: Duration,
    /// Skips the entry screen when present.
    pub identity: Option<Identity>,
    pub start: StartScreen,
}

impl Config {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            questions: default_questions(),
            poll: PollConfig::default(),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            identity: None,
            start: StartScreen::default(),
        }
    }

    pub fn log_summary(&self) {
        match &self.backend {
            Backend::Remote(url) => info!(%url, "using remote database"),
            Backend::Offline => info!("using offline in-memory store"),
        }
        info!(
            questions = self.questions.len(),
            poll_interval = ?self.poll.interval,
            min_display = ?self.poll.min_display,
            submit_timeout = ?self.submit_timeout,
            "configuration loaded"
        );
    }
}
