use std::time::Duration;

use chrono::Utc;
use ratatui::layout::Rect;
use tracing::info;

use crate::config::{Config, StartScreen};
use crate::flow::{Advance, FlowState, QuizFlow};
use crate::models::{Question, QuizResponse};
use crate::poller::{MatchPoller, MatchState, PollConfig, PollHandle};
use crate::session::{Identity, Session};
use crate::store::ResponseStore;

/// Canvas units moved per arrow key press.
const NUDGE_STEP: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryField {
    #[default]
    Name,
    GroupCode,
}

#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    pub name: String,
    pub group_code: String,
    pub focus: EntryField,
    pub error: Option<String>,
}

impl EntryForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            EntryField::Name => &mut self.name,
            EntryField::GroupCode => &mut self.group_code,
        }
    }

    pub fn push(&mut self, c: char) {
        self.error = None;
        self.focused_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.error = None;
        self.focused_mut().pop();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            EntryField::Name => EntryField::GroupCode,
            EntryField::GroupCode => EntryField::Name,
        };
    }
}

pub enum Screen {
    Entry(EntryForm),
    Quiz(QuizFlow),
    Waiting(PollHandle),
}

pub struct App<S> {
    store: S,
    session: Session,
    questions: Vec<Question>,
    poll: PollConfig,
    submit_timeout: Duration,
    pub screen: Screen,
    notice: Option<String>,
    viewport: Rect,
    pub should_quit: bool,
}

impl<S> App<S> {
    pub fn identity(&self) -> Option<&Identity> {
        self.session.require()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    /// Last rendered terminal area, used to locate the canvas for clicks.
    pub fn viewport_canvas(&self) -> Rect {
        crate::ui::canvas_area(self.viewport)
    }

    pub fn match_state(&self) -> Option<MatchState> {
        match &self.screen {
            Screen::Waiting(handle) => Some(handle.state()),
            _ => None,
        }
    }
}

impl<S: ResponseStore + Clone> App<S> {
    /// Must be called inside a tokio runtime when opening on the waiting
    /// screen, since that starts the poller.
    pub fn new(store: S, config: Config) -> Self {
        let session = match config.identity {
            Some(identity) => Session::with_identity(identity),
            None => Session::new(),
        };

        let mut app = Self {
            store,
            session,
            questions: config.questions,
            poll: config.poll,
            submit_timeout: config.submit_timeout,
            screen: Screen::Entry(EntryForm::default()),
            notice: None,
            viewport: Rect::default(),
            should_quit: false,
        };

        match config.start {
            StartScreen::Quiz => app.open_quiz(),
            StartScreen::Waiting => app.open_waiting(),
        }
        app
    }

    /// Show the quiz, or the entry screen if nobody is signed in.
    pub fn open_quiz(&mut self) {
        self.notice = None;
        self.screen = match QuizFlow::start(&self.session, self.questions.clone()) {
            Some(flow) => Screen::Quiz(flow),
            None => Screen::Entry(EntryForm::default()),
        };
    }

    /// Show the waiting screen, or the entry screen if nobody is signed in.
    pub fn open_waiting(&mut self) {
        self.notice = None;
        self.screen = match self.session.require() {
            Some(identity) => Screen::Waiting(MatchPoller::spawn(
                self.store.clone(),
                identity.clone(),
                self.poll,
            )),
            None => Screen::Entry(EntryForm::default()),
        };
    }

    /// Validate the entry form and start the quiz.
    pub fn submit_entry(&mut self) {
        let Screen::Entry(form) = &mut self.screen else {
            return;
        };

        match Identity::new(&form.name, &form.group_code) {
            Ok(identity) => {
                info!(user = identity.user_name(), group = identity.group_code(), "signed in");
                self.session.sign_in(identity);
                self.open_quiz();
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    /// Forget the identity and go back to the entry screen.
    pub fn start_over(&mut self) {
        self.session.reset();
        self.notice = None;
        self.screen = Screen::Entry(EntryForm::default());
    }

    /// Handle a left click at a terminal cell.
    pub fn click(&mut self, column: u16, row: u16) {
        let canvas_area = self.viewport_canvas();
        let Screen::Quiz(flow) = &mut self.screen else {
            return;
        };

        if let Some((x, y)) = flow.canvas().project(canvas_area, column, row) {
            self.notice = None;
            flow.click(x, y);
        }
    }

    /// Move the marker with the keyboard, starting from the centre.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        let Screen::Quiz(flow) = &mut self.screen else {
            return;
        };

        let size = flow.canvas().size();
        let (x, y) = flow.canvas().marker().unwrap_or((size / 2.0, size / 2.0));
        self.notice = None;
        flow.click(x + dx * NUDGE_STEP, y + dy * NUDGE_STEP);
    }

    /// Commit the current answer. Returns the response to write when the
    /// last question was answered.
    pub fn advance(&mut self) -> Option<QuizResponse> {
        let Screen::Quiz(flow) = &mut self.screen else {
            return None;
        };

        match flow.advance(Utc::now()) {
            Ok(Advance::Next(_)) => {
                self.notice = None;
                None
            }
            Ok(Advance::Submit(response)) => Some(response),
            Err(e) => {
                self.notice = Some(e.to_string());
                None
            }
        }
    }

    /// Write a response handed out by [`App::advance`] and move on to the
    /// waiting screen once it is stored.
    pub async fn submit(&mut self, response: QuizResponse) {
        let Screen::Quiz(flow) = &mut self.screen else {
            return;
        };

        let state = flow.submit(&self.store, &response, self.submit_timeout).await;
        if *state == FlowState::Complete {
            self.open_waiting();
        }
    }
}
