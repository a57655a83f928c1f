//! Question-by-question progression and the final submission.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::grid::GridCanvas;
use crate::models::{Answer, Question, QuizResponse};
use crate::session::{Identity, Session};
use crate::store::{ResponseStore, StoreError};

/// Default bound on how long a submission may take.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Waiting for the user to answer question `i`.
    AwaitingAnswer(usize),
    /// The completed response is being written.
    Submitting,
    /// The response was stored.
    Complete,
    /// The write failed; the user is still on question `index`.
    Failed { index: usize, reason: String },
}

/// Why an advance request was rejected. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Please select a point on the grid before continuing.")]
    NoSelection,

    #[error("Your responses are already being saved.")]
    SubmissionInFlight,

    #[error("The quiz is already complete.")]
    Finished,

    #[error("That point is not on the grid.")]
    OffGrid,
}

/// Outcome of a successful advance.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// Last answer committed; this response must now be written.
    Submit(QuizResponse),
}

pub struct QuizFlow {
    identity: Identity,
    questions: Vec<Question>,
    state: FlowState,
    canvas: GridCanvas,
    pending: Option<Answer>,
    answers: Vec<Option<Answer>>,
    assembled: Option<QuizResponse>,
}

impl QuizFlow {
    /// `questions` must not be empty.
    pub fn new(identity: Identity, questions: Vec<Question>) -> Self {
        let num_questions = questions.len();

        Self {
            identity,
            questions,
            state: FlowState::AwaitingAnswer(0),
            canvas: GridCanvas::default(),
            pending: None,
            answers: vec![None; num_questions],
            assembled: None,
        }
    }

    /// Start a quiz for the signed-in user, or `None` without an identity.
    pub fn start(session: &Session, questions: Vec<Question>) -> Option<Self> {
        let identity = session.require()?.clone();
        Some(Self::new(identity, questions))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn canvas(&self) -> &GridCanvas {
        &self.canvas
    }

    /// The answer recorded for the current question but not yet committed.
    pub fn pending(&self) -> Option<&Answer> {
        self.pending.as_ref()
    }

    pub fn answers(&self) -> &[Option<Answer>] {
        &self.answers
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question on screen. Stays on the last question while
    /// submitting and afterwards.
    pub fn current_index(&self) -> usize {
        match &self.state {
            FlowState::AwaitingAnswer(index) | FlowState::Failed { index, .. } => *index,
            FlowState::Submitting | FlowState::Complete => self.last_index(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index())
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index() == self.last_index()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FlowState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    fn accepts_answers(&self) -> bool {
        matches!(
            self.state,
            FlowState::AwaitingAnswer(_) | FlowState::Failed { .. }
        )
    }

    /// Record a click on the canvas as the answer to the current question.
    pub fn click(&mut self, x: f64, y: f64) -> Option<Answer> {
        if !self.accepts_answers() {
            return None;
        }
        let answer = self.canvas.click(x, y);
        self.record(answer).ok()?;
        Some(answer)
    }

    /// Replace the pending answer for the current question.
    pub fn record(&mut self, answer: Answer) -> Result<(), FlowError> {
        match self.state {
            FlowState::Submitting => return Err(FlowError::SubmissionInFlight),
            FlowState::Complete => return Err(FlowError::Finished),
            _ => {}
        }
        if !answer.is_valid() {
            return Err(FlowError::OffGrid);
        }

        self.pending = Some(answer);
        self.assembled = None;
        Ok(())
    }

    /// Commit the pending answer and move on.
    ///
    /// On the last question this assembles the full response and enters
    /// `Submitting`; the caller writes it and reports back through
    /// [`QuizFlow::finish_submission`]. From `Failed` the same response is
    /// handed out again unless the answer was changed in between.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, FlowError> {
        let index = match &self.state {
            FlowState::AwaitingAnswer(index) | FlowState::Failed { index, .. } => *index,
            FlowState::Submitting => return Err(FlowError::SubmissionInFlight),
            FlowState::Complete => return Err(FlowError::Finished),
        };

        let Some(answer) = self.pending else {
            return Err(FlowError::NoSelection);
        };
        self.answers[index] = Some(answer);

        if index < self.last_index() {
            self.pending = None;
            self.canvas.reset();
            self.state = FlowState::AwaitingAnswer(index + 1);
            info!(question = index + 1, "advanced to next question");
            return Ok(Advance::Next(index + 1));
        }

        let response = match &self.assembled {
            Some(response) => response.clone(),
            None => {
                let response = QuizResponse {
                    user_name: self.identity.user_name().to_string(),
                    group_code: self.identity.group_code().to_string(),
                    responses: self.answers.iter().flatten().copied().collect(),
                    timestamp: now,
                };
                self.assembled = Some(response.clone());
                response
            }
        };

        self.state = FlowState::Submitting;
        Ok(Advance::Submit(response))
    }

    /// Apply the outcome of writing the response handed out by `advance`.
    pub fn finish_submission(&mut self, result: Result<(), StoreError>) {
        if self.state != FlowState::Submitting {
            return;
        }

        match result {
            Ok(()) => {
                info!(user = self.identity.user_name(), "responses saved");
                self.state = FlowState::Complete;
            }
            Err(e) => {
                warn!(error = %e, "failed to save responses");
                self.state = FlowState::Failed {
                    index: self.last_index(),
                    reason: e.hint(),
                };
            }
        }
    }

    /// Write `response` to `store`, giving up after `limit`.
    pub async fn submit<S: ResponseStore>(
        &mut self,
        store: &S,
        response: &QuizResponse,
        limit: Duration,
    ) -> &FlowState {
        let write = store.write(
            self.identity.group_code(),
            self.identity.user_name(),
            response,
        );
        let result = tokio::time::timeout(limit, write)
            .await
            .unwrap_or(Err(StoreError::Timeout(limit)));

        self.finish_submission(result);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_questions;
    use crate::models::Percentages;
    use crate::store::{GroupResponses, MemoryStore};

    /// Store whose writes never finish within any reasonable limit.
    struct StalledStore;

    impl ResponseStore for StalledStore {
        async fn write(&self, _: &str, _: &str, _: &QuizResponse) -> Result<(), StoreError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn read_group(&self, _: &str) -> Result<GroupResponses, StoreError> {
            Ok(GroupResponses::new())
        }
    }

    fn flow() -> QuizFlow {
        let identity = Identity::new("alice", "team").unwrap();
        QuizFlow::new(identity, default_questions())
    }

    #[test]
    fn test_start_requires_identity() {
        assert!(QuizFlow::start(&Session::new(), default_questions()).is_none());

        let session = Session::with_identity(Identity::new("a", "g").unwrap());
        let flow = QuizFlow::start(&session, default_questions()).unwrap();
        assert_eq!(flow.state(), &FlowState::AwaitingAnswer(0));
    }

    #[test]
    fn test_advance_without_answer_is_rejected() {
        let mut flow = flow();
        assert_eq!(flow.advance(Utc::now()), Err(FlowError::NoSelection));
        assert_eq!(flow.state(), &FlowState::AwaitingAnswer(0));
        assert_eq!(flow.current_index(), 0);
    }

    #[test]
    fn test_click_replaces_pending_answer() {
        let mut flow = flow();
        flow.click(0.0, 0.0);
        flow.click(150.0, 150.0);

        assert_eq!(flow.pending().map(|a| a.quadrant_number), Some(13));
        assert_eq!(flow.state(), &FlowState::AwaitingAnswer(0));
        assert!(flow.answers().iter().all(Option::is_none));
    }

    #[test]
    fn test_advance_commits_and_resets_canvas() {
        let mut flow = flow();
        flow.click(10.0, 10.0);

        assert_eq!(flow.advance(Utc::now()), Ok(Advance::Next(1)));
        assert_eq!(flow.state(), &FlowState::AwaitingAnswer(1));
        assert!(flow.pending().is_none());
        assert!(flow.canvas().marker().is_none());
        assert_eq!(flow.answers()[0].map(|a| a.quadrant_number), Some(1));
        assert!(flow.is_last_question());
    }

    #[test]
    fn test_last_advance_assembles_response() {
        let mut flow = flow();
        flow.click(10.0, 10.0);
        flow.advance(Utc::now()).unwrap();
        flow.click(290.0, 290.0);

        let now = Utc::now();
        let Ok(Advance::Submit(response)) = flow.advance(now) else {
            panic!("expected a submission");
        };
        assert_eq!(response.user_name, "alice");
        assert_eq!(response.group_code, "team");
        assert_eq!(response.timestamp, now);
        assert_eq!(response.responses.len(), flow.total_questions());
        assert_eq!(response.responses[1].quadrant_number, 25);
        assert_eq!(flow.state(), &FlowState::Submitting);

        assert_eq!(flow.advance(Utc::now()), Err(FlowError::SubmissionInFlight));
        assert!(flow.click(1.0, 1.0).is_none());
    }

    #[test]
    fn test_failure_keeps_answers_and_allows_retry() {
        let mut flow = flow();
        flow.click(10.0, 10.0);
        flow.advance(Utc::now()).unwrap();
        flow.click(150.0, 150.0);
        let Ok(Advance::Submit(first)) = flow.advance(Utc::now()) else {
            panic!("expected a submission");
        };

        flow.finish_submission(Err(StoreError::Status {
            status: 403,
            body: String::new(),
        }));
        assert!(matches!(flow.state(), FlowState::Failed { index: 1, .. }));
        assert!(flow.error().unwrap().starts_with("Permission denied"));
        assert_eq!(flow.pending().map(|a| a.quadrant_number), Some(13));

        let Ok(Advance::Submit(retry)) = flow.advance(Utc::now()) else {
            panic!("expected a resubmission");
        };
        assert_eq!(retry, first);

        flow.finish_submission(Ok(()));
        assert_eq!(flow.state(), &FlowState::Complete);
        assert_eq!(flow.advance(Utc::now()), Err(FlowError::Finished));
    }

    #[tokio::test]
    async fn test_submit_to_store() {
        let store = MemoryStore::new();
        let mut flow = flow();
        flow.click(10.0, 10.0);
        flow.advance(Utc::now()).unwrap();
        flow.click(20.0, 20.0);
        let Ok(Advance::Submit(response)) = flow.advance(Utc::now()) else {
            panic!("expected a submission");
        };

        let state = flow.submit(&store, &response, DEFAULT_SUBMIT_TIMEOUT).await;
        assert_eq!(state, &FlowState::Complete);

        let group = store.read_group("team").await.unwrap();
        assert_eq!(group["alice"], response);
    }

    #[tokio::test]
    async fn test_submit_failure_stays_on_last_question() {
        let store = MemoryStore::new();
        store.fail_with(Some(500)).await;

        let mut flow = flow();
        flow.click(10.0, 10.0);
        flow.advance(Utc::now()).unwrap();
        flow.click(20.0, 20.0);
        let Ok(Advance::Submit(response)) = flow.advance(Utc::now()) else {
            panic!("expected a submission");
        };

        flow.submit(&store, &response, DEFAULT_SUBMIT_TIMEOUT).await;
        assert_eq!(flow.current_index(), 1);
        assert!(flow.error().unwrap().contains("500"));
        assert!(flow.answers().iter().all(Option::is_some));
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_record_rejects_off_grid_answers() {
        let mut flow = flow();
        let centre = Percentages {
            top: 50,
            bottom: 50,
            left: 50,
            right: 50,
        };

        for quadrant_number in [0, 26] {
            let answer = Answer {
                quadrant_number,
                percentages: centre,
            };
            assert_eq!(flow.record(answer), Err(FlowError::OffGrid));
        }
        assert!(flow.pending().is_none());

        let answer = Answer {
            quadrant_number: 13,
            percentages: centre,
        };
        assert_eq!(flow.record(answer), Ok(()));
        assert_eq!(flow.pending(), Some(&answer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_times_out() {
        let mut flow = flow();
        flow.click(10.0, 10.0);
        flow.advance(Utc::now()).unwrap();
        flow.click(20.0, 20.0);
        let Ok(Advance::Submit(response)) = flow.advance(Utc::now()) else {
            panic!("expected a submission");
        };

        let limit = Duration::from_secs(2);
        let state = flow.submit(&StalledStore, &response, limit).await.clone();

        assert!(matches!(state, FlowState::Failed { index: 1, .. }));
        assert!(flow.error().unwrap().contains("request timed out"));
        assert!(flow.answers().iter().all(Option::is_some));
        assert_eq!(flow.pending().map(|a| a.quadrant_number), Some(1));

        let Ok(Advance::Submit(retry)) = flow.advance(Utc::now()) else {
            panic!("expected a resubmission");
        };
        assert_eq!(retry, response);
    }
}
