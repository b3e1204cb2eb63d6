use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use quiz_core::model::{
    OPTION_COUNT, Question, QuestionId, SessionSnapshot, SnapshotError, TestSettings, UserAnswer,
};
use quiz_core::review::Review;
use storage::session_store::SessionStore;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::frame::SessionFrame;
use super::notify::{Notice, Notifier};
use super::shuffle::ShuffleStrategy;
use crate::error::TestSessionError;

//
// ─── TYPES ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a mock test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

/// Outcome of an operation. Precondition violations are `Ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Step {
    Ignored,
    Applied,
    /// Next was requested on the last question; submission is explicit.
    ReachedEnd,
}

/// Identity of a scheduled auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdvanceTicket(u64);

/// Why a stored snapshot could not be resumed.
#[derive(Debug, Error)]
enum RestoreError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("ledger holds {ledger} entries but the bank has {bank}")]
    LengthMismatch { ledger: usize, bank: usize },
    #[error("question {0} is not in the bank")]
    UnknownQuestion(QuestionId),
    #[error("question {0} appears twice in the ledger")]
    DuplicateQuestion(QuestionId),
    #[error("option {option} recorded for question {question}")]
    OptionOutOfRange { question: QuestionId, option: usize },
}

struct Restored {
    questions: Vec<Question>,
    answers: Vec<UserAnswer>,
    pointer: usize,
    remaining: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The timed test session.
///
/// Single-threaded and timer-free: the owner calls `tick` once per second
/// and `fire_advance` when a scheduled auto-advance is due.
pub struct TestSession {
    bank: Vec<Question>,
    questions: Vec<Question>,
    answers: Vec<UserAnswer>,
    pointer: usize,
    remaining: u32,
    phase: Phase,
    score: Option<u32>,
    restored: bool,
    settings: TestSettings,
    shuffle: ShuffleStrategy,
    round: u64,
    epoch: u64,
    pending_advance: Option<AdvanceTicket>,
    next_ticket: u64,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl TestSession {
    /// Build a session over `bank`, resuming stored progress when it fits.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::EmptyBank` if `bank` has no questions.
    pub fn new(
        bank: Vec<Question>,
        settings: TestSettings,
        shuffle: ShuffleStrategy,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, TestSessionError> {
        if bank.is_empty() {
            return Err(TestSessionError::EmptyBank);
        }

        let mut session = Self {
            questions: Vec::new(),
            answers: Vec::new(),
            pointer: 0,
            remaining: settings.question_seconds(),
            phase: Phase::NotStarted,
            score: None,
            restored: false,
            settings,
            shuffle,
            round: 0,
            epoch: 0,
            pending_advance: None,
            next_ticket: 0,
            store,
            notifier,
            bank,
        };

        match session.load_snapshot() {
            Some(restored) => {
                session.questions = restored.questions;
                session.answers = restored.answers;
                session.pointer = restored.pointer;
                session.remaining = restored.remaining;
                session.phase = Phase::InProgress;
                session.restored = true;
                info!(
                    pointer = session.pointer,
                    total = session.questions.len(),
                    "mock test progress restored"
                );
                session.notifier.notify(Notice::ProgressRestored);
            }
            None => session.build_fresh(),
        }
        Ok(session)
    }

    fn build_fresh(&mut self) {
        let mut questions = self.bank.clone();
        self.shuffle.apply(&mut questions, self.round);
        self.answers = questions.iter().map(|q| UserAnswer::new(q.id())).collect();
        self.questions = questions;
        self.pointer = 0;
        self.remaining = self.budget();
        self.phase = Phase::NotStarted;
        self.score = None;
        self.pending_advance = None;
    }

    fn load_snapshot(&self) -> Option<Restored> {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read mock test progress");
                return None;
            }
        };

        match self.restore(&raw) {
            Ok(Some(restored)) => Some(restored),
            Ok(None) => {
                debug!("stored mock test is not in progress");
                self.clear_store();
                None
            }
            Err(e) => {
                warn!(error = %e, "discarding unusable mock test progress");
                self.clear_store();
                None
            }
        }
    }

    fn restore(&self, raw: &str) -> Result<Option<Restored>, RestoreError> {
        let snapshot = SessionSnapshot::decode(raw)?;
        if !snapshot.is_in_progress() {
            return Ok(None);
        }

        let ledger = snapshot.ledger();
        if ledger.len() != self.bank.len() {
            return Err(RestoreError::LengthMismatch {
                ledger: ledger.len(),
                bank: self.bank.len(),
            });
        }

        let by_id: HashMap<QuestionId, &Question> =
            self.bank.iter().map(|q| (q.id(), q)).collect();
        let mut seen = HashSet::with_capacity(ledger.len());
        let mut questions = Vec::with_capacity(ledger.len());
        let mut answers = Vec::with_capacity(ledger.len());

        for entry in ledger {
            let id = entry.question_id();
            let question = by_id
                .get(&id)
                .ok_or(RestoreError::UnknownQuestion(id))?;
            if !seen.insert(id) {
                return Err(RestoreError::DuplicateQuestion(id));
            }

            // Correctness is recomputed against the bank, not trusted.
            let mut answer = UserAnswer::new(id);
            if let Some(option) = entry.selected_option() {
                if option >= OPTION_COUNT {
                    return Err(RestoreError::OptionOutOfRange {
                        question: id,
                        option,
                    });
                }
                answer.answer(option, question.is_correct(option));
            } else if entry.is_skipped() {
                answer.skip();
            }
            if entry.is_marked_for_review() {
                answer.toggle_mark();
            }

            questions.push((*question).clone());
            answers.push(answer);
        }

        let budget = self.budget();
        let remaining = if (1..=budget).contains(&snapshot.remaining_time) {
            snapshot.remaining_time
        } else {
            budget
        };

        Ok(Some(Restored {
            questions,
            answers,
            pointer: snapshot.current_question_index,
            remaining,
        }))
    }

    // ─── READ MODEL ───

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Per-question budget in seconds.
    #[must_use]
    pub fn budget(&self) -> u32 {
        self.settings.question_seconds()
    }

    #[must_use]
    pub fn settings(&self) -> TestSettings {
        self.settings
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.pointer)
    }

    /// Number of correct answers, set once the session is completed.
    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    /// True when this session resumed stored progress.
    #[must_use]
    pub fn was_restored(&self) -> bool {
        self.restored
    }

    /// Bumped whenever the countdown must restart.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn pending_advance(&self) -> Option<AdvanceTicket> {
        self.pending_advance
    }

    #[must_use]
    pub fn review(&self) -> Option<Review> {
        (self.phase == Phase::Completed).then(|| Review::compile(&self.questions, &self.answers))
    }

    #[must_use]
    pub fn frame(&self) -> SessionFrame {
        SessionFrame {
            phase: self.phase,
            pointer: self.pointer,
            total: self.total(),
            remaining: self.remaining,
            budget: self.budget(),
            question: self.current_question().cloned(),
            answers: self.answers.clone(),
            score: self.score,
            review: self.review(),
            restored: self.restored,
            epoch: self.epoch,
        }
    }

    // ─── TRANSITIONS ───

    pub fn start(&mut self) -> Step {
        if self.phase != Phase::NotStarted {
            return Step::Ignored;
        }
        self.phase = Phase::InProgress;
        self.restart_countdown();
        self.persist();
        info!(total = self.total(), "mock test started");
        Step::Applied
    }

    /// One second elapsed on the current question.
    pub fn tick(&mut self) -> Step {
        if self.phase != Phase::InProgress {
            return Step::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            self.persist();
            return Step::Applied;
        }

        debug!(pointer = self.pointer, "question timed out");
        let current = &mut self.answers[self.pointer];
        if !current.is_answered() {
            current.skip();
            self.notifier.notify(Notice::TimeUp);
        }
        self.pending_advance = None;
        let step = self.move_to(self.pointer + 1);
        if step == Step::ReachedEnd {
            self.restart_countdown();
            self.persist();
        }
        step
    }

    /// Record the first answer to the current question.
    pub fn select_answer(&mut self, option: usize) -> Step {
        if self.phase != Phase::InProgress || option >= OPTION_COUNT {
            return Step::Ignored;
        }
        let question = &self.questions[self.pointer];
        let answer = &mut self.answers[self.pointer];
        if answer.is_answered() {
            return Step::Ignored;
        }

        let correct = question.is_correct(option);
        answer.answer(option, correct);
        self.notifier.notify(if correct {
            Notice::AnswerCorrect
        } else {
            Notice::AnswerIncorrect {
                correct_option: question.correct_option(),
            }
        });

        self.next_ticket += 1;
        self.pending_advance = Some(AdvanceTicket(self.next_ticket));
        debug!(pointer = self.pointer, option, correct, "answer recorded");
        self.persist();
        Step::Applied
    }

    /// Run a scheduled auto-advance if it is still the latest one.
    pub fn fire_advance(&mut self, ticket: AdvanceTicket) -> Step {
        if self.phase != Phase::InProgress || self.pending_advance != Some(ticket) {
            return Step::Ignored;
        }
        self.pending_advance = None;
        self.go_to_next()
    }

    pub fn skip_question(&mut self) -> Step {
        if self.phase != Phase::InProgress {
            return Step::Ignored;
        }
        if self.answers[self.pointer].skip() {
            debug!(pointer = self.pointer, "question skipped");
            self.persist();
        }
        self.go_to_next()
    }

    pub fn toggle_mark_for_review(&mut self) -> Step {
        if self.phase != Phase::InProgress {
            return Step::Ignored;
        }
        self.answers[self.pointer].toggle_mark();
        self.persist();
        Step::Applied
    }

    pub fn go_to_next(&mut self) -> Step {
        if self.phase != Phase::InProgress {
            return Step::Ignored;
        }
        self.move_to(self.pointer + 1)
    }

    pub fn go_to_previous(&mut self) -> Step {
        if self.phase != Phase::InProgress || self.pointer == 0 {
            return Step::Ignored;
        }
        self.move_to(self.pointer - 1)
    }

    pub fn jump_to_question(&mut self, index: usize) -> Step {
        if self.phase != Phase::InProgress || index >= self.total() {
            return Step::Ignored;
        }
        self.move_to(index)
    }

    /// Submit. Unvisited and unanswered questions become skipped.
    pub fn end(&mut self) -> Step {
        if self.phase != Phase::InProgress {
            return Step::Ignored;
        }

        let swept = self
            .answers
            .iter_mut()
            .map(UserAnswer::skip)
            .filter(|swept| *swept)
            .count();
        if swept > 0 {
            self.notifier.notify(Notice::Unanswered { count: swept });
        }

        let score = self.answers.iter().filter(|a| a.is_correct()).count();
        let score = u32::try_from(score).unwrap_or(u32::MAX);
        self.score = Some(score);
        self.phase = Phase::Completed;
        self.pending_advance = None;
        self.epoch += 1;
        self.clear_store();

        info!(score, total = self.total(), "mock test completed");
        self.notifier.notify(Notice::Completed {
            score,
            total: self.total(),
        });
        Step::Applied
    }

    /// Discard everything and reshuffle the bank captured at construction.
    pub fn restart(&mut self) -> Step {
        self.round += 1;
        self.restored = false;
        self.build_fresh();
        self.epoch += 1;
        self.clear_store();
        info!(round = self.round, "mock test restarted");
        Step::Applied
    }

    // ─── HELPERS ───

    fn move_to(&mut self, index: usize) -> Step {
        if index >= self.total() {
            return Step::ReachedEnd;
        }
        self.pointer = index;
        self.pending_advance = None;
        self.restart_countdown();
        self.persist();
        debug!(pointer = index, "moved");
        Step::Applied
    }

    fn restart_countdown(&mut self) {
        self.remaining = self.budget();
        self.epoch += 1;
    }

    fn persist(&self) {
        if self.phase != Phase::InProgress {
            return;
        }
        let snapshot = SessionSnapshot::capture(self.pointer, &self.answers, self.remaining);
        let result = snapshot
            .encode()
            .map_err(|e| e.to_string())
            .and_then(|payload| self.store.save(&payload).map_err(|e| e.to_string()));
        if let Err(error) = result {
            warn!(%error, "failed to save mock test progress");
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear mock test progress");
        }
    }
}
