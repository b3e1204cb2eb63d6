use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{OPTION_COUNT, Quiz, QuizAttempt, QuizId, UserId};
use storage::repository::{AttemptRepository, AttemptRow, QuizRepository};
use tracing::info;

use crate::Clock;
use crate::error::QuizTakingError;

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// An in-flight pass through a published quiz.
///
/// Answers are index-aligned with the quiz questions; the first answer to a
/// question is final.
#[derive(Debug, Clone)]
pub struct QuizRun {
    user: UserId,
    quiz: Quiz,
    answers: Vec<Option<usize>>,
    started_at: DateTime<Utc>,
}

impl QuizRun {
    #[must_use]
    pub fn user(&self) -> UserId {
        self.user
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Record `option` for question `index`. Returns whether it was correct.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::QuestionOutOfRange`, `OptionOutOfRange`, or
    /// `AlreadyAnswered`.
    pub fn answer(&mut self, index: usize, option: usize) -> Result<bool, QuizTakingError> {
        let question = self
            .quiz
            .questions()
            .get(index)
            .ok_or(QuizTakingError::QuestionOutOfRange { index })?;
        if option >= OPTION_COUNT {
            return Err(QuizTakingError::OptionOutOfRange { option });
        }
        let slot = &mut self.answers[index];
        if slot.is_some() {
            return Err(QuizTakingError::AlreadyAnswered { index });
        }
        *slot = Some(option);
        Ok(question.is_correct(option))
    }
}

//
// ─── DASHBOARD ─────────────────────────────────────────────────────────────────
//

/// Aggregate view of a user's attempt history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub attempts: usize,
    pub average_percentage: Option<u32>,
    pub best_percentage: Option<u32>,
    pub recent: Vec<AttemptRow>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Runs published quizzes and records the resulting attempts.
#[derive(Clone)]
pub struct QuizTakingService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl QuizTakingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            attempts,
        }
    }

    /// Start a run of a published quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::QuizNotFound` or `QuizTakingError::NotPublished`.
    pub async fn begin(&self, user: UserId, quiz_id: QuizId) -> Result<QuizRun, QuizTakingError> {
        let quiz = self
            .quizzes
            .get_quiz(quiz_id)
            .await?
            .ok_or(QuizTakingError::QuizNotFound(quiz_id))?;
        if !quiz.is_published() {
            return Err(QuizTakingError::NotPublished(quiz_id));
        }
        let answers = vec![None; quiz.questions().len()];
        Ok(QuizRun {
            user,
            quiz,
            answers,
            started_at: self.clock.now(),
        })
    }

    /// Grade the run and append it to the attempt log.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::Attempt` if grading fails, or storage errors.
    pub async fn submit(&self, run: QuizRun) -> Result<AttemptRow, QuizTakingError> {
        let completed_at = self.clock.now();
        let time_taken = self.clock.elapsed_secs(run.started_at);
        let attempt = QuizAttempt::grade(run.user, &run.quiz, &run.answers, time_taken, completed_at)?;
        let id = self.attempts.append_attempt(&attempt).await?;
        info!(
            attempt_id = %id,
            quiz_id = %attempt.quiz_id(),
            score = attempt.score(),
            total = attempt.total(),
            "quiz attempt recorded"
        );
        Ok(AttemptRow::new(id, attempt))
    }

    /// Summary over every attempt of `user`, with the `limit` most recent.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::Storage` if repository access fails.
    pub async fn dashboard(&self, user: UserId, limit: u32) -> Result<Dashboard, QuizTakingError> {
        let mut rows = self.attempts.list_attempts(user, u32::MAX).await?;
        let attempts = rows.len();
        let percentages: Vec<u32> = rows.iter().map(|r| r.attempt.percentage()).collect();

        let best_percentage = percentages.iter().copied().max();
        let average_percentage = u32::try_from(attempts)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| (percentages.iter().sum::<u32>() + n / 2) / n);

        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(Dashboard {
            attempts,
            average_percentage,
            best_percentage,
            recent: rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use quiz_core::model::{CategoryId, Difficulty, QuestionDraft};
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn draft(correct_option: usize) -> QuestionDraft {
        QuestionDraft {
            prompt: format!("pick {correct_option}"),
            options: ["0".into(), "1".into(), "2".into(), "3".into()],
            correct_option,
            explanation: String::new(),
            difficulty: Difficulty::Easy,
            category_id: None,
        }
    }

    async fn published_quiz(repo: &InMemoryRepository, limit: Option<u32>) -> QuizId {
        let mut quiz =
            Quiz::new(QuizId::new(0), "Generics", "", CategoryId::new(1), limit, fixed_now())
                .unwrap();
        for c in [0, 1, 2, 3] {
            quiz.add_question(draft(c).validate().unwrap());
        }
        quiz.publish().unwrap();
        repo.insert_quiz(&quiz).await.unwrap()
    }

    fn service(repo: &InMemoryRepository, clock: Clock) -> QuizTakingService {
        QuizTakingService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn drafts_cannot_be_taken() {
        let repo = InMemoryRepository::new();
        let quiz = Quiz::new(QuizId::new(0), "Draft", "", CategoryId::new(1), None, fixed_now())
            .unwrap();
        let id = repo.insert_quiz(&quiz).await.unwrap();
        let svc = service(&repo, Clock::fixed(fixed_now()));
        assert!(matches!(
            svc.begin(UserId::random(), id).await,
            Err(QuizTakingError::NotPublished(_))
        ));
        assert!(matches!(
            svc.begin(UserId::random(), QuizId::new(42)).await,
            Err(QuizTakingError::QuizNotFound(_))
        ));
    }

    #[tokio::test]
    async fn first_answer_is_final() {
        let repo = InMemoryRepository::new();
        let id = published_quiz(&repo, None).await;
        let svc = service(&repo, Clock::fixed(fixed_now()));
        let mut run = svc.begin(UserId::random(), id).await.unwrap();

        assert!(run.answer(0, 0).unwrap());
        assert!(matches!(
            run.answer(0, 1),
            Err(QuizTakingError::AlreadyAnswered { index: 0 })
        ));
        assert!(matches!(
            run.answer(9, 0),
            Err(QuizTakingError::QuestionOutOfRange { index: 9 })
        ));
        assert!(matches!(
            run.answer(1, 4),
            Err(QuizTakingError::OptionOutOfRange { option: 4 })
        ));
        assert_eq!(run.answered_count(), 1);
    }

    #[tokio::test]
    async fn submit_records_time_and_overrun() {
        let repo = InMemoryRepository::new();
        let id = published_quiz(&repo, Some(1)).await;
        let user = UserId::random();
        let mut run = service(&repo, Clock::fixed(fixed_now()))
            .begin(user, id)
            .await
            .unwrap();
        run.answer(0, 0).unwrap();
        run.answer(1, 3).unwrap();

        let later = Clock::fixed(fixed_now() + Duration::seconds(90));
        let row = service(&repo, later).submit(run).await.unwrap();
        assert_eq!(row.attempt.correct(), 1);
        assert_eq!(row.attempt.incorrect(), 1);
        assert_eq!(row.attempt.skipped(), 2);
        assert_eq!(row.attempt.time_taken_secs(), 90);
        assert!(row.attempt.exceeded_time_limit());
        assert_eq!(repo.get_attempt(row.id).await.unwrap(), Some(row.attempt));
    }

    #[tokio::test]
    async fn dashboard_aggregates_all_attempts() {
        let repo = InMemoryRepository::new();
        let id = published_quiz(&repo, None).await;
        let user = UserId::random();

        // 1/4, 4/4, 2/4 correct.
        let plans: [&[(usize, usize)]; 3] = [
            &[(0, 0)],
            &[(0, 0), (1, 1), (2, 2), (3, 3)],
            &[(0, 0), (1, 1)],
        ];
        for (minute, plan) in plans.iter().enumerate() {
            let clock = Clock::fixed(fixed_now() + Duration::minutes(minute as i64));
            let svc = service(&repo, clock);
            let mut run = svc.begin(user, id).await.unwrap();
            for (q, o) in *plan {
                run.answer(*q, *o).unwrap();
            }
            svc.submit(run).await.unwrap();
        }

        let dash = service(&repo, Clock::fixed(fixed_now()))
            .dashboard(user, 2)
            .await
            .unwrap();
        assert_eq!(dash.attempts, 3);
        assert_eq!(dash.best_percentage, Some(100));
        // (25 + 100 + 50) / 3 = 58.33
        assert_eq!(dash.average_percentage, Some(58));
        assert_eq!(dash.recent.len(), 2);
        assert_eq!(dash.recent[0].attempt.correct(), 2);
    }

    #[tokio::test]
    async fn empty_dashboard_has_no_averages() {
        let repo = InMemoryRepository::new();
        let dash = service(&repo, Clock::fixed(fixed_now()))
            .dashboard(UserId::random(), 5)
            .await
            .unwrap();
        assert_eq!(dash.attempts, 0);
        assert_eq!(dash.average_percentage, None);
        assert!(dash.recent.is_empty());
    }
}
