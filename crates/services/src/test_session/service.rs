use std::sync::Arc;

use quiz_core::model::TestSettings;
use storage::repository::QuestionRepository;
use storage::session_store::SessionStore;
use tracing::info;

use super::driver::TestDriver;
use super::machine::TestSession;
use super::notify::{Notifier, TracingNotifier};
use super::shuffle::ShuffleStrategy;
use crate::error::TestSessionError;

/// Opens mock tests over the shared question bank.
#[derive(Clone)]
pub struct MockTestService {
    settings: TestSettings,
    questions: Arc<dyn QuestionRepository>,
    store: Arc<dyn SessionStore>,
    shuffle: ShuffleStrategy,
    notifier: Arc<dyn Notifier>,
}

impl MockTestService {
    #[must_use]
    pub fn new(
        settings: TestSettings,
        questions: Arc<dyn QuestionRepository>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            settings,
            questions,
            store,
            shuffle: ShuffleStrategy::default(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: ShuffleStrategy) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn settings(&self) -> TestSettings {
        self.settings
    }

    /// Load the bank and build a session, resuming stored progress if any.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::EmptyBank` when there are no questions, or
    /// `TestSessionError::Storage` if the bank cannot be read.
    pub async fn open_session(&self) -> Result<TestSession, TestSessionError> {
        let bank = self.questions.list_questions().await?;
        info!(questions = bank.len(), "opening mock test");
        TestSession::new(
            bank,
            self.settings,
            self.shuffle.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
        )
    }

    /// Open a session and hand it to a running `TestDriver`.
    ///
    /// # Errors
    ///
    /// Same as [`MockTestService::open_session`].
    pub async fn launch(&self) -> Result<TestDriver, TestSessionError> {
        Ok(TestDriver::spawn(self.open_session().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{Difficulty, QuestionDraft, QuestionId};
    use storage::repository::InMemoryRepository;
    use storage::session_store::InMemorySessionStore;

    use crate::test_session::machine::Phase;

    #[tokio::test]
    async fn empty_bank_cannot_open() {
        let svc = MockTestService::new(
            TestSettings::default(),
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemorySessionStore::new()),
        );
        assert!(matches!(
            svc.open_session().await,
            Err(TestSessionError::EmptyBank)
        ));
    }

    #[tokio::test]
    async fn opens_over_the_whole_bank() {
        let repo = InMemoryRepository::new();
        for n in 0..3 {
            let question = QuestionDraft {
                prompt: format!("Q{n}"),
                options: ["a".into(), "b".into(), "c".into(), "d".into()],
                correct_option: n,
                explanation: String::new(),
                difficulty: Difficulty::Hard,
                category_id: None,
            }
            .validate()
            .unwrap()
            .assign_id(QuestionId::new(0));
            repo.insert_question(&question).await.unwrap();
        }

        let session = MockTestService::new(
            TestSettings::default(),
            Arc::new(repo),
            Arc::new(InMemorySessionStore::new()),
        )
        .with_shuffle(ShuffleStrategy::Preserve)
        .open_session()
        .await
        .unwrap();
        assert_eq!(session.total(), 3);
        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.remaining(), 30);
    }
}
