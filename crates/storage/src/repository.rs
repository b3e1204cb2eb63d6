use async_trait::async_trait;
use quiz_core::model::{
    AttemptId, Category, CategoryId, Question, QuestionId, Quiz, QuizAttempt, QuizId, UserId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A stored attempt together with the id the log assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRow {
    pub id: AttemptId,
    pub attempt: QuizAttempt,
}

impl AttemptRow {
    #[must_use]
    pub fn new(id: AttemptId, attempt: QuizAttempt) -> Self {
        Self { id, attempt }
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Store a new category. The id it carries is ignored and a fresh one is
    /// assigned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn insert_category(&self, category: &Category) -> Result<CategoryId, StorageError>;

    /// Persist or update a category under its own id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StorageError>;

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such category exists.
    async fn delete_category(&self, id: CategoryId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Store a new quiz with its embedded questions. The id it carries is
    /// ignored and a fresh one is assigned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<QuizId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;

    /// Quizzes ordered by id, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_quizzes(&self, category: Option<CategoryId>) -> Result<Vec<Quiz>, StorageError>;

    /// Published quizzes ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_published_quizzes(&self) -> Result<Vec<Quiz>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such quiz exists.
    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError>;
}

/// The mock-test question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(&self, question: &Question) -> Result<QuestionId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Whole bank ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such question exists.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;
}

/// Append-only log of finished quiz attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_attempt(&self, id: AttemptId) -> Result<Option<QuizAttempt>, StorageError>;

    /// Attempts of one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

fn next_key<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map_or(1, |last| last + 1)
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    categories: Arc<Mutex<BTreeMap<u64, Category>>>,
    quizzes: Arc<Mutex<BTreeMap<u64, Quiz>>>,
    questions: Arc<Mutex<BTreeMap<u64, Question>>>,
    attempts: Arc<Mutex<BTreeMap<u64, QuizAttempt>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn insert_category(&self, category: &Category) -> Result<CategoryId, StorageError> {
        let mut guard = lock(&self.categories)?;
        let id = CategoryId::new(next_key(&guard));
        guard.insert(id.value(), category.clone().with_id(id));
        Ok(id)
    }

    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError> {
        let mut guard = lock(&self.categories)?;
        guard.insert(category.id().value(), category.clone());
        Ok(())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StorageError> {
        Ok(lock(&self.categories)?.get(&id.value()).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut out: Vec<Category> = lock(&self.categories)?.values().cloned().collect();
        out.sort_by(|a, b| a.name_key().cmp(&b.name_key()).then(a.id().cmp(&b.id())));
        Ok(out)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), StorageError> {
        lock(&self.categories)?
            .remove(&id.value())
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<QuizId, StorageError> {
        let mut guard = lock(&self.quizzes)?;
        let id = QuizId::new(next_key(&guard));
        guard.insert(id.value(), quiz.clone().with_id(id));
        Ok(id)
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        lock(&self.quizzes)?.insert(quiz.id().value(), quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        Ok(lock(&self.quizzes)?.get(&id.value()).cloned())
    }

    async fn list_quizzes(&self, category: Option<CategoryId>) -> Result<Vec<Quiz>, StorageError> {
        let guard = lock(&self.quizzes)?;
        Ok(guard
            .values()
            .filter(|q| category.is_none_or(|c| q.category_id() == c))
            .cloned()
            .collect())
    }

    async fn list_published_quizzes(&self) -> Result<Vec<Quiz>, StorageError> {
        let guard = lock(&self.quizzes)?;
        Ok(guard.values().filter(|q| q.is_published()).cloned().collect())
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        lock(&self.quizzes)?
            .remove(&id.value())
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(&self, question: &Question) -> Result<QuestionId, StorageError> {
        let mut guard = lock(&self.questions)?;
        let id = QuestionId::new(next_key(&guard));
        guard.insert(id.value(), question.clone().with_id(id));
        Ok(id)
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        lock(&self.questions)?.insert(question.id().value(), question.clone());
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        Ok(lock(&self.questions)?.get(&id.value()).cloned())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        Ok(lock(&self.questions)?.values().cloned().collect())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        lock(&self.questions)?
            .remove(&id.value())
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptId, StorageError> {
        let mut guard = lock(&self.attempts)?;
        let id = AttemptId::new(next_key(&guard));
        guard.insert(id.value(), attempt.clone());
        Ok(id)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<QuizAttempt>, StorageError> {
        Ok(lock(&self.attempts)?.get(&id.value()).cloned())
    }

    async fn list_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = lock(&self.attempts)?;
        let mut rows: Vec<AttemptRow> = guard
            .iter()
            .filter(|(_, a)| a.user_id() == user)
            .map(|(id, a)| AttemptRow::new(AttemptId::new(*id), a.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.attempt
                .completed_at()
                .cmp(&a.attempt.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub categories: Arc<dyn CategoryRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            categories: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            attempts: Arc::new(repo),
        }
    }
}
