use std::sync::Arc;

use quiz_core::model::{CategoryId, QuestionDraft, QuestionId, Quiz, QuizId};
use storage::repository::{CategoryRepository, QuizRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::QuizServiceError;

/// Orchestrates quiz authoring and publication.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            categories,
        }
    }

    /// Create an empty, unpublished quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownCategory` if the category does not
    /// exist, `QuizServiceError::Quiz` for validation failures.
    pub async fn create_quiz(
        &self,
        title: &str,
        description: &str,
        category_id: CategoryId,
        time_limit_minutes: Option<u32>,
    ) -> Result<QuizId, QuizServiceError> {
        self.ensure_category(category_id).await?;
        let quiz = Quiz::new(
            QuizId::new(0),
            title,
            description,
            category_id,
            time_limit_minutes,
            self.clock.now(),
        )?;
        let id = self.quizzes.insert_quiz(&quiz).await?;
        info!(quiz_id = %id, title = quiz.title(), "quiz created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound`, `UnknownCategory`, validation or
    /// storage errors.
    pub async fn update_details(
        &self,
        id: QuizId,
        title: &str,
        description: &str,
        category_id: CategoryId,
        time_limit_minutes: Option<u32>,
    ) -> Result<(), QuizServiceError> {
        let mut quiz = self.load(id).await?;
        if quiz.category_id() != category_id {
            self.ensure_category(category_id).await?;
        }
        quiz.update_details(title, description, category_id, time_limit_minutes)?;
        self.quizzes.upsert_quiz(&quiz).await?;
        Ok(())
    }

    /// Validate and append a question, returning its quiz-local id.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Question` for an invalid draft, or
    /// `QuizServiceError::NotFound`.
    pub async fn add_question(
        &self,
        id: QuizId,
        draft: QuestionDraft,
    ) -> Result<QuestionId, QuizServiceError> {
        let validated = draft.validate()?;
        let mut quiz = self.load(id).await?;
        let question_id = quiz.add_question(validated);
        self.quizzes.upsert_quiz(&quiz).await?;
        debug!(quiz_id = %id, question_id = %question_id, "question added");
        Ok(question_id)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` if the question is unknown or removing
    /// it would leave a published quiz empty.
    pub async fn remove_question(
        &self,
        id: QuizId,
        question_id: QuestionId,
    ) -> Result<(), QuizServiceError> {
        let mut quiz = self.load(id).await?;
        quiz.remove_question(question_id)?;
        self.quizzes.upsert_quiz(&quiz).await?;
        debug!(quiz_id = %id, question_id = %question_id, "question removed");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` when the quiz has no questions.
    pub async fn publish(&self, id: QuizId) -> Result<(), QuizServiceError> {
        let mut quiz = self.load(id).await?;
        quiz.publish()?;
        self.quizzes.upsert_quiz(&quiz).await?;
        info!(quiz_id = %id, "quiz published");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound` or storage errors.
    pub async fn unpublish(&self, id: QuizId) -> Result<(), QuizServiceError> {
        let mut quiz = self.load(id).await?;
        quiz.unpublish();
        self.quizzes.upsert_quiz(&quiz).await?;
        info!(quiz_id = %id, "quiz unpublished");
        Ok(())
    }

    /// Every quiz, drafts included, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn list_quizzes(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<Quiz>, QuizServiceError> {
        Ok(self.quizzes.list_quizzes(category).await?)
    }

    /// Quizzes visible to end users.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn list_published(&self) -> Result<Vec<Quiz>, QuizServiceError> {
        Ok(self.quizzes.list_published_quizzes().await?)
    }

    /// Returns `Ok(None)` when the quiz does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, QuizServiceError> {
        Ok(self.quizzes.get_quiz(id).await?)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound` if the quiz does not exist.
    pub async fn delete_quiz(&self, id: QuizId) -> Result<(), QuizServiceError> {
        self.load(id).await?;
        self.quizzes.delete_quiz(id).await?;
        info!(quiz_id = %id, "quiz deleted");
        Ok(())
    }

    async fn load(&self, id: QuizId) -> Result<Quiz, QuizServiceError> {
        self.quizzes
            .get_quiz(id)
            .await?
            .ok_or(QuizServiceError::NotFound(id))
    }

    async fn ensure_category(&self, id: CategoryId) -> Result<(), QuizServiceError> {
        match self.categories.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(QuizServiceError::UnknownCategory(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{Category, Difficulty, QuizError};
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn draft(prompt: &str) -> QuestionDraft {
        QuestionDraft {
            prompt: prompt.into(),
            options: ["1".into(), "2".into(), "3".into(), "4".into()],
            correct_option: 2,
            explanation: String::new(),
            difficulty: Difficulty::Easy,
            category_id: None,
        }
    }

    async fn setup() -> (QuizService, CategoryId) {
        let repo = InMemoryRepository::new();
        let category = Category::new(CategoryId::new(0), "Iterators", None).unwrap();
        let category_id = repo.insert_category(&category).await.unwrap();
        let svc = QuizService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        (svc, category_id)
    }

    #[tokio::test]
    async fn create_requires_existing_category() {
        let (svc, _) = setup().await;
        let err = svc
            .create_quiz("Adapters", "", CategoryId::new(99), None)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizServiceError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn publish_lifecycle_controls_visibility() {
        let (svc, cat) = setup().await;
        let id = svc.create_quiz("Adapters", "", cat, Some(5)).await.unwrap();

        assert!(matches!(
            svc.publish(id).await,
            Err(QuizServiceError::Quiz(QuizError::PublishEmpty))
        ));

        let q = svc.add_question(id, draft("map or filter?")).await.unwrap();
        svc.publish(id).await.unwrap();
        assert_eq!(svc.list_published().await.unwrap().len(), 1);

        assert!(matches!(
            svc.remove_question(id, q).await,
            Err(QuizServiceError::Quiz(QuizError::RemoveLastPublished))
        ));

        svc.unpublish(id).await.unwrap();
        assert!(svc.list_published().await.unwrap().is_empty());
        svc.remove_question(id, q).await.unwrap();
        let quiz = svc.get_quiz(id).await.unwrap().unwrap();
        assert!(quiz.questions().is_empty());
        assert_eq!(quiz.created_at(), fixed_now());
    }

    #[tokio::test]
    async fn question_ids_are_local_to_the_quiz() {
        let (svc, cat) = setup().await;
        let a = svc.create_quiz("A", "", cat, None).await.unwrap();
        let b = svc.create_quiz("B", "", cat, None).await.unwrap();
        assert_eq!(
            svc.add_question(a, draft("a1")).await.unwrap(),
            QuestionId::new(1)
        );
        assert_eq!(
            svc.add_question(a, draft("a2")).await.unwrap(),
            QuestionId::new(2)
        );
        assert_eq!(
            svc.add_question(b, draft("b1")).await.unwrap(),
            QuestionId::new(1)
        );
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_loading() {
        let (svc, cat) = setup().await;
        let id = svc.create_quiz("A", "", cat, None).await.unwrap();
        let mut bad = draft("ok");
        bad.correct_option = 4;
        assert!(matches!(
            svc.add_question(id, bad).await,
            Err(QuizServiceError::Question(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (svc, cat) = setup().await;
        let id = svc.create_quiz("Old", "", cat, None).await.unwrap();
        svc.update_details(id, "New", "desc", cat, Some(20))
            .await
            .unwrap();
        let quiz = svc.get_quiz(id).await.unwrap().unwrap();
        assert_eq!(quiz.title(), "New");
        assert_eq!(quiz.time_limit_minutes(), Some(20));

        svc.delete_quiz(id).await.unwrap();
        assert!(matches!(
            svc.delete_quiz(id).await,
            Err(QuizServiceError::NotFound(_))
        ));
        assert!(svc.list_quizzes(None).await.unwrap().is_empty());
    }
}
