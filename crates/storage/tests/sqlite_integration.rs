use chrono::Duration;
use pretty_assertions::assert_eq;
use quiz_core::model::{
    Category, CategoryId, Difficulty, Question, QuestionDraft, QuestionId, Quiz, QuizAttempt,
    QuizId, UserId,
};
use quiz_core::time::fixed_now;
use storage::repository::{
    AttemptRepository, CategoryRepository, QuestionRepository, QuizRepository,
};
use storage::sqlite::SqliteRepository;
use storage::{Storage, StorageError};

fn draft(prompt: &str, difficulty: Difficulty, category_id: Option<CategoryId>) -> QuestionDraft {
    QuestionDraft {
        prompt: prompt.into(),
        options: [
            "move".into(),
            "borrow".into(),
            "clone".into(),
            "copy".into(),
        ],
        correct_option: 1,
        explanation: "A `&T` is a **shared** borrow.".into(),
        difficulty,
        category_id,
    }
}

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn category(repo: &SqliteRepository, name: &str) -> CategoryId {
    let c = Category::new(CategoryId::new(0), name, Some("desc".into())).unwrap();
    repo.insert_category(&c).await.unwrap()
}

#[tokio::test]
async fn sqlite_quiz_round_trips_embedded_questions() {
    let repo = repo("memdb_quiz_roundtrip").await;
    let cat = category(&repo, "Ownership").await;

    let mut quiz = Quiz::new(
        QuizId::new(0),
        "Borrowing",
        "Shared and mutable references",
        cat,
        Some(15),
        fixed_now(),
    )
    .unwrap();
    quiz.add_question(
        draft("What does & create?", Difficulty::Easy, None)
            .validate()
            .unwrap(),
    );
    quiz.add_question(
        draft("What does &mut create?", Difficulty::Hard, None)
            .validate()
            .unwrap(),
    );
    quiz.publish().unwrap();

    let id = repo.insert_quiz(&quiz).await.unwrap();
    let fetched = repo.get_quiz(id).await.unwrap().expect("quiz");
    assert_eq!(fetched, quiz.clone().with_id(id));
    assert_eq!(fetched.questions()[1].difficulty(), Difficulty::Hard);
    assert_eq!(fetched.time_limit_minutes(), Some(15));

    let mut edited = fetched;
    edited.unpublish();
    edited
        .update_details("Borrowing 101", "", cat, None)
        .unwrap();
    repo.upsert_quiz(&edited).await.unwrap();

    assert!(repo.list_published_quizzes().await.unwrap().is_empty());
    let all = repo.list_quizzes(Some(cat)).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title(), "Borrowing 101");
    assert_eq!(all[0].time_limit_minutes(), None);
}

#[tokio::test]
async fn sqlite_quiz_requires_existing_category() {
    let repo = repo("memdb_quiz_fk").await;
    let quiz = Quiz::new(QuizId::new(0), "Orphan", "", CategoryId::new(77), None, fixed_now())
        .unwrap();
    let err = repo.insert_quiz(&quiz).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_categories_list_by_name_and_delete() {
    let repo = repo("memdb_categories").await;
    let b = category(&repo, "borrowck").await;
    category(&repo, "Async").await;

    let names: Vec<String> = repo
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Async".to_owned(), "borrowck".to_owned()]);

    repo.delete_category(b).await.unwrap();
    assert!(repo.get_category(b).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_category(b).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_question_bank_round_trip() {
    let repo = repo("memdb_question_bank").await;
    let cat = category(&repo, "Traits").await;

    let q: Question = draft("Which keyword borrows?", Difficulty::Medium, Some(cat))
        .validate()
        .unwrap()
        .assign_id(QuestionId::new(0));
    let id = repo.insert_question(&q).await.unwrap();
    let other = draft("Another", Difficulty::Easy, None)
        .validate()
        .unwrap()
        .assign_id(QuestionId::new(0));
    let second = repo.insert_question(&other).await.unwrap();

    let fetched = repo.get_question(id).await.unwrap().expect("question");
    assert_eq!(fetched, q.with_id(id));

    let bank = repo.list_questions().await.unwrap();
    assert_eq!(
        bank.iter().map(Question::id).collect::<Vec<_>>(),
        vec![id, second]
    );

    repo.delete_question(second).await.unwrap();
    assert_eq!(repo.list_questions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_attempts_newest_first_with_limit() {
    let repo = repo("memdb_attempts").await;
    let cat = category(&repo, "Closures").await;
    let mut quiz =
        Quiz::new(QuizId::new(0), "Fn traits", "", cat, Some(1), fixed_now()).unwrap();
    quiz.add_question(draft("Q1", Difficulty::Easy, None).validate().unwrap());
    quiz.add_question(draft("Q2", Difficulty::Easy, None).validate().unwrap());
    let quiz = quiz.with_id(QuizId::new(4));

    let me = UserId::random();
    let mut ids = Vec::new();
    for minutes in [0, 30, 10] {
        let attempt = QuizAttempt::grade(
            me,
            &quiz,
            &[Some(1), Some(0)],
            75,
            fixed_now() + Duration::minutes(minutes),
        )
        .unwrap();
        ids.push(repo.append_attempt(&attempt).await.unwrap());
    }
    let someone_else = QuizAttempt::grade(UserId::random(), &quiz, &[None, None], 5, fixed_now())
        .unwrap();
    repo.append_attempt(&someone_else).await.unwrap();

    let rows = repo.list_attempts(me, 2).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, ids[1]);
    assert_eq!(rows[1].id, ids[2]);
    assert_eq!(rows[0].attempt.score(), 1);
    assert!(rows[0].attempt.exceeded_time_limit());
    assert_eq!(rows[0].attempt.user_id(), me);

    let single = repo.get_attempt(ids[0]).await.unwrap().expect("attempt");
    assert_eq!(single.completed_at(), fixed_now());
}

#[tokio::test]
async fn storage_sqlite_wires_all_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage_wiring?mode=memory&cache=shared")
        .await
        .expect("storage");
    let c = Category::new(CategoryId::new(0), "Macros", None).unwrap();
    let id = storage.categories.insert_category(&c).await.unwrap();
    assert_eq!(
        storage.categories.get_category(id).await.unwrap().unwrap().name(),
        "Macros"
    );
    assert!(storage.questions.list_questions().await.unwrap().is_empty());
    assert!(storage.quizzes.list_quizzes(None).await.unwrap().is_empty());
}
