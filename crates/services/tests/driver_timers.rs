use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Difficulty, Question, QuestionDraft, QuestionId, TestSettings};
use services::{
    ChannelNotifier, Intent, Notice, Phase, ShuffleStrategy, Step, TestDriver, TestSession,
};
use storage::session_store::{InMemorySessionStore, SessionStore};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

fn bank(n: u64) -> Vec<Question> {
    (1..=n)
        .map(|id| {
            QuestionDraft {
                prompt: format!("Question {id}"),
                options: ["w".into(), "x".into(), "y".into(), "z".into()],
                correct_option: 0,
                explanation: String::new(),
                difficulty: Difficulty::Easy,
                category_id: None,
            }
            .validate()
            .unwrap()
            .assign_id(QuestionId::new(id))
        })
        .collect()
}

fn driver(n: u64, store: &InMemorySessionStore) -> (TestDriver, UnboundedReceiver<Notice>) {
    let (notifier, rx) = ChannelNotifier::new();
    let session = TestSession::new(
        bank(n),
        TestSettings::default(),
        ShuffleStrategy::Preserve,
        Arc::new(store.clone()),
        Arc::new(notifier),
    )
    .unwrap();
    (TestDriver::spawn(session), rx)
}

#[tokio::test(start_paused = true)]
async fn countdown_does_not_run_before_start() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(3, &store);
    sleep(Duration::from_secs(45)).await;
    let frame = driver.frame();
    assert_eq!(frame.phase, Phase::NotStarted);
    assert_eq!(frame.remaining, 30);
}

#[tokio::test(start_paused = true)]
async fn expiry_skips_and_advances_with_fresh_budget() {
    let store = InMemorySessionStore::new();
    let (driver, mut rx) = driver(3, &store);
    assert_eq!(driver.dispatch(Intent::Start).await.unwrap(), Step::Applied);

    sleep(Duration::from_millis(10_500)).await;
    assert_eq!(driver.frame().remaining, 20);

    sleep(Duration::from_secs(20)).await;
    let frame = driver.frame();
    assert_eq!(frame.pointer, 1);
    assert_eq!(frame.remaining, 30);
    assert!(frame.answers[0].is_skipped());
    assert_eq!(rx.try_recv().unwrap(), Notice::TimeUp);
}

#[tokio::test(start_paused = true)]
async fn selection_auto_advances_after_delay() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(3, &store);
    let _ = driver.dispatch(Intent::Start).await.unwrap();
    assert_eq!(
        driver.dispatch(Intent::Select(0)).await.unwrap(),
        Step::Applied
    );

    let frame = driver.frame();
    assert_eq!(frame.pointer, 0);
    assert!(frame.answers[0].is_correct());

    sleep(Duration::from_millis(1_600)).await;
    let frame = driver.frame();
    assert_eq!(frame.pointer, 1);
    assert_eq!(frame.remaining, 30);
}

#[tokio::test(start_paused = true)]
async fn manual_navigation_cancels_pending_advance() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(4, &store);
    let _ = driver.dispatch(Intent::Start).await.unwrap();
    let _ = driver.dispatch(Intent::Select(1)).await.unwrap();
    assert_eq!(driver.dispatch(Intent::Next).await.unwrap(), Step::Applied);

    sleep(Duration::from_millis(2_500)).await;
    let frame = driver.frame();
    assert_eq!(frame.pointer, 1);
    assert_eq!(frame.remaining, 28);
}

#[tokio::test(start_paused = true)]
async fn end_stops_timers_and_publishes_review() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(3, &store);
    let _ = driver.dispatch(Intent::Start).await.unwrap();
    let _ = driver.dispatch(Intent::Select(0)).await.unwrap();
    assert_eq!(driver.dispatch(Intent::End).await.unwrap(), Step::Applied);

    let frame = driver.frame();
    assert_eq!(frame.phase, Phase::Completed);
    assert_eq!(frame.score, Some(1));
    assert_eq!(frame.review.as_ref().map(|r| r.skipped), Some(2));

    sleep(Duration::from_secs(60)).await;
    let later = driver.frame();
    assert_eq!(later.pointer, 0);
    assert_eq!(later.phase, Phase::Completed);
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(driver.dispatch(Intent::End).await.unwrap(), Step::Ignored);
}

#[tokio::test(start_paused = true)]
async fn restart_returns_to_not_started() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(3, &store);
    let _ = driver.dispatch(Intent::Start).await.unwrap();
    let _ = driver.dispatch(Intent::End).await.unwrap();
    assert_eq!(
        driver.dispatch(Intent::Restart).await.unwrap(),
        Step::Applied
    );

    let frame = driver.frame();
    assert_eq!(frame.phase, Phase::NotStarted);
    assert!(frame.answers.iter().all(|a| a.is_unanswered()));
    assert_eq!(frame.review, None);
}

#[tokio::test(start_paused = true)]
async fn frames_are_published_to_subscribers() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(3, &store);
    let mut frames = driver.frames();
    let _ = frames.borrow_and_update();

    let _ = driver.dispatch(Intent::Start).await.unwrap();
    frames.changed().await.unwrap();
    assert_eq!(frames.borrow_and_update().phase, Phase::InProgress);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_driver_stops_the_task() {
    let store = InMemorySessionStore::new();
    let (driver, _rx) = driver(3, &store);
    let _ = driver.dispatch(Intent::Start).await.unwrap();
    let mut frames = driver.frames();
    let _ = frames.borrow_and_update();

    drop(driver);
    assert!(frames.changed().await.is_err());
}
