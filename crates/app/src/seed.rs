use anyhow::Context;
use quiz_core::Clock;
use quiz_core::model::{CategoryId, Difficulty, QuestionDraft};
use services::{CategoryService, QuestionBankService, QuizService};
use storage::Storage;
use tracing::info;

struct Sample {
    category: usize,
    prompt: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
    difficulty: Difficulty,
}

const CATEGORIES: [(&str, &str); 3] = [
    ("Ownership", "Moves, borrows and lifetimes"),
    ("Traits", "Generics, trait objects and coherence"),
    ("Async", "Futures, executors and pinning"),
];

const BANK: &[Sample] = &[
    Sample {
        category: 0,
        prompt: "What happens to a `String` after it is passed by value to a function?",
        options: [
            "It is copied",
            "It is moved into the function",
            "It is borrowed immutably",
            "It is leaked",
        ],
        correct: 1,
        explanation: "`String` is not `Copy`, so passing it by value **moves** ownership.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        category: 0,
        prompt: "How many mutable references to a value may exist at the same time?",
        options: ["Any number", "Two", "One", "None"],
        correct: 2,
        explanation: "The borrow checker allows exactly one `&mut` at a time.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        category: 0,
        prompt: "Which lifetime outlives every other lifetime?",
        options: ["'a", "'_", "'static", "'self"],
        correct: 2,
        explanation: "`'static` data lives for the entire program.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        category: 0,
        prompt: "Which smart pointer gives shared ownership across threads?",
        options: ["Rc<T>", "Box<T>", "Cell<T>", "Arc<T>"],
        correct: 3,
        explanation: "`Arc` uses atomic reference counts, so it is `Send + Sync` when `T` is.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        category: 0,
        prompt: "When does non-lexical lifetime analysis end a borrow?",
        options: [
            "At the end of the enclosing block",
            "After its last use",
            "When the owner is dropped",
            "At the next semicolon",
        ],
        correct: 1,
        explanation: "With NLL a borrow lasts only until its **last use**.",
        difficulty: Difficulty::Hard,
    },
    Sample {
        category: 1,
        prompt: "Which trait powers the `{}` format specifier?",
        options: ["Debug", "Display", "ToString", "Format"],
        correct: 1,
        explanation: "`{}` uses `Display`; `{:?}` uses `Debug`.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        category: 1,
        prompt: "What does the orphan rule restrict?",
        options: [
            "Implementing foreign traits for foreign types",
            "Generic functions without bounds",
            "Traits with associated types",
            "Recursive trait bounds",
        ],
        correct: 0,
        explanation: "A crate may implement a trait for a type only if it owns one of them.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        category: 1,
        prompt: "Which method signature keeps a trait object safe?",
        options: [
            "fn new() -> Self",
            "fn cmp<T>(&self, other: T)",
            "fn name(&self) -> &str",
            "fn clone_box(self) -> Self",
        ],
        correct: 2,
        explanation: "Object-safe methods take a receiver and do not return `Self` or use generics.",
        difficulty: Difficulty::Hard,
    },
    Sample {
        category: 1,
        prompt: "What is `impl Trait` in argument position equivalent to?",
        options: [
            "A trait object",
            "An anonymous generic parameter",
            "A type alias",
            "An associated type",
        ],
        correct: 1,
        explanation: "`fn f(x: impl Trait)` is sugar for `fn f<T: Trait>(x: T)`.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        category: 2,
        prompt: "What does calling an `async fn` return?",
        options: [
            "The output value",
            "A thread handle",
            "A future that must be polled",
            "A `Result`",
        ],
        correct: 2,
        explanation: "Futures are lazy: nothing runs until the future is polled.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        category: 2,
        prompt: "Why must some futures be pinned before polling?",
        options: [
            "They may hold references into themselves",
            "They are too large for the stack",
            "Pinning makes them `Send`",
            "The executor requires heap allocation",
        ],
        correct: 0,
        explanation: "Self-referential state machines break if moved, so `poll` takes `Pin<&mut Self>`.",
        difficulty: Difficulty::Hard,
    },
    Sample {
        category: 2,
        prompt: "What does `tokio::select!` do with the branches that lose?",
        options: [
            "Runs them to completion",
            "Drops their futures",
            "Queues them for the next call",
            "Panics",
        ],
        correct: 1,
        explanation: "Losing branches are **dropped**, which cancels them.",
        difficulty: Difficulty::Medium,
    },
];

/// Indices into `BANK` copied into the published sample quiz.
const OWNERSHIP_QUIZ: [usize; 4] = [0, 1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub bank_questions: usize,
    pub quizzes: usize,
}

fn draft(sample: &Sample, category_id: CategoryId) -> QuestionDraft {
    QuestionDraft {
        prompt: sample.prompt.to_owned(),
        options: sample.options.map(str::to_owned),
        correct_option: sample.correct,
        explanation: sample.explanation.to_owned(),
        difficulty: sample.difficulty,
        category_id: Some(category_id),
    }
}

/// Load sample content into an empty database. Returns `None` when
/// categories already exist.
///
/// # Errors
///
/// Returns the first service error encountered.
pub async fn seed(storage: &Storage, clock: Clock) -> anyhow::Result<Option<SeedReport>> {
    let categories = CategoryService::new(
        storage.categories.clone(),
        storage.quizzes.clone(),
    );
    if !categories.list_categories().await?.is_empty() {
        info!("database already has content, skipping seed");
        return Ok(None);
    }

    let bank = QuestionBankService::new(storage.questions.clone(), storage.categories.clone());
    let quizzes = QuizService::new(clock, storage.quizzes.clone(), storage.categories.clone());

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let id = categories
            .create_category(name, Some(description.to_owned()))
            .await
            .with_context(|| format!("seeding category {name}"))?;
        category_ids.push(id);
    }

    for sample in BANK {
        bank.add_question(draft(sample, category_ids[sample.category]))
            .await
            .with_context(|| format!("seeding question {:?}", sample.prompt))?;
    }

    let ownership = quizzes
        .create_quiz(
            "Ownership basics",
            "Four warm-up questions on moves and borrows.",
            category_ids[0],
            Some(5),
        )
        .await?;
    for index in OWNERSHIP_QUIZ {
        quizzes
            .add_question(ownership, draft(&BANK[index], category_ids[0]))
            .await?;
    }
    quizzes.publish(ownership).await?;

    // Left as a draft so listings show both states.
    quizzes
        .create_quiz("Async in depth", "Work in progress.", category_ids[2], None)
        .await?;

    let report = SeedReport {
        categories: category_ids.len(),
        bank_questions: BANK.len(),
        quizzes: 2,
    };
    info!(?report, "sample content seeded");
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use storage::repository::{QuestionRepository, QuizRepository};

    #[tokio::test]
    async fn seeds_once() {
        let storage = Storage::in_memory();
        let report = seed(&storage, fixed_clock()).await.unwrap().unwrap();
        assert_eq!(report.categories, 3);
        assert_eq!(report.bank_questions, BANK.len());

        let published = storage.quizzes.list_published_quizzes().await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].questions().len(), OWNERSHIP_QUIZ.len());
        assert_eq!(storage.quizzes.list_quizzes(None).await.unwrap().len(), 2);

        assert_eq!(seed(&storage, fixed_clock()).await.unwrap(), None);
        assert_eq!(
            storage.questions.list_questions().await.unwrap().len(),
            BANK.len()
        );
    }

    #[test]
    fn every_sample_is_valid() {
        for sample in BANK {
            assert!(sample.category < CATEGORIES.len());
            draft(sample, CategoryId::new(1)).validate().unwrap();
        }
    }
}
