use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use quiz_core::Clock;
use services::{
    CategoryService, ChannelNotifier, MockTestService, QuizService, QuizTakingService,
    ShuffleStrategy, TestSessionError,
};
use storage::repository::{CategoryRepository, QuizRepository};
use storage::{FileSessionStore, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::vm::{AttemptCardVm, DashboardVm, map_category_options, map_quiz_cards};

mod config;
mod seed;
mod terminal;

use config::{Cli, Command, prepare_sqlite_file};

const DEFAULT_LOG_FILTER: &str = "app=info,services=info,storage=warn";

fn print_attempt(card: &AttemptCardVm) {
    let overtime = if card.overtime { "  (over time limit)" } else { "" };
    println!(
        "  {}  {:<24} {:>7}  {:>3}%  {}{}",
        card.completed_at_str,
        card.quiz_title,
        card.score_label,
        card.percentage,
        card.time_label,
        overtime
    );
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.test_settings()?;
    let db_url = cli.database_url()?;

    // Open + migrate SQLite here so the library crates stay free of process setup.
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("opening {db_url}"))?;
    let clock = Clock::system();
    info!(db = %db_url, command = ?cli.command(), "starting");

    match cli.command() {
        Command::Test { seed } => {
            let store = Arc::new(FileSessionStore::new(&cli.session_file));
            let (notifier, notices) = ChannelNotifier::new();
            let shuffle = seed.map_or(ShuffleStrategy::Random, ShuffleStrategy::Seeded);
            let service = MockTestService::new(settings, Arc::clone(&storage.questions), store)
                .with_shuffle(shuffle)
                .with_notifier(Arc::new(notifier));

            let driver = match service.launch().await {
                Err(TestSessionError::EmptyBank) => {
                    bail!("the question bank is empty; run `seed` first")
                }
                other => other?,
            };
            terminal::run_mock_test(driver, notices, &mut terminal::stdin_lines()).await?;
        }
        Command::Seed => match seed::seed(&storage, clock).await? {
            Some(report) => println!(
                "Seeded {} categories, {} bank questions and {} quizzes.",
                report.categories, report.bank_questions, report.quizzes
            ),
            None => println!("Database already has content; nothing seeded."),
        },
        Command::Categories => {
            let categories =
                CategoryService::new(Arc::clone(&storage.categories), Arc::clone(&storage.quizzes))
                    .list_categories()
                    .await?;
            if categories.is_empty() {
                println!("No categories yet.");
            }
            for option in map_category_options(&categories) {
                println!("{:>4}  {}", option.id.value(), option.label);
            }
        }
        Command::Quizzes { all } => {
            let quizzes = QuizService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.categories),
            );
            let listed = if all {
                quizzes.list_quizzes(None).await?
            } else {
                quizzes.list_published().await?
            };
            let categories = storage.categories.list_categories().await?;
            if listed.is_empty() {
                println!("No quizzes to show.");
            }
            for card in map_quiz_cards(&listed, &categories) {
                println!(
                    "{:>4}  {:<28} {:<12} {:>2} questions  {:<8} {}",
                    card.id.value(),
                    card.title,
                    card.category_label,
                    card.question_count,
                    card.time_limit_label,
                    card.status_label
                );
            }
        }
        Command::Take { quiz_id } => {
            let service = QuizTakingService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.attempts),
            );
            let mut lines = terminal::stdin_lines();
            match terminal::take_quiz(&service, cli.user_id, quiz_id, &mut lines).await? {
                Some(card) => {
                    println!("\nAttempt recorded:");
                    print_attempt(&card);
                }
                None => println!("Quiz abandoned; nothing recorded."),
            }
        }
        Command::Dashboard { limit } => {
            let service = QuizTakingService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.attempts),
            );
            let dashboard = service.dashboard(cli.user_id, limit).await?;
            let quizzes = storage.quizzes.list_quizzes(None).await?;
            let vm = DashboardVm::new(&dashboard, &quizzes);
            println!(
                "{}  average {}  best {}",
                vm.attempts_label, vm.average_label, vm.best_label
            );
            for card in &vm.recent {
                print_attempt(card);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
