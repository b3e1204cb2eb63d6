use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use quiz_core::model::{QuizId, TestSettings, UserId};

/// Local guest profile used when no user is configured.
const GUEST_USER: &str = "00000000-0000-4000-8000-000000000001";

#[derive(Debug, Parser)]
#[command(name = "quiz", version, about = "Timed multiple-choice practice")]
pub struct Cli {
    /// SQLite database URL or path
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3", global = true)]
    pub db_url: String,

    /// File holding in-progress mock test state
    #[arg(long, env = "QUIZ_SESSION_FILE", default_value = ".quiz/mock-test-progress.json", global = true)]
    pub session_file: PathBuf,

    /// Seconds allowed per mock test question (5-600)
    #[arg(long, env = "QUIZ_QUESTION_SECONDS", default_value_t = TestSettings::DEFAULT_QUESTION_SECONDS, global = true)]
    pub question_seconds: u32,

    /// Pause before moving on after an answer, in milliseconds (0-10000)
    #[arg(long, env = "QUIZ_ADVANCE_DELAY_MS", default_value_t = TestSettings::DEFAULT_ADVANCE_DELAY_MS, global = true)]
    pub advance_delay_ms: u64,

    /// Identity attempts are recorded under
    #[arg(long = "user", env = "QUIZ_USER_ID", default_value = GUEST_USER, global = true)]
    pub user_id: UserId,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the timed mock test over the whole question bank (default)
    Test {
        /// Fixed shuffle seed, for reproducible question order
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load sample categories, questions and quizzes
    Seed,
    /// List categories
    Categories,
    /// List quizzes
    Quizzes {
        /// Include unpublished drafts
        #[arg(long)]
        all: bool,
    },
    /// Take a published quiz
    Take { quiz_id: QuizId },
    /// Show attempt history
    Dashboard {
        /// Number of recent attempts to list
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Test { seed: None })
    }

    /// # Errors
    ///
    /// Returns `quiz_core::Error::Settings` for out-of-range timing values.
    pub fn test_settings(&self) -> Result<TestSettings, quiz_core::Error> {
        Ok(TestSettings::new(
            self.question_seconds,
            self.advance_delay_ms,
        )?)
    }

    /// The database URL as an absolute `sqlite://` URL.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank URL.
    pub fn database_url(&self) -> anyhow::Result<String> {
        if self.db_url.trim().is_empty() {
            bail!("--db must not be empty");
        }
        Ok(normalize_sqlite_url(&self.db_url))
    }
}

/// Turn `sqlite:path`, `sqlite://path` or a bare path into an absolute
/// `sqlite://` URL. In-memory URLs pass through.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite::memory:") {
        return trimmed.to_owned();
    }

    let path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directories if missing.
///
/// # Errors
///
/// Returns an error for a malformed URL or when the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url.starts_with("sqlite::memory:") {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database URL: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database URL: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quiz").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_mock_test() {
        let cli = parse(&[]);
        assert_eq!(cli.command(), Command::Test { seed: None });
        assert_eq!(cli.test_settings().unwrap(), TestSettings::default());
        assert_eq!(cli.user_id, GUEST_USER.parse::<UserId>().unwrap());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["take", "4", "--question-seconds", "45"]);
        assert_eq!(
            cli.command(),
            Command::Take {
                quiz_id: QuizId::new(4)
            }
        );
        assert_eq!(cli.test_settings().unwrap().question_seconds(), 45);
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let cli = parse(&["--question-seconds", "2"]);
        assert!(matches!(
            cli.test_settings(),
            Err(quiz_core::Error::Settings(_))
        ));
    }

    #[test]
    fn invalid_user_id_fails_to_parse() {
        let result =
            Cli::try_parse_from(["quiz", "--user", "not-a-uuid", "dashboard"]);
        assert!(result.is_err());
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/q.db"), "sqlite:///tmp/q.db");
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/q.db"), "sqlite:///tmp/q.db");
        assert_eq!(normalize_sqlite_url("/tmp/q.db"), "sqlite:///tmp/q.db");

        let relative = normalize_sqlite_url("sqlite://data/q.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("data/q.db"));
    }

    #[test]
    fn prepare_creates_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quiz.sqlite3");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(path.exists());
        prepare_sqlite_file("sqlite::memory:").unwrap();
        assert!(prepare_sqlite_file("postgres://x").is_err());
    }
}
