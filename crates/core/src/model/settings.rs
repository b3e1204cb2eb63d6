use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("seconds per question must be between 5 and 600")]
    InvalidQuestionSeconds,

    #[error("auto-advance delay must be at most 10000 ms")]
    InvalidAdvanceDelay,
}

/// Timing knobs for the mock test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestSettings {
    question_seconds: u32,
    advance_delay_ms: u64,
}

impl TestSettings {
    pub const DEFAULT_QUESTION_SECONDS: u32 = 30;
    pub const DEFAULT_ADVANCE_DELAY_MS: u64 = 1_500;

    /// # Errors
    ///
    /// Returns `SettingsError` when a value falls outside its allowed range.
    pub fn new(question_seconds: u32, advance_delay_ms: u64) -> Result<Self, SettingsError> {
        if !(5..=600).contains(&question_seconds) {
            return Err(SettingsError::InvalidQuestionSeconds);
        }
        if advance_delay_ms > 10_000 {
            return Err(SettingsError::InvalidAdvanceDelay);
        }
        Ok(Self {
            question_seconds,
            advance_delay_ms,
        })
    }

    /// Per-question budget in seconds.
    #[must_use]
    pub fn question_seconds(&self) -> u32 {
        self.question_seconds
    }

    /// Delay between a selection and the automatic move to the next question.
    #[must_use]
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            question_seconds: Self::DEFAULT_QUESTION_SECONDS,
            advance_delay_ms: Self::DEFAULT_ADVANCE_DELAY_MS,
        }
    }
}
