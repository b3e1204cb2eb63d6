use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId};

/// Every question in this domain offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_owned())),
        }
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct option {index} is out of range (expected < {OPTION_COUNT})")]
    CorrectOptionOutOfRange { index: usize },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DRAFT → VALIDATED → QUESTION ──────────────────────────────────────────────
//

/// Unvalidated question input, as typed into an admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct_option: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub category_id: Option<CategoryId>,
}

impl QuestionDraft {
    /// Trim and check the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt or an option is blank, or the
    /// correct option index does not point at one of the options.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let mut options: [String; OPTION_COUNT] = Default::default();
        for (index, (slot, raw)) in options.iter_mut().zip(self.options).enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            *slot = trimmed.to_owned();
        }

        if self.correct_option >= OPTION_COUNT {
            return Err(QuestionError::CorrectOptionOutOfRange {
                index: self.correct_option,
            });
        }

        Ok(ValidatedQuestion {
            prompt,
            options,
            correct_option: self.correct_option,
            explanation: self.explanation.trim().to_owned(),
            difficulty: self.difficulty,
            category_id: self.category_id,
        })
    }
}

/// A checked question that has not been given an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct_option: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub category_id: Option<CategoryId>,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            prompt: self.prompt,
            options: self.options,
            correct_option: self.correct_option,
            explanation: self.explanation,
            difficulty: self.difficulty,
            category_id: self.category_id,
        }
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_option: usize,
    explanation: String,
    difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_id: Option<CategoryId>,
}

impl Question {
    /// Rehydrate a question from storage, re-checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the persisted fields are invalid.
    pub fn from_persisted(
        id: QuestionId,
        prompt: String,
        options: [String; OPTION_COUNT],
        correct_option: usize,
        explanation: String,
        difficulty: Difficulty,
        category_id: Option<CategoryId>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            prompt,
            options,
            correct_option,
            explanation,
            difficulty,
            category_id,
        }
        .validate()
        .map(|validated| validated.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }

    /// Same question content under a different identity.
    #[must_use]
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
