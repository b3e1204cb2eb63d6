//! Results compiler for a finished test.
//!
//! `Review::compile` is a pure function of the question list and the ledger.
//! It never mutates its inputs, so calling it repeatedly yields identical
//! output.

use serde::Serialize;

use crate::model::{AnswerState, Difficulty, Question, UserAnswer};

/// Overall ratio thresholds, highest first.
const TIER_THRESHOLDS: [(f64, Tier); 5] = [
    (0.90, Tier::Outstanding),
    (0.80, Tier::Excellent),
    (0.70, Tier::Good),
    (0.60, Tier::Fair),
    (0.50, Tier::Progressing),
];

const HARD_FOCUS_BELOW: f64 = 0.40;
const MEDIUM_REINFORCE_BELOW: f64 = 0.50;
const EASY_REVIEW_BELOW: f64 = 0.70;
const SKIPPED_TIME_MANAGEMENT_ABOVE: u32 = 20;

/// Coarse label for the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Outstanding,
    Excellent,
    Good,
    Fair,
    Progressing,
    Baseline,
}

impl Tier {
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        TIER_THRESHOLDS
            .iter()
            .find(|(threshold, _)| ratio >= *threshold)
            .map_or(Tier::Baseline, |(_, tier)| *tier)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Tier::Outstanding => "outstanding",
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Fair => "fair",
            Tier::Progressing => "progressing",
            Tier::Baseline => "baseline",
        }
    }
}

/// What the learner should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    FocusAdvancedTopics,
    ReinforceCoreConcepts,
    ReviewBasics,
    ImproveTimeManagement,
    ContinuePractice,
}

impl Recommendation {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::FocusAdvancedTopics => {
                "Focus on advanced topics: hard questions are your weakest area."
            }
            Recommendation::ReinforceCoreConcepts => {
                "Reinforce core concepts: medium questions need more practice."
            }
            Recommendation::ReviewBasics => "Review the basics before moving on.",
            Recommendation::ImproveTimeManagement => {
                "Work on time management: too many questions were skipped."
            }
            Recommendation::ContinuePractice => "Keep practicing to stay sharp.",
        }
    }
}

/// Correct/total for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Breakdown {
    pub correct: u32,
    pub total: u32,
}

impl Breakdown {
    /// `None` when no question of this difficulty was asked.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.correct) / f64::from(self.total))
    }
}

/// A single question's result, in session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub question: Question,
    pub answer: UserAnswer,
}

/// Aggregate results of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub unattempted: u32,
    pub marked: u32,
    pub easy: Breakdown,
    pub medium: Breakdown,
    pub hard: Breakdown,
    pub ratio: f64,
    pub percentage: u32,
    pub tier: Tier,
    pub recommendation: Recommendation,
    pub items: Vec<ReviewItem>,
}

impl Review {
    /// Compile results from index-aligned questions and answers.
    ///
    /// Extra entries on either side are ignored; the pairs are zipped.
    #[must_use]
    pub fn compile(questions: &[Question], answers: &[UserAnswer]) -> Self {
        let mut review = Review {
            total: 0,
            correct: 0,
            incorrect: 0,
            skipped: 0,
            unattempted: 0,
            marked: 0,
            easy: Breakdown::default(),
            medium: Breakdown::default(),
            hard: Breakdown::default(),
            ratio: 0.0,
            percentage: 0,
            tier: Tier::Baseline,
            recommendation: Recommendation::ContinuePractice,
            items: Vec::with_capacity(questions.len().min(answers.len())),
        };

        for (question, answer) in questions.iter().zip(answers) {
            review.total += 1;
            if answer.is_marked_for_review() {
                review.marked += 1;
            }

            let correct = match answer.state() {
                AnswerState::Answered { correct: true, .. } => {
                    review.correct += 1;
                    true
                }
                AnswerState::Answered { correct: false, .. } => {
                    review.incorrect += 1;
                    false
                }
                AnswerState::Skipped => {
                    review.skipped += 1;
                    false
                }
                AnswerState::Unanswered => {
                    review.unattempted += 1;
                    false
                }
            };

            let bucket = review.breakdown_mut(question.difficulty());
            bucket.total += 1;
            if correct {
                bucket.correct += 1;
            }

            review.items.push(ReviewItem {
                question: question.clone(),
                answer: *answer,
            });
        }

        if review.total > 0 {
            review.ratio = f64::from(review.correct) / f64::from(review.total);
            review.percentage = rounded_percentage(review.correct, review.total);
        }
        review.tier = Tier::from_ratio(review.ratio);
        review.recommendation = review.recommend();
        review
    }

    #[must_use]
    pub fn breakdown(&self, difficulty: Difficulty) -> Breakdown {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn breakdown_mut(&mut self, difficulty: Difficulty) -> &mut Breakdown {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    // First matching rule wins.
    fn recommend(&self) -> Recommendation {
        let below = |b: Breakdown, limit: f64| b.ratio().is_some_and(|r| r < limit);

        if below(self.hard, HARD_FOCUS_BELOW) {
            Recommendation::FocusAdvancedTopics
        } else if below(self.medium, MEDIUM_REINFORCE_BELOW) {
            Recommendation::ReinforceCoreConcepts
        } else if below(self.easy, EASY_REVIEW_BELOW) {
            Recommendation::ReviewBasics
        } else if self.skipped > SKIPPED_TIME_MANAGEMENT_ABOVE {
            Recommendation::ImproveTimeManagement
        } else {
            Recommendation::ContinuePractice
        }
    }
}

/// `part / whole` as a percentage rounded half up. `whole` must be non-zero.
#[must_use]
pub fn rounded_percentage(part: u32, whole: u32) -> u32 {
    let (part, whole) = (u64::from(part), u64::from(whole));
    let pct = (part * 100 + whole / 2) / whole;
    u32::try_from(pct).unwrap_or(u32::MAX)
}
