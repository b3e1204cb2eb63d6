use std::collections::HashMap;

use quiz_core::model::{AttemptId, Quiz, QuizId};
use services::Dashboard;
use storage::AttemptRow;

use crate::vm::time_fmt::{format_datetime, format_elapsed};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptCardVm {
    pub id: AttemptId,
    pub quiz_title: String,
    pub score_label: String,
    pub percentage: u32,
    pub time_label: String,
    pub completed_at_str: String,
    pub overtime: bool,
}

impl AttemptCardVm {
    /// Without a title the card falls back to the quiz id.
    #[must_use]
    pub fn new(row: &AttemptRow, quiz_title: Option<&str>) -> Self {
        let attempt = &row.attempt;
        Self {
            id: row.id,
            quiz_title: quiz_title
                .map_or_else(|| format!("Quiz #{}", attempt.quiz_id()), str::to_owned),
            score_label: format!("{} / {}", attempt.score(), attempt.total()),
            percentage: attempt.percentage(),
            time_label: format_elapsed(attempt.time_taken_secs()),
            completed_at_str: format_datetime(attempt.completed_at()),
            overtime: attempt.exceeded_time_limit(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub attempts_label: String,
    pub average_label: String,
    pub best_label: String,
    pub recent: Vec<AttemptCardVm>,
}

impl DashboardVm {
    /// `quizzes` is used only to resolve titles; deleted quizzes fall back to
    /// their id.
    #[must_use]
    pub fn new(dashboard: &Dashboard, quizzes: &[Quiz]) -> Self {
        let titles: HashMap<QuizId, &str> = quizzes.iter().map(|q| (q.id(), q.title())).collect();
        let pct = |v: Option<u32>| v.map_or_else(|| "-".to_owned(), |p| format!("{p}%"));

        Self {
            attempts_label: match dashboard.attempts {
                1 => "1 attempt".to_owned(),
                n => format!("{n} attempts"),
            },
            average_label: pct(dashboard.average_percentage),
            best_label: pct(dashboard.best_percentage),
            recent: dashboard
                .recent
                .iter()
                .map(|row| AttemptCardVm::new(row, titles.get(&row.attempt.quiz_id()).copied()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use quiz_core::model::{CategoryId, Difficulty, QuestionDraft, QuizAttempt, UserId};
    use quiz_core::time::fixed_now;

    fn quiz() -> Quiz {
        let mut quiz = Quiz::new(
            QuizId::new(3),
            "Lifetimes",
            "",
            CategoryId::new(1),
            Some(1),
            fixed_now(),
        )
        .unwrap();
        for correct_option in [0, 1] {
            quiz.add_question(
                QuestionDraft {
                    prompt: format!("pick {correct_option}"),
                    options: ["0".into(), "1".into(), "2".into(), "3".into()],
                    correct_option,
                    explanation: String::new(),
                    difficulty: Difficulty::Medium,
                    category_id: None,
                }
                .validate()
                .unwrap(),
            );
        }
        quiz
    }

    #[test]
    fn cards_resolve_titles_and_flag_overtime() {
        let quiz = quiz();
        let attempt = QuizAttempt::grade(
            UserId::random(),
            &quiz,
            &[Some(0), None],
            125,
            fixed_now() + Duration::minutes(3),
        )
        .unwrap();
        let dashboard = Dashboard {
            attempts: 1,
            average_percentage: Some(50),
            best_percentage: Some(50),
            recent: vec![AttemptRow::new(AttemptId::new(7), attempt)],
        };

        let vm = DashboardVm::new(&dashboard, std::slice::from_ref(&quiz));
        assert_eq!(vm.attempts_label, "1 attempt");
        assert_eq!(vm.average_label, "50%");
        let card = &vm.recent[0];
        assert_eq!(card.quiz_title, "Lifetimes");
        assert_eq!(card.score_label, "1 / 2");
        assert_eq!(card.time_label, "2m 05s");
        assert!(card.overtime);

        let orphan = DashboardVm::new(&dashboard, &[]);
        assert_eq!(orphan.recent[0].quiz_title, "Quiz #3");
    }

    #[test]
    fn empty_dashboard_uses_placeholders() {
        let vm = DashboardVm::new(
            &Dashboard {
                attempts: 0,
                average_percentage: None,
                best_percentage: None,
                recent: Vec::new(),
            },
            &[],
        );
        assert_eq!(vm.attempts_label, "0 attempts");
        assert_eq!(vm.best_label, "-");
    }
}
