use std::collections::HashMap;

use quiz_core::model::{Category, CategoryId, Quiz, QuizId};

/// Selection-friendly representation of a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryOptionVm {
    pub id: CategoryId,
    pub label: String,
}

#[must_use]
pub fn map_category_options(categories: &[Category]) -> Vec<CategoryOptionVm> {
    categories
        .iter()
        .map(|category| CategoryOptionVm {
            id: category.id(),
            label: format_category_label(category.name(), category.description()),
        })
        .collect()
}

fn format_category_label(name: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) => format!("{name} - {desc}"),
        None => name.to_owned(),
    }
}

/// A quiz in a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizCardVm {
    pub id: QuizId,
    pub title: String,
    pub category_label: String,
    pub question_count: usize,
    pub time_limit_label: String,
    pub status_label: &'static str,
}

/// Quizzes joined with their category names. Unknown categories show as
/// `uncategorized`.
#[must_use]
pub fn map_quiz_cards(quizzes: &[Quiz], categories: &[Category]) -> Vec<QuizCardVm> {
    let names: HashMap<CategoryId, &str> =
        categories.iter().map(|c| (c.id(), c.name())).collect();

    quizzes
        .iter()
        .map(|quiz| QuizCardVm {
            id: quiz.id(),
            title: quiz.title().to_owned(),
            category_label: names
                .get(&quiz.category_id())
                .map_or_else(|| "uncategorized".to_owned(), |n| (*n).to_owned()),
            question_count: quiz.questions().len(),
            time_limit_label: quiz
                .time_limit_minutes()
                .map_or_else(|| "untimed".to_owned(), |m| format!("{m} min")),
            status_label: if quiz.is_published() {
                "published"
            } else {
                "draft"
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn category_label_includes_description_when_present() {
        let categories = vec![
            Category::new(CategoryId::new(1), "Ownership", Some("Moves and borrows".into()))
                .unwrap(),
            Category::new(CategoryId::new(2), "Traits", None).unwrap(),
        ];
        let options = map_category_options(&categories);
        assert_eq!(options[0].label, "Ownership - Moves and borrows");
        assert_eq!(options[1].label, "Traits");
    }

    #[test]
    fn quiz_cards_join_category_names() {
        let categories =
            vec![Category::new(CategoryId::new(1), "Async", None).unwrap()];
        let quizzes = vec![
            Quiz::new(QuizId::new(1), "Futures", "", CategoryId::new(1), Some(15), fixed_now())
                .unwrap(),
            Quiz::new(QuizId::new(2), "Pinning", "", CategoryId::new(9), None, fixed_now())
                .unwrap(),
        ];
        let cards = map_quiz_cards(&quizzes, &categories);
        assert_eq!(cards[0].category_label, "Async");
        assert_eq!(cards[0].time_limit_label, "15 min");
        assert_eq!(cards[0].status_label, "draft");
        assert_eq!(cards[1].category_label, "uncategorized");
        assert_eq!(cards[1].time_limit_label, "untimed");
    }
}
