use std::fmt;
use std::sync::Arc;

use quiz_core::model::Question;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

type ShuffleFn = dyn Fn(&mut [Question]) + Send + Sync;

/// How the bank is permuted when a session is built.
#[derive(Clone, Default)]
pub enum ShuffleStrategy {
    /// Thread-local entropy.
    #[default]
    Random,
    /// Deterministic: the n-th shuffle of a session uses `seed + n`.
    Seeded(u64),
    /// Keep bank order.
    Preserve,
    Custom(Arc<ShuffleFn>),
}

impl ShuffleStrategy {
    pub fn custom(f: impl Fn(&mut [Question]) + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Permute `questions` in place. `round` counts restarts so seeded
    /// sessions do not repeat the same order after a restart.
    pub fn apply(&self, questions: &mut [Question], round: u64) {
        match self {
            ShuffleStrategy::Random => questions.shuffle(&mut rand::rng()),
            ShuffleStrategy::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(round));
                questions.shuffle(&mut rng);
            }
            ShuffleStrategy::Preserve => {}
            ShuffleStrategy::Custom(f) => f(questions),
        }
    }
}

impl fmt::Debug for ShuffleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShuffleStrategy::Random => f.write_str("Random"),
            ShuffleStrategy::Seeded(seed) => f.debug_tuple("Seeded").field(seed).finish(),
            ShuffleStrategy::Preserve => f.write_str("Preserve"),
            ShuffleStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, QuestionDraft, QuestionId};

    fn bank(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|id| {
                QuestionDraft {
                    prompt: format!("Q{id}"),
                    options: ["a".into(), "b".into(), "c".into(), "d".into()],
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

    fn ids(questions: &[Question]) -> Vec<u64> {
        questions.iter().map(|q| q.id().value()).collect()
    }

    #[test]
    fn seeded_is_reproducible_per_round() {
        let mut a = bank(20);
        let mut b = bank(20);
        ShuffleStrategy::Seeded(7).apply(&mut a, 0);
        ShuffleStrategy::Seeded(7).apply(&mut b, 0);
        assert_eq!(ids(&a), ids(&b));

        let mut c = bank(20);
        ShuffleStrategy::Seeded(7).apply(&mut c, 1);
        assert_ne!(ids(&a), ids(&c));
    }

    #[test]
    fn preserve_and_custom() {
        let mut q = bank(4);
        ShuffleStrategy::Preserve.apply(&mut q, 3);
        assert_eq!(ids(&q), [1, 2, 3, 4]);

        ShuffleStrategy::custom(|qs| qs.reverse()).apply(&mut q, 0);
        assert_eq!(ids(&q), [4, 3, 2, 1]);
    }

    #[test]
    fn random_keeps_every_question() {
        let mut q = bank(10);
        ShuffleStrategy::Random.apply(&mut q, 0);
        let mut sorted = ids(&q);
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=10).collect::<Vec<_>>());
    }
}
