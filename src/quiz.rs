use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::Question;

/// Category id the quiz client sends for "all categories".
pub const ALL_CATEGORIES: i64 = 0;

/// Draws one question uniformly from `candidates`, skipping the ids in `previous`.
/// `None` once every candidate has been asked.
pub fn pick_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let previous: HashSet<i64> = previous.iter().copied().collect();
    let remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    remaining.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn questions(ids: &[i64]) -> Vec<Question> {
        ids.iter()
            .map(|&id| Question {
                id,
                question: format!("Question {id}"),
                answer: "answer".to_owned(),
                category: "1".to_owned(),
                difficulty: 1,
            })
            .collect()
    }

    #[test]
    fn never_repeats_previous_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = pick_question(questions(&[1, 2, 3, 4]), &[1, 2, 4], &mut rng).unwrap();
            assert_eq!(picked.id, 3);
        }
    }

    #[test]
    fn exhausted_candidates_yield_none() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(pick_question(questions(&[1, 2]), &[2, 1], &mut rng).is_none());
        assert!(pick_question(Vec::new(), &[], &mut rng).is_none());
    }

    #[test]
    fn every_remaining_candidate_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let picked = pick_question(questions(&[1, 2, 3, 4, 5]), &[5], &mut rng).unwrap();
            seen.insert(picked.id);
        }
        assert_eq!(seen, HashSet::from([1, 2, 3, 4]));
    }
}
