// questions.rs - The embedded trivia bank.
//
// Questions live in assets/questions.ron, compiled into the binary with
// include_str! so a missing data file is a build error, not a runtime one.
// The bank tracks which questions it has already served in the run; a boss
// whose pool is exhausted gets None back and the caller decides what that
// means (combat treats it as a free pass).

use std::collections::HashSet;

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

const QUESTION_DATA: &str = include_str!("../assets/questions.ron");

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("question data failed to parse: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// One multiple-choice question, tied to a boss by id.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Question {
    pub id: u32,
    pub boss_id: u8,
    pub text: String,
    pub choices: Vec<String>,
    pub correct: usize,
}

impl Question {
    pub fn correct_answer(&self) -> &str {
        &self.choices[self.correct]
    }
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

/// The run-scoped question pool.
#[derive(Resource, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    asked: HashSet<u32>,
}

impl QuestionBank {
    /// Parses a RON document. Records whose `correct` index falls outside
    /// their choices are dropped with a warning instead of poisoning the
    /// whole bank.
    pub fn from_ron(data: &str) -> Result<Self, QuestionBankError> {
        let file: QuestionFile = ron::from_str(data)?;
        let mut questions = Vec::with_capacity(file.questions.len());
        for q in file.questions {
            if q.correct >= q.choices.len() {
                warn!(
                    "dropping question {}: correct index {} out of range for {} choices",
                    q.id,
                    q.correct,
                    q.choices.len()
                );
                continue;
            }
            questions.push(q);
        }
        Ok(QuestionBank {
            questions,
            asked: HashSet::new(),
        })
    }

    /// The bundled bank. A parse failure here means the committed data file
    /// is broken; log it and run with an empty bank rather than panic.
    pub fn load_embedded() -> Self {
        match QuestionBank::from_ron(QUESTION_DATA) {
            Ok(bank) => bank,
            Err(e) => {
                error!("failed to load question bank: {e}");
                QuestionBank::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Picks an unasked question for the boss at random, marking it asked.
    /// Returns None once the boss's pool is exhausted.
    pub fn get_random_question(&mut self, boss_id: u8, rng: &mut impl Rng) -> Option<Question> {
        let candidates: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.boss_id == boss_id && !self.asked.contains(&q.id))
            .collect();
        let picked = (*candidates.choose(rng)?).clone();
        self.asked.insert(picked.id);
        Some(picked)
    }

    /// Forgets asked history; called when a run ends.
    pub fn reset(&mut self) {
        self.asked.clear();
    }
}

pub struct QuestionPlugin;

impl Plugin for QuestionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(QuestionBank::load_embedded());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE: &str = r#"(
        questions: [
            (id: 1, boss_id: 1, text: "a", choices: ["x", "y"], correct: 0),
            (id: 2, boss_id: 1, text: "b", choices: ["x", "y"], correct: 1),
            (id: 3, boss_id: 2, text: "c", choices: ["x", "y"], correct: 0),
        ],
    )"#;

    #[test]
    fn embedded_bank_parses_and_is_nonempty() {
        let bank = QuestionBank::from_ron(QUESTION_DATA).unwrap();
        assert!(!bank.is_empty());
        for boss_id in [1, 2, 3] {
            assert!(
                bank.questions.iter().any(|q| q.boss_id == boss_id),
                "no questions for boss {boss_id}"
            );
        }
    }

    #[test]
    fn questions_never_repeat_within_a_run() {
        let mut bank = QuestionBank::from_ron(SAMPLE).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let a = bank.get_random_question(1, &mut rng).unwrap();
        let b = bank.get_random_question(1, &mut rng).unwrap();
        assert_ne!(a.id, b.id);
        assert!(bank.get_random_question(1, &mut rng).is_none());
    }

    #[test]
    fn exhaustion_is_per_boss() {
        let mut bank = QuestionBank::from_ron(SAMPLE).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        bank.get_random_question(1, &mut rng);
        bank.get_random_question(1, &mut rng);
        assert!(bank.get_random_question(1, &mut rng).is_none());
        assert!(bank.get_random_question(2, &mut rng).is_some());
    }

    #[test]
    fn reset_restores_the_pool() {
        let mut bank = QuestionBank::from_ron(SAMPLE).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        bank.get_random_question(2, &mut rng);
        assert!(bank.get_random_question(2, &mut rng).is_none());
        bank.reset();
        assert!(bank.get_random_question(2, &mut rng).is_some());
    }

    #[test]
    fn out_of_range_correct_index_is_dropped() {
        let data = r#"(
            questions: [
                (id: 1, boss_id: 1, text: "a", choices: ["x"], correct: 3),
                (id: 2, boss_id: 1, text: "b", choices: ["x", "y"], correct: 1),
            ],
        )"#;
        let bank = QuestionBank::from_ron(data).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions[0].id, 2);
    }

    #[test]
    fn garbage_data_is_an_error_not_a_panic() {
        assert!(QuestionBank::from_ron("not ron at all").is_err());
    }

    #[test]
    fn correct_answer_indexes_choices() {
        let bank = QuestionBank::from_ron(SAMPLE).unwrap();
        assert_eq!(bank.questions[1].correct_answer(), "y");
    }
}
