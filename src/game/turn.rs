use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::error::{Error, Result};
use crate::repository::{normalize_answer, Difficulty, Question};

pub const CHOICE_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];
pub const DEFAULT_SCORE_VALUE: u32 = 10;

lazy_static! {
    static ref CHOICE_LETTER_REGEX: Regex = Regex::new("^(?i)([a-d])$").unwrap();
}

/// Points awarded for a correct answer.
pub fn score_value(difficulty: Option<Difficulty>) -> u32 {
    match difficulty {
        Some(Difficulty::Easy) => 10,
        Some(Difficulty::Medium) => 20,
        Some(Difficulty::Hard) => 30,
        None => DEFAULT_SCORE_VALUE,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub letter: char,
    pub text: String,
}

/// What a player sees when their turn begins.
#[derive(Clone, Debug)]
pub struct PresentedQuestion {
    pub player: String,
    pub number: usize,
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl PresentedQuestion {
    pub fn letter_of(&self, answer: &str) -> Option<char> {
        let answer = normalize_answer(answer);
        self.choices
            .iter()
            .find(|c| normalize_answer(&c.text) == answer)
            .map(|c| c.letter)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessResult {
    pub player: String,
    pub guess: Choice,
    pub score_delta: u32,
    pub is_correct: bool,
    pub correct_answer: String,
}

#[derive(Debug)]
pub(super) struct Turn {
    player_index: usize,
    question: Question,
    choices: Vec<Choice>,
}

impl Turn {
    pub fn new<R: Rng>(player_index: usize, question: Question, rng: &mut R) -> Self {
        let mut answers = question.answers();
        answers.shuffle(rng);
        let choices = CHOICE_LETTERS
            .iter()
            .zip(answers)
            .map(|(letter, text)| Choice {
                letter: *letter,
                text,
            })
            .collect();
        Turn {
            player_index,
            question,
            choices,
        }
    }

    pub fn player_index(&self) -> usize {
        self.player_index
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn choice(&self, letter: &str) -> Result<&Choice> {
        let captures = CHOICE_LETTER_REGEX
            .captures(letter.trim())
            .ok_or_else(|| Error::Validation(format!("{:?} is not one of A, B, C or D", letter)))?;
        let letter = captures[1].to_uppercase();
        self.choices
            .iter()
            .find(|c| letter.starts_with(c.letter))
            .ok_or_else(|| Error::Validation(format!("No choice {}", letter)))
    }

    pub fn score_delta(&self, choice: &Choice) -> u32 {
        if self.question.is_answer_correct(&choice.text) {
            score_value(self.question.difficulty())
        } else {
            0
        }
    }
}
