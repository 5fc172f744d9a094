use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{Error, Result};

pub const INCORRECT_ANSWER_COUNT: usize = 3;
pub const ANSWER_SEPARATOR: char = '|';

lazy_static! {
    static ref TOPIC_NAME_REGEX: Regex =
        Regex::new("^[A-Za-z0-9]([A-Za-z0-9 _-]*[A-Za-z0-9_-])?$").unwrap();
}

/// Trims and case-folds an answer so that it can be compared with another one.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn validate_topic(topic: &str) -> Result<()> {
    if TOPIC_NAME_REGEX.is_match(topic) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Invalid topic name {:?}: use letters, digits, inner spaces, '-' or '_'",
            topic
        )))
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_ref() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(Error::Validation(format!(
                "Unknown difficulty {:?}: expected easy, medium or hard",
                other
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Blank or unknown difficulties are tolerated in stored questions, they score the default value.
fn difficulty_from_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match raw.parse::<Difficulty>() {
        Ok(difficulty) => Ok(Some(difficulty)),
        Err(_) => {
            warn!("Unrecognized difficulty {:?} in question bank", raw);
            Ok(None)
        }
    }
}

/// One row of a partition file, before it is checked and attached to its topic.
#[derive(Debug, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "Question")]
    pub text: String,
    #[serde(rename = "Correct Answer")]
    pub correct_answer: String,
    #[serde(rename = "Option A", default)]
    pub option_a: Option<String>,
    #[serde(rename = "Option B", default)]
    pub option_b: Option<String>,
    #[serde(rename = "Option C", default)]
    pub option_c: Option<String>,
    #[serde(rename = "Incorrect Answers", default)]
    pub incorrect_answers: Option<String>,
    #[serde(
        rename = "Difficulty",
        default,
        deserialize_with = "difficulty_from_string"
    )]
    pub difficulty: Option<Difficulty>,
}

impl RawQuestion {
    pub fn into_question(self, topic: &str) -> std::result::Result<Question, String> {
        let RawQuestion {
            text,
            correct_answer,
            option_a,
            option_b,
            option_c,
            incorrect_answers,
            difficulty,
        } = self;

        if text.is_empty() {
            return Err("question text is empty".to_owned());
        }
        let incorrect_answers: Vec<String> = match incorrect_answers {
            Some(joined) => joined
                .split(ANSWER_SEPARATOR)
                .map(|a| a.trim().to_owned())
                .collect(),
            None => vec![option_a, option_b, option_c]
                .into_iter()
                .flatten()
                .collect(),
        };
        let incorrect_answers = checked_answers(&correct_answer, incorrect_answers)
            .map_err(|reason| format!("question {:?}: {}", text, reason))?;
        Ok(Question {
            text,
            correct_answer,
            incorrect_answers,
            difficulty,
            topic: topic.to_owned(),
        })
    }
}

fn as_answer_triple(answers: Vec<String>) -> Option<[String; 3]> {
    if answers.len() != INCORRECT_ANSWER_COUNT || answers.iter().any(|a| a.is_empty()) {
        return None;
    }
    let mut answers = answers.into_iter();
    Some([answers.next()?, answers.next()?, answers.next()?])
}

/// Every answer present, no two equal once normalized.
fn checked_answers(
    correct_answer: &str,
    incorrect_answers: Vec<String>,
) -> std::result::Result<[String; 3], String> {
    if correct_answer.is_empty() {
        return Err("correct answer cannot be empty".to_owned());
    }
    let incorrect_answers = as_answer_triple(incorrect_answers).ok_or_else(|| {
        format!(
            "expected exactly {} non-empty incorrect answers",
            INCORRECT_ANSWER_COUNT
        )
    })?;

    let distinct_answers = std::iter::once(correct_answer)
        .chain(incorrect_answers.iter().map(|a| a.as_str()))
        .map(normalize_answer)
        .unique()
        .count();
    if distinct_answers != INCORRECT_ANSWER_COUNT + 1 {
        return Err("answers must all differ from each other".to_owned());
    }
    Ok(incorrect_answers)
}

/// A multiple-choice question. Immutable once built: every copy owns its answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    text: String,
    correct_answer: String,
    incorrect_answers: [String; 3],
    difficulty: Option<Difficulty>,
    topic: String,
}

impl Question {
    pub fn new(
        text: &str,
        correct_answer: &str,
        incorrect_answers: &[&str],
        difficulty: &str,
        topic: &str,
    ) -> Result<Question> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Question text cannot be empty".into()));
        }

        let correct_answer = correct_answer.trim();
        let incorrect_answers: Vec<String> =
            incorrect_answers.iter().map(|a| a.trim().to_owned()).collect();
        if incorrect_answers.iter().any(|a| a.contains(ANSWER_SEPARATOR)) {
            return Err(Error::Validation(format!(
                "Incorrect answers cannot contain {:?}",
                ANSWER_SEPARATOR
            )));
        }
        let incorrect_answers =
            checked_answers(correct_answer, incorrect_answers).map_err(Error::Validation)?;

        let difficulty: Difficulty = difficulty.parse()?;
        validate_topic(topic)?;

        Ok(Question {
            text: text.to_owned(),
            correct_answer: correct_answer.to_owned(),
            incorrect_answers,
            difficulty: Some(difficulty),
            topic: topic.to_owned(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn incorrect_answers(&self) -> &[String; 3] {
        &self.incorrect_answers
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Fresh copy of all four answers, correct answer first.
    pub fn answers(&self) -> Vec<String> {
        std::iter::once(&self.correct_answer)
            .chain(self.incorrect_answers.iter())
            .cloned()
            .collect()
    }

    pub fn is_answer_correct(&self, answer: &str) -> bool {
        normalize_answer(answer) == normalize_answer(&self.correct_answer)
    }
}
