use rand::Rng;

use super::question::{Difficulty, Question};

/// Which questions make it into a draw pool. `None` means no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub difficulty: Option<Difficulty>,
    pub topic: Option<String>,
}

impl QuestionFilter {
    pub fn new(difficulty: Option<Difficulty>, topic: Option<&str>) -> Self {
        QuestionFilter {
            difficulty,
            topic: topic.map(|t| t.to_owned()),
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        let difficulty_matches = match self.difficulty {
            Some(d) => question.difficulty() == Some(d),
            None => true,
        };
        let topic_matches = match &self.topic {
            Some(t) => question.topic() == t.as_str(),
            None => true,
        };
        difficulty_matches && topic_matches
    }
}

/// Questions left to ask during one session. Drawing never touches durable storage.
#[derive(Clone, Debug)]
pub struct DrawPool {
    questions: Vec<Question>,
    filter: QuestionFilter,
}

impl DrawPool {
    pub(super) fn new(questions: Vec<Question>, filter: QuestionFilter) -> Self {
        DrawPool { questions, filter }
    }

    pub(super) fn refill(&mut self, questions: Vec<Question>) {
        self.questions = questions;
    }

    /// Removes and returns a uniformly selected question, or `None` once the pool is dry.
    pub fn draw_random<R: Rng>(&mut self, rng: &mut R) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }
        let index = rng.gen_range(0, self.questions.len());
        Some(self.questions.remove(index))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn filter(&self) -> &QuestionFilter {
        &self.filter
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}
