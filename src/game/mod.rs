use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::repository::DrawPool;

mod outcome;
mod player;
mod turn;


pub use self::outcome::Outcome;
pub use self::player::{default_player_names, Player, DEFAULT_PLAYER_NAMES, MAX_PLAYERS};
pub use self::turn::{
    score_value, Choice, GuessResult, PresentedQuestion, CHOICE_LETTERS, DEFAULT_SCORE_VALUE,
};

use self::turn::Turn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
    QuestionLimitReached,
    PoolExhausted,
}

#[derive(Debug)]
enum Phase {
    Idle,
    InTurn(Turn),
    Finished(FinishReason),
}

/// Result of asking for the next question.
#[derive(Clone, Debug)]
pub enum Draw {
    Question(PresentedQuestion),
    /// The pool ran dry, the session is now finished.
    Exhausted,
}

/// One trivia session for one or two players, taking turns in order.
pub struct GameSession<R = ThreadRng> {
    pool: DrawPool,
    players: Vec<Player>,
    num_questions: usize,
    questions_asked: usize,
    next_player: usize,
    current_phase: Phase,
    rng: R,
}

impl GameSession<ThreadRng> {
    pub fn new<S: AsRef<str>>(
        pool: DrawPool,
        num_questions: usize,
        player_names: &[S],
    ) -> Result<Self> {
        Self::with_rng(pool, num_questions, player_names, rand::thread_rng())
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng<S: AsRef<str>>(
        pool: DrawPool,
        num_questions: usize,
        player_names: &[S],
        rng: R,
    ) -> Result<Self> {
        if num_questions == 0 {
            return Err(Error::Validation(
                "A session needs at least one question".into(),
            ));
        }
        let players = player::roster(player_names)?;
        info!(
            "Starting session: {} question(s), {} in pool, players: {:?}",
            num_questions,
            pool.len(),
            players.iter().map(|p| &p.name).collect::<Vec<_>>()
        );
        Ok(GameSession {
            pool,
            players,
            num_questions,
            questions_asked: 0,
            next_player: 0,
            current_phase: Phase::Idle,
            rng,
        })
    }

    fn set_current_phase(&mut self, phase: Phase) {
        debug!("Entering game phase: {:?}", phase);
        if let Phase::Finished(reason) = phase {
            info!(
                "Session finished ({:?}) after {} question(s): {}",
                reason,
                self.questions_asked,
                self.determine_winner()
            );
        }
        self.current_phase = phase;
    }

    pub fn present_next_question(&mut self) -> Result<Draw> {
        match self.current_phase {
            Phase::Idle => (),
            Phase::InTurn(_) => {
                return Err(Error::State(
                    "The current question has not been answered yet".into(),
                ))
            }
            Phase::Finished(_) => return Err(Error::State("The session is over".into())),
        };

        let question = match self.pool.draw_random(&mut self.rng) {
            Some(question) => question,
            None => {
                self.set_current_phase(Phase::Finished(FinishReason::PoolExhausted));
                return Ok(Draw::Exhausted);
            }
        };

        let turn = Turn::new(self.next_player, question, &mut self.rng);
        let presented = PresentedQuestion {
            player: self.players[self.next_player].name.clone(),
            number: self.questions_asked + 1,
            question: turn.question().clone(),
            choices: turn.choices().to_vec(),
        };
        self.set_current_phase(Phase::InTurn(turn));
        Ok(Draw::Question(presented))
    }

    pub fn score_answer(&mut self, player: &str, chosen_letter: &str) -> Result<GuessResult> {
        let player_index = self
            .player_index(player)
            .ok_or_else(|| Error::State(format!("{} is not playing in this session", player)))?;

        let guess_result = {
            let turn = match &self.current_phase {
                Phase::InTurn(turn) => turn,
                _ => return Err(Error::State("There is no active question".into())),
            };
            if turn.player_index() != player_index {
                return Err(Error::State(format!("It is not {}'s turn", player)));
            }
            let guess = turn.choice(chosen_letter)?.clone();
            let score_delta = turn.score_delta(&guess);
            GuessResult {
                player: self.players[player_index].name.clone(),
                is_correct: turn.question().is_answer_correct(&guess.text),
                guess,
                score_delta,
                correct_answer: turn.question().correct_answer().to_owned(),
            }
        };

        self.players[player_index].update_score(guess_result.score_delta);
        self.questions_asked += 1;
        self.next_player = (player_index + 1) % self.players.len();

        let next_phase = if self.questions_asked >= self.num_questions {
            Phase::Finished(FinishReason::QuestionLimitReached)
        } else {
            Phase::Idle
        };
        self.set_current_phase(next_phase);

        Ok(guess_result)
    }
}

impl<R> GameSession<R> {
    fn player_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.players.iter().position(|p| p.name == name)
    }

    pub fn determine_winner(&self) -> Outcome {
        Outcome::from_players(&self.players)
    }

    pub fn scores(&self) -> &[Player] {
        &self.players
    }

    pub fn score_of(&self, player: &str) -> Option<u32> {
        self.player_index(player).map(|i| self.players[i].score)
    }

    /// The player expected to answer next, or `None` once the session is over.
    pub fn current_player(&self) -> Option<&str> {
        match &self.current_phase {
            Phase::Idle => Some(self.players[self.next_player].name.as_str()),
            Phase::InTurn(turn) => Some(self.players[turn.player_index()].name.as_str()),
            Phase::Finished(_) => None,
        }
    }

    pub fn questions_asked(&self) -> usize {
        self.questions_asked
    }

    pub fn num_questions(&self) -> usize {
        self.num_questions
    }

    pub fn remaining_in_pool(&self) -> usize {
        self.pool.len()
    }

    pub fn is_in_turn(&self) -> bool {
        matches!(self.current_phase, Phase::InTurn(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.current_phase, Phase::Finished(_))
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        match self.current_phase {
            Phase::Finished(reason) => Some(reason),
            _ => None,
        }
    }

    /// Hands the pool back, e.g. to reset it for another session.
    pub fn into_pool(self) -> DrawPool {
        self.pool
    }
}
