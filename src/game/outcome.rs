use std::cmp::Reverse;
use std::fmt;

use super::player::Player;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Single player sessions only report a score.
    FinalScore { player: String, score: u32 },
    Winner {
        player: String,
        score: u32,
        runner_up_score: u32,
    },
    Tie { score: u32 },
}

impl Outcome {
    pub(super) fn from_players(players: &[Player]) -> Outcome {
        let mut ranking: Vec<&Player> = players.iter().collect();
        ranking.sort_by_key(|p| Reverse(p.score));
        match ranking.as_slice() {
            [leader, runner_up, ..] if leader.score == runner_up.score => Outcome::Tie {
                score: leader.score,
            },
            [leader, runner_up, ..] => Outcome::Winner {
                player: leader.name.clone(),
                score: leader.score,
                runner_up_score: runner_up.score,
            },
            [solo] => Outcome::FinalScore {
                player: solo.name.clone(),
                score: solo.score,
            },
            [] => Outcome::Tie { score: 0 },
        }
    }

    pub fn winner(&self) -> Option<&str> {
        match self {
            Outcome::Winner { player, .. } => Some(player),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::FinalScore { score, .. } => write!(f, "Final score: {}", score),
            Outcome::Winner { player, .. } => write!(f, "{} wins!", player),
            Outcome::Tie { .. } => write!(f, "It's a tie!"),
        }
    }
}
