use itertools::Itertools;

use crate::error::{Error, Result};

pub const MAX_PLAYERS: usize = 2;
pub const DEFAULT_PLAYER_NAMES: [&str; MAX_PLAYERS] = ["Player 1", "Player 2"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Player {
            name: name.to_owned(),
            score: 0,
        }
    }

    pub fn update_score(&mut self, delta: u32) {
        self.score += delta;
    }
}

pub fn default_player_names(count: usize) -> Result<Vec<String>> {
    check_player_count(count)?;
    Ok(DEFAULT_PLAYER_NAMES[..count]
        .iter()
        .map(|n| n.to_string())
        .collect())
}

fn check_player_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_PLAYERS {
        return Err(Error::Validation(format!(
            "A session needs 1 to {} players, got {}",
            MAX_PLAYERS, count
        )));
    }
    Ok(())
}

pub(super) fn roster<S: AsRef<str>>(names: &[S]) -> Result<Vec<Player>> {
    check_player_count(names.len())?;

    let names: Vec<&str> = names.iter().map(|n| n.as_ref().trim()).collect();
    if names.iter().any(|n| n.is_empty()) {
        return Err(Error::Validation("Player names cannot be empty".into()));
    }
    if names.iter().unique().count() != names.len() {
        return Err(Error::Validation(format!(
            "Player names must differ: {}",
            names.iter().join(", ")
        )));
    }

    Ok(names.into_iter().map(Player::new).collect())
}
