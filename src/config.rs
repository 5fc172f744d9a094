use directories_next::BaseDirs;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DATA_DIR_VAR: &str = "TRIVIA_DATA_DIR";
pub const NUM_QUESTIONS_VAR: &str = "TRIVIA_NUM_QUESTIONS";
pub const DEFAULT_NUM_QUESTIONS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub num_questions: usize,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Self::from_vars(env::var_os(DATA_DIR_VAR), env::var(NUM_QUESTIONS_VAR).ok())
    }

    fn from_vars(data_dir: Option<OsString>, num_questions: Option<String>) -> Result<Config> {
        let data_dir = match data_dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let num_questions = match num_questions {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Validation(format!(
                        "{} must be a positive integer, got {:?}",
                        NUM_QUESTIONS_VAR, raw
                    )))
                }
            },
            None => DEFAULT_NUM_QUESTIONS,
        };

        Ok(Config {
            data_dir,
            num_questions,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let mut dir = BaseDirs::new()
        .ok_or_else(|| Error::NotFound("could not locate system directories".into()))?
        .data_dir()
        .to_path_buf();
    dir.push("trivia");
    Ok(dir)
}
