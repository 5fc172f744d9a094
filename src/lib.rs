pub mod config;
pub mod error;
pub mod game;
pub mod repository;

pub use error::{Error, Result};
