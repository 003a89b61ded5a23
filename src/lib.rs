pub mod bio;
pub mod bold;
pub mod cli;

pub use crate::bold::batch::{BatchConfig, BatchRunner, ResumeMode};
pub use crate::bold::client::BoldClient;
pub use crate::bold::db::Database;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BoldError>;
