pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod heroku;
pub mod logging;
pub mod runner;
pub mod ui;
pub mod warnings;

pub use error::{HerokuToolsError, Result};
