//! Workflows driven by the `heroku-tools` binary

pub mod orchestration;
