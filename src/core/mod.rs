//! Application-level plumbing: CLI parsing, workspace configuration and
//! the error taxonomy shared by the whole pipeline.

pub mod cli;
pub mod config;
pub mod errors;
