//! Subcommand implementations.

pub mod register;
