// Application layer: CLI command handlers and terminal output.

pub mod commands;
pub mod output;
