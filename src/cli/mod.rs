pub mod chat;
pub mod commands;
pub mod serve;
pub mod validate;

pub use commands::{Cli, Commands};
