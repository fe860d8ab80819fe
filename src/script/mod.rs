//! Command scripts
//!
//! Parses whitespace-separated command tokens and executes them against a
//! game state.

pub mod interpreter;
pub mod token;

pub use interpreter::execute;
pub use token::{tokenize, Command, TokenError};
