//! API endpoint handlers.

pub mod health;
pub mod prompt;
pub mod triage;
