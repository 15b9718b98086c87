// Public API for integration tests and potential library usage

pub mod api;
pub mod bingo;
pub mod clues;
pub mod protocol;
pub mod scheduler;
pub mod state;
pub mod types;
pub mod ws;
