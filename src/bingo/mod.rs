//! Bingo ticket generation and win-pattern evaluation
//!
//! Both halves are pure: no shared state, no I/O. The session state machine
//! calls `generate_ticket` once per join and `has_winning_pattern` after every
//! mark attempt.

mod pattern;
mod ticket;

pub use pattern::{has_winning_pattern, winning_patterns, Pattern};
pub use ticket::{generate_ticket, required_cells};
