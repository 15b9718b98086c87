use crate::types::Ticket;
use serde::{Deserialize, Serialize};

/// A satisfied winning pattern
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Pattern {
    Row(usize),
    Column(usize),
    Diagonal,
    AntiDiagonal,
    FourCorners,
}

/// True if any row, column, diagonal or the four corners are fully marked.
/// Missing cells count as unmarked; an empty grid never wins.
pub fn has_winning_pattern(ticket: &Ticket) -> bool {
    let n = ticket.size();
    if n == 0 {
        return false;
    }

    (0..n).any(|r| (0..n).all(|c| ticket.is_marked(r, c)))
        || (0..n).any(|c| (0..n).all(|r| ticket.is_marked(r, c)))
        || (0..n).all(|i| ticket.is_marked(i, i))
        || (0..n).all(|i| ticket.is_marked(i, n - 1 - i))
        || corners_marked(ticket, n)
}

/// Every pattern the ticket currently satisfies, rows first
pub fn winning_patterns(ticket: &Ticket) -> Vec<Pattern> {
    let n = ticket.size();
    let mut found = Vec::new();
    if n == 0 {
        return found;
    }

    found.extend((0..n).filter(|&r| (0..n).all(|c| ticket.is_marked(r, c))).map(Pattern::Row));
    found.extend(
        (0..n)
            .filter(|&c| (0..n).all(|r| ticket.is_marked(r, c)))
            .map(Pattern::Column),
    );
    if (0..n).all(|i| ticket.is_marked(i, i)) {
        found.push(Pattern::Diagonal);
    }
    if (0..n).all(|i| ticket.is_marked(i, n - 1 - i)) {
        found.push(Pattern::AntiDiagonal);
    }
    if corners_marked(ticket, n) {
        found.push(Pattern::FourCorners);
    }
    found
}

fn corners_marked(ticket: &Ticket, n: usize) -> bool {
    let last = n - 1;
    [(0, 0), (0, last), (last, 0), (last, last)]
        .iter()
        .all(|&(r, c)| ticket.is_marked(r, c))
}
