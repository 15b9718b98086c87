use crate::types::{Cell, Clue, Ticket};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of clues a ticket of this size consumes (odd grids reserve the center)
pub fn required_cells(grid_size: usize) -> usize {
    let total = grid_size * grid_size;
    if grid_size % 2 == 1 {
        total - 1
    } else {
        total
    }
}

/// Build a randomized ticket from the clue pool.
///
/// The pool is shuffled (Fisher-Yates via `SliceRandom::shuffle`) and laid out
/// row-major. Odd grids get a pre-marked free space at the exact center. If the
/// pool runs out, the remaining coordinates stay `None`; callers are expected to
/// check `required_cells` first.
pub fn generate_ticket<R: Rng + ?Sized>(pool: &[Clue], grid_size: usize, rng: &mut R) -> Ticket {
    let mut ids: Vec<_> = pool.iter().map(|c| c.id).collect();
    ids.shuffle(rng);
    let mut ids = ids.into_iter();

    let center = (grid_size % 2 == 1).then_some(grid_size / 2);

    let rows = (0..grid_size)
        .map(|row| {
            (0..grid_size)
                .map(|col| {
                    let id = row * grid_size + col;
                    if center == Some(row) && center == Some(col) {
                        Some(Cell::free_space(id))
                    } else {
                        ids.next().map(|clue_id| Cell::with_clue(id, clue_id))
                    }
                })
                .collect()
        })
        .collect();

    Ticket { rows }
}
