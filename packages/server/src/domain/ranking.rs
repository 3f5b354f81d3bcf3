//! Standings order.

use std::cmp::Ordering;

use super::entity::PlayerProgress;

/// Order two players for the standings.
///
/// Ranked finishers (position > 0) come first in finish order. Everyone else,
/// including players who only ran out of time, follows by descending CPM.
pub fn compare_standing(a: &PlayerProgress, b: &PlayerProgress) -> Ordering {
    match (a.position, b.position) {
        (0, 0) => b.cpm.cmp(&a.cpm),
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        (pa, pb) => pa.cmp(&pb),
    }
}
