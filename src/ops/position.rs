//! Fractional position-key allocation.
//!
//! New keys are placed at the arithmetic midpoint of their neighbors, so an
//! insert never renumbers other rows. The trade-off is precision: repeated
//! insertion at the same slot halves the local gap each time, and after
//! enough halvings the midpoint is no longer representably between its
//! neighbors. `allocate` returns `None` at that point (and for corrupt
//! equal/inverted neighbors) so the caller can renumber the whole sequence
//! at `BASE_GAP` spacing instead.

/// Baseline key for an empty list, and the spacing used when renumbering.
pub const BASE_GAP: f64 = 1000.0;

/// Minimum gap a midpoint must leave on both sides. Below this the slot is
/// considered exhausted.
pub const MIN_GAP: f64 = 1e-6;

/// Compute an ordering key between two neighbors.
///
/// `None` for a missing neighbor means the insertion point is at that end
/// of the list. Returns `None` when no usable key exists between the
/// neighbors: equal or inverted keys (corrupt data), or a gap too small to
/// split.
pub fn allocate(prev: Option<f64>, next: Option<f64>) -> Option<f64> {
    match (prev, next) {
        (None, None) => Some(BASE_GAP),
        (Some(prev), None) => Some(prev + BASE_GAP),
        (None, Some(next)) => {
            let key = next / 2.0;
            if key < MIN_GAP || next - key < MIN_GAP {
                None
            } else {
                Some(key)
            }
        }
        (Some(prev), Some(next)) => {
            if prev >= next {
                // Equal-key collision or inverted neighbors
                return None;
            }
            let mid = (prev + next) / 2.0;
            if mid - prev < MIN_GAP || next - mid < MIN_GAP {
                None
            } else {
                Some(mid)
            }
        }
    }
}

/// Evenly spaced keys for a full renumbering: 1000, 2000, 3000, …
pub fn spaced_keys(count: usize) -> impl Iterator<Item = f64> {
    (1..=count).map(|i| i as f64 * BASE_GAP)
}
