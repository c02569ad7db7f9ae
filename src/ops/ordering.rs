//! Display-order comparison and position self-healing.
//!
//! The comparator is total: every pair of tasks has one deterministic
//! ordering under every mode, so re-sorting on render can never flicker.
//! The repair pass converges a collection whose position keys are missing
//! or colliding (legacy records, concurrent-session collisions) back to
//! strictly increasing, evenly spaced keys.

use std::cmp::Ordering;

use crate::model::task::{SortMode, Task};
use crate::ops::position::spaced_keys;

/// Compare two tasks for display under the given sort mode.
///
/// Precedence: completed tasks always sort last; then the mode's own
/// criterion (urgency weight descending, or due date ascending with dated
/// tasks before undated ones); then position ascending; then creation time
/// newest-first; finally id, so no two distinct tasks ever compare equal.
pub fn compare(a: &Task, b: &Task, mode: SortMode) -> Ordering {
    if a.completed != b.completed {
        return if a.completed {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    match mode {
        SortMode::Urgency => {
            let ord = b.urgency.weight().cmp(&a.urgency.weight());
            if ord != Ordering::Equal {
                return ord;
            }
        }
        SortMode::Time => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) if x != y => return x.cmp(&y),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            _ => {}
        },
        SortMode::Manual => {}
    }

    // Manual order. A lone unmigrated task (position 0) simply sorts first,
    // and corrupt non-finite keys are treated as missing so the order stays
    // total even before the repair pass has run.
    let key = |t: &Task| if t.position.is_finite() { t.position } else { 0.0 };
    match key(a).total_cmp(&key(b)) {
        Ordering::Equal => {}
        ord => return ord,
    }

    let ord = b.created_at.cmp(&a.created_at);
    if ord != Ordering::Equal {
        return ord;
    }
    a.id.cmp(&b.id)
}

/// Indices of `tasks` in display order under `mode`.
pub fn sorted_view(tasks: &[Task], mode: SortMode) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&i, &j| compare(&tasks[i], &tasks[j], mode));
    order
}

/// Whether the collection needs a full position renumbering.
///
/// Two or more tasks without a valid key means the data predates manual
/// ordering (or was corrupted); a single one is tolerated — it just sorts
/// first. Any duplicate among the valid keys is an equal-key collision
/// (concurrent sessions, or midpoint precision collapse) and also triggers.
pub fn needs_repair(tasks: &[Task]) -> bool {
    let invalid = tasks.iter().filter(|t| !t.has_valid_position()).count();
    if invalid > 1 {
        return true;
    }

    let mut seen: Vec<f64> = tasks
        .iter()
        .filter(|t| t.has_valid_position())
        .map(|t| t.position)
        .collect();
    seen.sort_by(|a, b| a.total_cmp(b));
    seen.windows(2).any(|w| w[0] == w[1])
}

/// Renumber every task at even spacing, ordered by creation time ascending
/// (id as deterministic tiebreak). Returns the `(id, new_position)` pairs
/// that actually changed; the caller persists each one independently.
///
/// Running this on an already well-formed collection returns no changes in
/// the sense that `needs_repair` will not trigger it again: the assignment
/// depends only on creation order, so it is idempotent.
pub fn check_and_fix_positions(tasks: &mut [Task]) -> Vec<(String, f64)> {
    if !needs_repair(tasks) {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&i, &j| {
        tasks[i]
            .created_at
            .cmp(&tasks[j].created_at)
            .then_with(|| tasks[i].id.cmp(&tasks[j].id))
    });

    let mut changed = Vec::new();
    for (idx, key) in order.into_iter().zip(spaced_keys(tasks.len())) {
        if tasks[idx].position != key {
            tasks[idx].position = key;
            changed.push((tasks[idx].id.clone(), key));
        }
    }
    changed
}

/// Renumber at even spacing following an explicit display sequence instead
/// of creation order. Used when a drag exhausts the local key gap: the
/// user's just-expressed order must survive the renumbering.
pub fn renumber_sequence(tasks: &mut [Task], order: &[usize]) -> Vec<(String, f64)> {
    let mut changed = Vec::new();
    for (&idx, key) in order.iter().zip(spaced_keys(order.len())) {
        if tasks[idx].position != key {
            tasks[idx].position = key;
            changed.push((tasks[idx].id.clone(), key));
        }
    }
    changed
}
