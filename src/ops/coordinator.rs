//! The ordering coordinator: owns the task collection, assigns position
//! keys, and keeps the in-memory state and the store converging.
//!
//! All mutation goes through coordinator methods. Writes are optimistic:
//! memory changes first, then the store. A failed write is never rolled
//! back; the row is marked dirty and the error surfaced so the caller can
//! retry (`retry_dirty`) or warn.
//!
//! Known limitation, inherited by design: nothing here reconciles two
//! sessions writing positions to the same rows concurrently. Colliding
//! keys from another device sit in the store until the next load, whose
//! repair pass renumbers the whole collection.

use crate::model::task::{SortMode, Task, Urgency};
use crate::ops::ordering::{check_and_fix_positions, renumber_sequence, sorted_view};
use crate::ops::position::{BASE_GAP, allocate};
use crate::store::{StoreError, TaskStore};

/// Error type for coordinator operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task text cannot be empty")]
    EmptyText,
    #[error("manual reordering is only available in manual sort mode")]
    ManualOrderDisabled,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a drag operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reorder {
    /// The moved task received a fresh midpoint key; one row was written.
    Moved { position: f64 },
    /// The target gap was exhausted (or neighbors collided), so the whole
    /// sequence was renumbered at even spacing, preserving the drag.
    /// Rows listed in `failed` did not persist and are marked dirty.
    Renumbered { failed: Vec<String> },
    /// Unknown id, or the task was dropped onto itself. Nothing changed.
    Ignored,
}

/// What the load-time repair pass did.
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    /// How many rows received a new position
    pub renumbered: usize,
    /// Rows whose new position could not be persisted (marked dirty)
    pub failed: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.renumbered == 0 && self.failed.is_empty()
    }
}

/// Owns the task collection and the store handle; the only mutation path.
pub struct Coordinator<S: TaskStore> {
    tasks: Vec<Task>,
    mode: SortMode,
    store: S,
    /// Bumped on every collection mutation. Lets embedders detect that the
    /// collection changed under them across an async boundary.
    revision: u64,
}

impl<S: TaskStore> Coordinator<S> {
    /// Fetch the full collection and run the self-healing repair pass.
    ///
    /// Repaired positions are persisted row by row; a failed row is marked
    /// dirty and reported, never blocking the remaining rows.
    pub fn load(store: S) -> Result<(Self, RepairReport), StoreError> {
        let tasks = store.fetch_all()?;
        let mut coord = Coordinator {
            tasks,
            mode: SortMode::default(),
            store,
            revision: 0,
        };

        let changed = check_and_fix_positions(&mut coord.tasks);
        let renumbered = changed.len();
        let failed = coord.persist_positions(&changed);
        if renumbered > 0 {
            coord.revision += 1;
        }
        Ok((coord, RepairReport { renumbered, failed }))
    }

    // --- accessors ---

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a (possibly abbreviated) id: exact match first, then a
    /// unique prefix. Ambiguous prefixes resolve to nothing.
    pub fn resolve_id(&self, prefix: &str) -> Option<&Task> {
        if let Some(t) = self.get(prefix) {
            return Some(t);
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(t), None) => Some(t),
            _ => None,
        }
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SortMode) {
        self.mode = mode;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The displayed sequence under the active sort mode.
    pub fn sorted(&self) -> Vec<&Task> {
        sorted_view(&self.tasks, self.mode)
            .into_iter()
            .map(|i| &self.tasks[i])
            .collect()
    }

    /// Ids of rows whose last write failed and is awaiting retry.
    pub fn dirty_ids(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.dirty)
            .map(|t| t.id.clone())
            .collect()
    }

    // --- mutations ---

    /// Create a task at the head of manual order.
    ///
    /// The new key is half the current minimum, so no existing row needs
    /// touching. An unmigrated collection (minimum <= 0) gets the baseline
    /// key; the repair pass on next load sorts that out.
    ///
    /// When the head slot is exhausted the existing rows are respaced
    /// first. Respaced rows whose writes fail are marked dirty (see
    /// [`Self::dirty_ids`]); only a failure on the new row itself errors.
    pub fn add_task(&mut self, text: &str, urgency: Urgency) -> Result<&Task, OrderError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(OrderError::EmptyText);
        }

        let min_pos = self
            .tasks
            .iter()
            .map(|t| t.position)
            .min_by(f64::total_cmp);
        let position = match min_pos {
            None => BASE_GAP,
            Some(min) if min > 0.0 => match allocate(None, Some(min)) {
                Some(p) => p,
                None => {
                    // Head slot exhausted by repeated insertion; respace the
                    // current manual sequence, then take half the new head.
                    let order = sorted_view(&self.tasks, SortMode::Manual);
                    let changed = renumber_sequence(&mut self.tasks, &order);
                    self.persist_positions(&changed);
                    BASE_GAP / 2.0
                }
            },
            Some(_) => BASE_GAP,
        };

        let mut task = Task::new(text.to_string(), urgency);
        task.position = position;
        let insert_result = self.store.insert(&task);
        if insert_result.is_err() {
            task.mark_dirty();
        }
        self.tasks.push(task);
        self.revision += 1;
        let idx = self.tasks.len() - 1;

        insert_result?;
        Ok(&self.tasks[idx])
    }

    /// Handle a drag of `moved_id` onto `target_id`.
    ///
    /// The move is computed against the *displayed* sequence: the moved
    /// task is spliced out and reinserted at the target's display index,
    /// and its new key is the midpoint of its new display neighbors.
    /// Exactly one row is written on the normal path.
    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> Result<Reorder, OrderError> {
        if self.mode != SortMode::Manual {
            return Err(OrderError::ManualOrderDisabled);
        }
        if moved_id == target_id {
            return Ok(Reorder::Ignored);
        }

        let mut seq = sorted_view(&self.tasks, self.mode);
        let Some(from) = seq.iter().position(|&i| self.tasks[i].id == moved_id) else {
            return Ok(Reorder::Ignored);
        };
        let Some(to) = seq.iter().position(|&i| self.tasks[i].id == target_id) else {
            return Ok(Reorder::Ignored);
        };

        // Splice-move within the displayed sequence, then read the new
        // neighbors off the spliced list.
        let moved = seq.remove(from);
        seq.insert(to, moved);
        let prev = (to > 0).then(|| self.tasks[seq[to - 1]].position);
        let next = seq.get(to + 1).map(|&i| self.tasks[i].position);

        match allocate(prev, next) {
            Some(position) => {
                self.tasks[moved].position = position;
                self.revision += 1;
                match self.store.update_position(moved_id, position) {
                    Ok(()) => {
                        self.tasks[moved].dirty = false;
                        Ok(Reorder::Moved { position })
                    }
                    Err(e) => {
                        self.tasks[moved].mark_dirty();
                        Err(e.into())
                    }
                }
            }
            None => {
                // Gap exhausted or neighbors collided: respace the spliced
                // sequence so the drag still lands where the user put it.
                let changed = renumber_sequence(&mut self.tasks, &seq);
                self.revision += 1;
                let failed = self.persist_positions(&changed);
                Ok(Reorder::Renumbered { failed })
            }
        }
    }

    /// Flip a task's completed flag.
    pub fn toggle(&mut self, id: &str) -> Result<bool, OrderError> {
        let idx = self.index_of(id)?;
        self.tasks[idx].completed = !self.tasks[idx].completed;
        self.revision += 1;
        let completed = self.tasks[idx].completed;
        self.persist_row(idx)?;
        Ok(completed)
    }

    /// Update text and/or urgency.
    pub fn edit(
        &mut self,
        id: &str,
        text: Option<&str>,
        urgency: Option<Urgency>,
    ) -> Result<(), OrderError> {
        let idx = self.index_of(id)?;
        if let Some(text) = text {
            let text = text.trim();
            if text.is_empty() {
                return Err(OrderError::EmptyText);
            }
            self.tasks[idx].text = text.to_string();
        }
        if let Some(urgency) = urgency {
            self.tasks[idx].urgency = urgency;
        }
        self.revision += 1;
        self.persist_row(idx)
    }

    pub fn set_due_date(
        &mut self,
        id: &str,
        due: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<(), OrderError> {
        let idx = self.index_of(id)?;
        self.tasks[idx].due_date = due;
        self.revision += 1;
        self.persist_row(idx)
    }

    pub fn set_category(&mut self, id: &str, category: Option<String>) -> Result<(), OrderError> {
        let idx = self.index_of(id)?;
        self.tasks[idx].category = category;
        self.revision += 1;
        self.persist_row(idx)
    }

    /// Delete a task outright. No tombstones.
    pub fn remove(&mut self, id: &str) -> Result<(), OrderError> {
        let idx = self.index_of(id)?;
        self.tasks.remove(idx);
        self.revision += 1;
        self.store.remove(id)?;
        Ok(())
    }

    /// Delete every completed task. Each store removal is independent; a
    /// failure leaves that row deleted in memory only and is returned.
    pub fn remove_completed(&mut self) -> (usize, Vec<String>) {
        let ids: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id.clone())
            .collect();
        if ids.is_empty() {
            return (0, Vec::new());
        }

        self.tasks.retain(|t| !t.completed);
        self.revision += 1;
        let mut failed = Vec::new();
        for id in &ids {
            if self.store.remove(id).is_err() {
                failed.push(id.clone());
            }
        }
        (ids.len(), failed)
    }

    /// Delete everything.
    pub fn clear(&mut self) -> (usize, Vec<String>) {
        let ids: Vec<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        self.tasks.clear();
        if !ids.is_empty() {
            self.revision += 1;
        }
        let mut failed = Vec::new();
        for id in &ids {
            if self.store.remove(id).is_err() {
                failed.push(id.clone());
            }
        }
        (ids.len(), failed)
    }

    /// Re-issue the write for every dirty row. Returns the ids still dirty
    /// afterwards (empty means memory and store agree again).
    pub fn retry_dirty(&mut self) -> Vec<String> {
        let mut still_dirty = Vec::new();
        for idx in 0..self.tasks.len() {
            if !self.tasks[idx].dirty {
                continue;
            }
            // The row may have never reached the store at all (failed
            // insert), so fall back to insert when update says unknown.
            let task = self.tasks[idx].clone();
            let result = match self.store.update(&task) {
                Err(StoreError::NotFound(_)) => self.store.insert(&task),
                other => other,
            };
            match result {
                Ok(()) => self.tasks[idx].dirty = false,
                Err(_) => still_dirty.push(task.id),
            }
        }
        still_dirty
    }

    // --- helpers ---

    fn index_of(&self, id: &str) -> Result<usize, OrderError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Persist one full row; on failure keep the optimistic change, mark
    /// the row dirty, and surface the error.
    fn persist_row(&mut self, idx: usize) -> Result<(), OrderError> {
        let task = self.tasks[idx].clone();
        match self.store.update(&task) {
            Ok(()) => {
                self.tasks[idx].dirty = false;
                Ok(())
            }
            Err(e) => {
                self.tasks[idx].mark_dirty();
                Err(e.into())
            }
        }
    }

    /// Write a batch of position changes, each independently. Failed rows
    /// are marked dirty and their ids returned.
    fn persist_positions(&mut self, changed: &[(String, f64)]) -> Vec<String> {
        let mut failed = Vec::new();
        for (id, position) in changed {
            match self.store.update_position(id, *position) {
                Ok(()) => {
                    if let Some(t) = self.tasks.iter_mut().find(|t| t.id == *id) {
                        t.dirty = false;
                    }
                }
                Err(_) => {
                    if let Some(t) = self.tasks.iter_mut().find(|t| t.id == *id) {
                        t.mark_dirty();
                    }
                    failed.push(id.clone());
                }
            }
        }
        failed
    }
}
