use crate::model::task::Task;
use crate::store::{StoreError, TaskStore};

/// In-memory store. Backs unit tests and doubles as a throwaway backend
/// when no file path is given.
#[derive(Debug, Default)]
pub struct MemStore {
    rows: Vec<Task>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing rows (test fixtures, migrations).
    pub fn with_rows(rows: Vec<Task>) -> Self {
        MemStore { rows }
    }

    pub fn rows(&self) -> &[Task] {
        &self.rows
    }
}

impl TaskStore for MemStore {
    fn fetch_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.rows.clone())
    }

    fn insert(&mut self, task: &Task) -> Result<(), StoreError> {
        if self.rows.iter().any(|t| t.id == task.id) {
            return Err(StoreError::Duplicate(task.id.clone()));
        }
        self.rows.push(task.clone());
        Ok(())
    }

    fn update(&mut self, task: &Task) -> Result<(), StoreError> {
        let row = self
            .rows
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| StoreError::NotFound(task.id.clone()))?;
        *row = task.clone();
        Ok(())
    }

    fn update_position(&mut self, id: &str, position: f64) -> Result<(), StoreError> {
        let row = self
            .rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.position = position;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.rows.len();
        self.rows.retain(|t| t.id != id);
        if self.rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Urgency;

    #[test]
    fn insert_fetch_update_remove() {
        let mut store = MemStore::new();
        let mut task = Task::new("one".into(), Urgency::Low);
        task.position = 1000.0;

        store.insert(&task).unwrap();
        assert!(matches!(
            store.insert(&task),
            Err(StoreError::Duplicate(_))
        ));

        store.update_position(&task.id, 500.0).unwrap();
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows[0].position, 500.0);

        store.remove(&task.id).unwrap();
        assert!(matches!(
            store.remove(&task.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn update_position_unknown_id_errors() {
        let mut store = MemStore::new();
        assert!(matches!(
            store.update_position("nope", 1.0),
            Err(StoreError::NotFound(_))
        ));
    }
}
