use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::task::Task;
use crate::store::{StoreError, TaskStore};

/// File-backed store: one JSON array of task records, rewritten atomically
/// (temp file + rename) on every mutation. A missing file is an empty
/// collection, matching the original client's empty local storage.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_rows(&self) -> Result<Vec<Task>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_rows(&self, rows: &[Task]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(rows)?;
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        std::io::Write::write_all(&mut tmp, content.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }
}

impl TaskStore for JsonStore {
    fn fetch_all(&self) -> Result<Vec<Task>, StoreError> {
        self.read_rows()
    }

    fn insert(&mut self, task: &Task) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        if rows.iter().any(|t| t.id == task.id) {
            return Err(StoreError::Duplicate(task.id.clone()));
        }
        rows.push(task.clone());
        self.write_rows(&rows)
    }

    fn update(&mut self, task: &Task) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        let row = rows
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| StoreError::NotFound(task.id.clone()))?;
        *row = task.clone();
        self.write_rows(&rows)
    }

    fn update_position(&mut self, id: &str, position: f64) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        let row = rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.position = position;
        self.write_rows(&rows)
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        let before = rows.len();
        rows.retain(|t| t.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::model::task::Urgency;

    fn store_in(dir: &TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("agenda.json"))
    }

    #[test]
    fn missing_file_is_empty_collection() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn insert_and_fetch_round_trip_preserves_fractional_positions() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let mut a = Task::new("primera".into(), Urgency::High);
        a.position = 1000.0;
        let mut b = Task::new("segunda".into(), Urgency::Low);
        // deep midpoint value; must survive the file round trip exactly
        b.position = 1000.0 + 1.0 / 1024.0;

        store.insert(&a).unwrap();
        store.insert(&b).unwrap();

        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 2);
        let back = rows.iter().find(|t| t.id == b.id).unwrap();
        assert_eq!(back.position, 1000.0 + 1.0 / 1024.0);
    }

    #[test]
    fn update_position_touches_one_row() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let mut a = Task::new("a".into(), Urgency::Medium);
        a.position = 1000.0;
        let mut b = Task::new("b".into(), Urgency::Medium);
        b.position = 2000.0;
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();

        store.update_position(&a.id, 2500.0).unwrap();
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.iter().find(|t| t.id == a.id).unwrap().position, 2500.0);
        assert_eq!(rows.iter().find(|t| t.id == b.id).unwrap().position, 2000.0);
    }

    #[test]
    fn remove_unknown_id_errors() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(store.remove("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not json {{{").unwrap();
        assert!(matches!(store.fetch_all(), Err(StoreError::Parse(_))));
    }
}
