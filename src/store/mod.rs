//! The task store collaborator: persistence behind a narrow trait.
//!
//! The ordering coordinator treats the store as a dumb row sink. There is
//! no transaction spanning multiple calls; a batch of position updates is
//! N independent writes, and a failure on one row never blocks the rest.

use std::path::PathBuf;

use crate::model::task::Task;

pub mod json;
pub mod mem;

pub use json::JsonStore;
pub use mem::MemStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no task with id {0}")]
    NotFound(String),
    #[error("task {0} already exists")]
    Duplicate(String),
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse task file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal persistence contract the ordering core needs.
///
/// Row order as returned by `fetch_all` carries no meaning; the coordinator
/// re-sorts by position key. `update_position` is a single-field write so
/// a drag touches exactly one row.
pub trait TaskStore {
    fn fetch_all(&self) -> Result<Vec<Task>, StoreError>;
    fn insert(&mut self, task: &Task) -> Result<(), StoreError>;
    fn update(&mut self, task: &Task) -> Result<(), StoreError>;
    fn update_position(&mut self, id: &str, position: f64) -> Result<(), StoreError>;
    fn remove(&mut self, id: &str) -> Result<(), StoreError>;
}
