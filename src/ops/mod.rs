pub mod coordinator;
pub mod ordering;
pub mod position;

pub use coordinator::{Coordinator, OrderError, Reorder, RepairReport};
