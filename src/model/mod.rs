pub mod task;

pub use task::{SortMode, Subtask, Task, Urgency};
