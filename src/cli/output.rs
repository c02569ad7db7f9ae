use serde::Serialize;

use crate::model::task::Task;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub urgency: &'static str,
    pub completed: bool,
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TaskJson {
    pub fn from_task(task: &Task) -> Self {
        TaskJson {
            id: task.id.clone(),
            text: task.text.clone(),
            urgency: task.urgency.name(),
            completed: task.completed,
            position: task.position,
            due: task.due_date.map(|d| d.to_rfc3339()),
            category: task.category.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub sort: &'static str,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub percent: u32,
}

// ---------------------------------------------------------------------------
// Human output
// ---------------------------------------------------------------------------

/// Abbreviate an id for display. Generated ids are uuids, but legacy files
/// may carry arbitrary short ids, so this never slices past the end.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

/// One aligned task line: checkbox, short id, urgency, text, extras.
pub fn task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let mut line = format!(
        "[{check}] {}  ({:<6}) {}",
        short_id(&task.id),
        task.urgency.name(),
        task.text
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
    }
    if let Some(category) = &task.category {
        line.push_str(&format!("  #{category}"));
    }
    line
}
