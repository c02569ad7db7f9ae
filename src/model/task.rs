use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task urgency level, totally ordered: high > medium > low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Sort weight (higher sorts first under urgency mode)
    pub fn weight(self) -> u8 {
        match self {
            Urgency::High => 3,
            Urgency::Medium => 2,
            Urgency::Low => 1,
        }
    }

    /// Parse a user-facing urgency name
    pub fn from_name(s: &str) -> Option<Urgency> {
        match s {
            "high" => Some(Urgency::High),
            "medium" => Some(Urgency::Medium),
            "low" => Some(Urgency::Low),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

/// The active sort mode for the displayed list.
///
/// Manual drag-reordering is only enabled under `Manual`; the other modes
/// derive their order from task fields and fall back to the manual order
/// for ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Manual,
    Urgency,
    Time,
}

impl SortMode {
    pub fn from_name(s: &str) -> Option<SortMode> {
        match s {
            "manual" => Some(SortMode::Manual),
            "urgency" => Some(SortMode::Urgency),
            "time" => Some(SortMode::Time),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortMode::Manual => "manual",
            SortMode::Urgency => "urgency",
            SortMode::Time => "time",
        }
    }
}

/// A subtask line item. Opaque to the ordering core; carried through
/// reorders and repairs untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// A single task record.
///
/// Serialized camelCase with millisecond timestamps so records round-trip
/// the stored JSON of the original web client. `position` must serialize as
/// a JSON number: the midpoint allocation scheme relies on fractional values
/// surviving persistence without rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique id, assigned at creation, never changes
    pub id: String,
    /// Display text
    pub text: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub completed: bool,
    /// Manual ordering key, ascending. Fractional by design; 0 marks a
    /// legacy record that has not been migrated yet.
    #[serde(default)]
    pub position: f64,
    /// Creation time, immutable. Fallback ordering key and the basis for
    /// legacy-repair renumbering.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_habit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,

    /// Set when an optimistic in-memory change failed to persist; cleared
    /// once a retry write succeeds. Never serialized.
    #[serde(skip)]
    pub dirty: bool,
}

impl Task {
    /// Create a new task with a fresh id and the current time.
    /// `position` starts at 0 and is assigned by the coordinator on insert.
    pub fn new(text: String, urgency: Urgency) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            urgency,
            completed: false,
            position: 0.0,
            // Truncate to millisecond precision so the in-memory value is
            // identical to what ts_milliseconds serialization round-trips.
            created_at: DateTime::from_timestamp_millis(Utc::now().timestamp_millis())
                .expect("current time is representable in milliseconds"),
            due_date: None,
            category: None,
            is_habit: false,
            subtasks: Vec::new(),
            dirty: false,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether this task carries a usable manual position key.
    /// Zero, negative, and non-finite values all count as missing: zero is
    /// the unmigrated default, the rest only appear in corrupt data.
    pub fn has_valid_position(&self) -> bool {
        self.position.is_finite() && self.position > 0.0
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.text == other.text
            && self.urgency == other.urgency
            && self.completed == other.completed
            && self.position == other.position
            && self.created_at == other.created_at
            && self.due_date == other.due_date
            && self.category == other.category
            && self.is_habit == other.is_habit
            && self.subtasks == other.subtasks
    }
}
