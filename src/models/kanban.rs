//! Kanban boards, columns, tasks and comments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Kind of work a board or task tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkCategory {
    Task,
    /// Corrective and preventive action.
    Capa,
    /// Continuous improvement.
    Ci,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub category: Option<WorkCategory>,
    pub created_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub description: String,
    pub priority: Priority,
    /// Id of the column the task sits in. Not checked against existing columns.
    pub status: String,
    pub board_id: String,
    pub category: Option<WorkCategory>,
    pub due_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    pub content: String,
    pub created_at: NaiveDate,
}

/// A column together with the tasks of one board sitting in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub column: Column,
    pub items: Vec<Task>,
}

/// DTO for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub owner: String,
    pub description: String,
    pub priority: Priority,
    pub status: String,
    pub board_id: String,
    pub category: Option<WorkCategory>,
    pub due_date: Option<NaiveDate>,
}

/// DTO for updating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Option<WorkCategory>>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(owner) = self.owner {
            task.owner = owner;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}
