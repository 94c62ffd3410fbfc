use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Registry shared between the presentation layer and the timer controller.
pub type SharedTaskRegistry = Arc<Mutex<TaskRegistry>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Number of focus intervals completed while this task was active.
    pub session_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Ordered list of tasks plus the nullable active-task reference.
///
/// The registry owns every `Task`; the timer only ever sees the active id.
/// Removing the active task clears the reference so it can never dangle.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    active_task_id: Option<String>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task. Blank or whitespace-only text is silently rejected.
    /// The first task added while no active task is set becomes active.
    pub fn add(&mut self, text: &str) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let task = Task {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            session_count: 0,
            created_at: Utc::now(),
        };
        if self.active_task_id.is_none() {
            self.active_task_id = Some(task.id.clone());
        }
        self.tasks.push(task);
        self.tasks.last()
    }

    /// Flip the completed flag. Unknown ids are ignored.
    pub fn toggle_completed(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Delete a task. If it was the active task the reference is cleared,
    /// not left pointing at a dead id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() < before;
        if removed && self.active_task_id.as_deref() == Some(id) {
            self.active_task_id = None;
        }
        removed
    }

    /// Select the task credited with completed focus sessions.
    /// Unknown ids are ignored.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.tasks.iter().any(|t| t.id == id) {
            self.active_task_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Credit one completed focus session. Called by the timer controller
    /// when a focus countdown expires; unknown ids are ignored.
    pub fn increment_sessions(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.session_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    pub fn active_task(&self) -> Option<&Task> {
        let id = self.active_task_id.as_deref()?;
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }
}

/// Fresh registry behind the shared handle the controller expects.
pub fn shared_registry() -> SharedTaskRegistry {
    Arc::new(Mutex::new(TaskRegistry::new()))
}
