//! Shared state models that keep the planner page consistent with the backend.

use std::time::Instant;

use chrono::NaiveDate;
use once_cell::unsync::OnceCell;
use planboard_core::canonical::{bucket, upcoming, DateIndex};
use planboard_core::model::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InitialLoad,
    Ready,
    /// Navigation-driven reload of a single goal.
    Loading { goal_id: String },
}

/// Route rewrites issued by the planner. Consumers apply them without adding history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    Replace(Option<String>),
}

impl NavigationRequest {
    pub fn target(&self) -> Option<&str> {
        match self {
            NavigationRequest::Replace(target) => target.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePhase {
    Idle,
    ConfirmPending { goal_id: String },
    Deleting { goal_id: String },
    Refreshing,
}

impl DeletePhase {
    /// Text of the blocking overlay, when one is shown.
    pub fn overlay(&self) -> Option<&'static str> {
        match self {
            DeletePhase::Deleting { .. } => Some("Deleting goal..."),
            DeletePhase::Refreshing => Some("Refreshing goals..."),
            DeletePhase::Idle | DeletePhase::ConfirmPending { .. } => None,
        }
    }
}

/// The flat task collection plus its per-day projection, rebuilt lazily per version.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    version: u64,
    index: OnceCell<(u64, DateIndex)>,
}

impl TaskBoard {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn index(&self) -> &DateIndex {
        let (built_for, index) = self
            .index
            .get_or_init(|| (self.version, bucket(&self.tasks)));
        debug_assert_eq!(*built_for, self.version);
        index
    }

    pub fn upcoming(&self, today: NaiveDate, limit: usize) -> Vec<Task> {
        upcoming(&self.tasks, today, limit)
    }

    pub(crate) fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.invalidate();
    }

    pub(crate) fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub(crate) fn set_status(&mut self, task_id: &str, status: TaskStatus) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return false;
        };
        task.status = status;
        self.invalidate();
        true
    }

    fn invalidate(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.index = OnceCell::new();
    }
}

#[derive(Debug, Clone)]
pub struct StatusToast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    ToggleStatus {
        goal_id: String,
        task_id: String,
        status: TaskStatus,
    },
    DeleteGoal {
        goal_id: String,
    },
}

impl MutationKind {
    pub fn label(&self) -> &'static str {
        match self {
            MutationKind::ToggleStatus { .. } => "update task status",
            MutationKind::DeleteGoal { .. } => "delete goal",
        }
    }
}
