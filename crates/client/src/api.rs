//! Typed wrappers over the planner REST endpoints.

use planboard_core::input::{GoalInput, HabitInput, InputError, ReminderInput};
use planboard_core::model::{Goal, Habit, Reminder, TaskStatus};
use planboard_core::Session;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::fetcher::{FetchFailure, Fetcher, Method};

#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
}

/// Endpoint paths relative to the API base.
pub mod endpoints {
    use planboard_core::Session;

    pub fn goals(session: &Session) -> String {
        format!("{}/goal_breakdown_all", session.user_path())
    }

    /// Collection that accepts new goals.
    pub fn goal_breakdown(session: &Session) -> String {
        format!("{}/goal_breakdown", session.user_path())
    }

    pub fn goal(session: &Session, goal_id: &str) -> String {
        format!("{}/goal_breakdown/{}", session.user_path(), goal_id)
    }

    pub fn goal_tasks(session: &Session, goal_id: &str) -> String {
        format!("{}/tasks", goal(session, goal_id))
    }

    pub fn goal_task(session: &Session, goal_id: &str, task_id: &str) -> String {
        format!("{}/{}", goal_tasks(session, goal_id), task_id)
    }

    pub fn reminders(session: &Session) -> String {
        format!("{}/article_reminders", session.user_path())
    }

    pub fn habits(session: &Session) -> String {
        format!("{}/habit_building", session.user_path())
    }
}

#[derive(Debug, Clone)]
pub struct PlannerApi {
    fetcher: Fetcher,
}

impl PlannerApi {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub async fn list_goals(&self, session: &Session) -> Result<Vec<Goal>, FetchFailure> {
        let value = self.get(&endpoints::goals(session)).await?;
        Ok(decode_collection(&value, "goals"))
    }

    pub async fn goal_detail(&self, session: &Session, goal_id: &str) -> Result<Goal, FetchFailure> {
        let value = self.get(&endpoints::goal(session, goal_id)).await?;
        let mut goal = match serde_json::from_value::<Goal>(value) {
            Ok(goal) => goal,
            Err(err) => {
                warn!(goal_id, error = %err, "goal detail has unexpected shape");
                Goal::default()
            }
        };
        // The detail endpoint does not echo the id back.
        if goal.id.is_empty() {
            goal.id = goal_id.to_string();
        }
        Ok(goal)
    }

    /// Raw task records of one goal, ready for canonicalization.
    pub async fn goal_tasks(
        &self,
        session: &Session,
        goal_id: &str,
    ) -> Result<Vec<Value>, FetchFailure> {
        let value = self.get(&endpoints::goal_tasks(session, goal_id)).await?;
        match value.get("tasks") {
            Some(Value::Array(tasks)) => Ok(tasks.clone()),
            _ => {
                warn!(goal_id, "tasks response missing `tasks` array");
                Ok(Vec::new())
            }
        }
    }

    pub async fn update_task_status(
        &self,
        session: &Session,
        goal_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Value, FetchFailure> {
        let body = json!({ "status": status.as_str() });
        self.fetcher
            .request(
                &endpoints::goal_task(session, goal_id, task_id),
                Method::Patch,
                Some(&body),
            )
            .await
    }

    pub async fn delete_goal(&self, session: &Session, goal_id: &str) -> Result<(), FetchFailure> {
        self.fetcher
            .request(&endpoints::goal(session, goal_id), Method::Delete, None)
            .await
            .map(|_| ())
    }

    pub async fn list_reminders(&self, session: &Session) -> Result<Vec<Reminder>, FetchFailure> {
        let value = self.get(&endpoints::reminders(session)).await?;
        Ok(decode_collection(&value, "reminders"))
    }

    pub async fn list_habits(&self, session: &Session) -> Result<Vec<Habit>, FetchFailure> {
        let value = self.get(&endpoints::habits(session)).await?;
        Ok(decode_collection(&value, "habits"))
    }

    /// Returns the id the backend assigned, when it reports one.
    pub async fn create_goal(
        &self,
        session: &Session,
        input: &GoalInput,
    ) -> Result<Option<String>, CreateError> {
        let payload = input.to_payload()?;
        let value = self
            .fetcher
            .request(&endpoints::goal_breakdown(session), Method::Post, Some(&payload))
            .await?;
        Ok(created_id(&value))
    }

    pub async fn create_reminder(
        &self,
        session: &Session,
        input: &ReminderInput,
    ) -> Result<Option<String>, CreateError> {
        let payload = input.to_payload()?;
        let value = self
            .fetcher
            .request(&endpoints::reminders(session), Method::Post, Some(&payload))
            .await?;
        Ok(created_id(&value))
    }

    pub async fn create_habit(
        &self,
        session: &Session,
        input: &HabitInput,
    ) -> Result<Option<String>, CreateError> {
        let payload = input.to_payload()?;
        let value = self
            .fetcher
            .request(&endpoints::habits(session), Method::Post, Some(&payload))
            .await?;
        Ok(created_id(&value))
    }

    async fn get(&self, path: &str) -> Result<Value, FetchFailure> {
        self.fetcher.request(path, Method::Get, None).await
    }
}

fn decode_collection<T: DeserializeOwned>(envelope: &Value, field: &str) -> Vec<T> {
    let Some(items) = envelope.get(field).and_then(Value::as_array) else {
        warn!(field, "response missing collection field");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(field, error = %err, "skipping malformed item");
                None
            }
        })
        .collect()
}

fn created_id(value: &Value) -> Option<String> {
    value
        .get("id")
        .or_else(|| value.get("habit_id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
