//! Message definitions passed around the planner update loop.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use planboard_client::FetchFailure;
use planboard_core::model::{Goal, Selection, TaskStatus};
use serde_json::Value;

use crate::app::aggregation::LoadReport;

#[derive(Debug, Clone)]
pub enum Message {
    /// Page entered, optionally addressed at a goal.
    Mount(Option<String>),
    /// Full re-aggregation of the three collections.
    Reload,
    CollectionsLoaded(LoadReport),
    /// The navigation target changed, possibly because of our own rewrite.
    RouteChanged(Option<String>),
    SelectItem(Selection),
    GoalDetailLoaded {
        epoch: u64,
        goal_id: String,
        result: Result<Goal, FetchFailure>,
    },
    TasksLoaded {
        epoch: u64,
        goal_id: String,
        result: Result<Vec<Value>, FetchFailure>,
    },
    GoalsLoaded {
        epoch: u64,
        result: Result<Vec<Goal>, FetchFailure>,
    },
    ToggleTaskStatus {
        goal_id: String,
        task_id: String,
    },
    StatusUpdated {
        epoch: u64,
        goal_id: String,
        task_id: String,
        status: TaskStatus,
        result: Result<(), FetchFailure>,
    },
    RequestDeleteGoal(String),
    ConfirmDelete,
    CancelDelete,
    GoalDeleted {
        goal_id: String,
        result: Result<(), FetchFailure>,
    },
    GoalsRefreshed(Result<Vec<Goal>, FetchFailure>),
    RefreshSettled,
}

impl Message {
    /// Messages that originate from the user rather than from a completed request.
    pub(crate) fn is_interaction(&self) -> bool {
        matches!(
            self,
            Message::SelectItem(_)
                | Message::RouteChanged(_)
                | Message::ToggleTaskStatus { .. }
                | Message::RequestDeleteGoal(_)
                | Message::Reload
        )
    }
}

/// Pending work produced by one update pass; each future resolves to the next message.
#[must_use]
pub struct Effect {
    futures: Vec<BoxFuture<'static, Message>>,
}

impl Effect {
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    pub fn perform<F, T, M>(future: F, map: M) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        M: FnOnce(T) -> Message + Send + 'static,
    {
        Self {
            futures: vec![future.map(map).boxed()],
        }
    }

    pub fn batch(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            futures: effects
                .into_iter()
                .flat_map(|effect| effect.futures)
                .collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub(crate) fn into_futures(self) -> Vec<BoxFuture<'static, Message>> {
        self.futures
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("pending", &self.futures.len())
            .finish()
    }
}
