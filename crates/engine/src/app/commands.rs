//! Async adapters that map planner intents into API calls.

use std::time::Duration;

use planboard_client::PlannerApi;
use planboard_core::model::TaskStatus;
use planboard_core::Session;

use crate::app::aggregation::load_all;
use crate::app::message::{Effect, Message};

pub(crate) fn load_all_command(api: PlannerApi, session: Session) -> Effect {
    Effect::perform(
        async move { load_all(&api, &session).await },
        Message::CollectionsLoaded,
    )
}

pub(crate) fn goal_detail_command(
    api: PlannerApi,
    session: Session,
    epoch: u64,
    goal_id: String,
) -> Effect {
    let requested = goal_id.clone();
    Effect::perform(
        async move { api.goal_detail(&session, &requested).await },
        move |result| Message::GoalDetailLoaded {
            epoch,
            goal_id,
            result,
        },
    )
}

pub(crate) fn goal_tasks_command(
    api: PlannerApi,
    session: Session,
    epoch: u64,
    goal_id: String,
) -> Effect {
    let requested = goal_id.clone();
    Effect::perform(
        async move { api.goal_tasks(&session, &requested).await },
        move |result| Message::TasksLoaded {
            epoch,
            goal_id,
            result,
        },
    )
}

pub(crate) fn goal_list_command(api: PlannerApi, session: Session, epoch: u64) -> Effect {
    Effect::perform(
        async move { api.list_goals(&session).await },
        move |result| Message::GoalsLoaded { epoch, result },
    )
}

pub(crate) fn status_command(
    api: PlannerApi,
    session: Session,
    epoch: u64,
    goal_id: String,
    task_id: String,
    status: TaskStatus,
) -> Effect {
    let (goal, task) = (goal_id.clone(), task_id.clone());
    Effect::perform(
        async move {
            api.update_task_status(&session, &goal, &task, status)
                .await
                .map(|_| ())
        },
        move |result| Message::StatusUpdated {
            epoch,
            goal_id,
            task_id,
            status,
            result,
        },
    )
}

pub(crate) fn delete_command(api: PlannerApi, session: Session, goal_id: String) -> Effect {
    let requested = goal_id.clone();
    Effect::perform(
        async move { api.delete_goal(&session, &requested).await },
        move |result| Message::GoalDeleted { goal_id, result },
    )
}

pub(crate) fn refresh_goals_command(api: PlannerApi, session: Session) -> Effect {
    Effect::perform(
        async move { api.list_goals(&session).await },
        Message::GoalsRefreshed,
    )
}

pub(crate) fn settle_command(delay: Duration) -> Effect {
    Effect::perform(tokio::time::sleep(delay), |_| Message::RefreshSettled)
}
