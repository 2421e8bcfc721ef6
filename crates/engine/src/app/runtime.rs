//! Single-task effect driver plus async conveniences for callers without their own loop.

use futures::stream::{FuturesUnordered, StreamExt};
use planboard_core::model::Selection;

use crate::app::message::{Effect, Message};
use crate::app::planner::Planner;
use crate::app::state::MutationKind;

impl Planner {
    /// Poll every outstanding future, feeding each resulting message back through
    /// [`Planner::react`], until no work remains.
    pub async fn drive(&mut self, effect: Effect) {
        let mut pending: FuturesUnordered<_> = effect.into_futures().into_iter().collect();
        while let Some(message) = pending.next().await {
            let next = self.react(message);
            pending.extend(next.into_futures());
        }
    }

    pub async fn dispatch(&mut self, message: Message) {
        let effect = self.react(message);
        self.drive(effect).await;
    }

    pub async fn mount(&mut self, route: Option<String>) {
        self.dispatch(Message::Mount(route)).await;
    }

    pub async fn reload(&mut self) {
        self.dispatch(Message::Reload).await;
    }

    pub async fn select(&mut self, selection: Selection) {
        self.dispatch(Message::SelectItem(selection)).await;
    }

    pub async fn navigate(&mut self, route: Option<String>) {
        self.dispatch(Message::RouteChanged(route)).await;
    }

    /// Flip a task between completed and pending. `true` once the backend confirmed it.
    pub async fn toggle_status(&mut self, goal_id: &str, task_id: &str) -> bool {
        self.last_mutation = None;
        self.dispatch(Message::ToggleTaskStatus {
            goal_id: goal_id.to_string(),
            task_id: task_id.to_string(),
        })
        .await;
        matches!(
            &self.last_mutation,
            Some((MutationKind::ToggleStatus { task_id: done, .. }, true)) if done == task_id
        )
    }

    /// Request and immediately confirm deletion of a goal, then run the refresh sequence.
    pub async fn delete_goal(&mut self, goal_id: &str) -> bool {
        self.last_mutation = None;
        self.dispatch(Message::RequestDeleteGoal(goal_id.to_string()))
            .await;
        self.dispatch(Message::ConfirmDelete).await;
        matches!(
            &self.last_mutation,
            Some((MutationKind::DeleteGoal { goal_id: done }, true)) if done == goal_id
        )
    }
}
