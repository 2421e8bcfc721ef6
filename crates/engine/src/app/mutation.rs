//! Task status toggles and the goal deletion state machine.

use planboard_client::FetchFailure;
use planboard_core::model::{Goal, PlanningItem, TaskStatus};
use tracing::{debug, info, warn};

use crate::app::commands::{delete_command, refresh_goals_command, settle_command, status_command};
use crate::app::message::Effect;
use crate::app::planner::Planner;
use crate::app::state::{DeletePhase, MutationKind, ToastKind};
use crate::telemetry::Event as TelemetryEvent;

impl Planner {
    pub(crate) fn request_status_toggle(&mut self, goal_id: String, task_id: String) -> Effect {
        let Some(task) = self.board.find(&task_id) else {
            warn!(task_id = %task_id, "toggle requested for a task that is not shown");
            return Effect::none();
        };
        let status = task.status.toggled();
        if !self.pending_toggles.insert(task_id.clone()) {
            debug!(task_id = %task_id, "status update already pending");
            return Effect::none();
        }
        status_command(
            self.api.clone(),
            self.session.clone(),
            self.epoch,
            goal_id,
            task_id,
            status,
        )
    }

    pub(crate) fn finish_status_toggle(
        &mut self,
        epoch: u64,
        goal_id: String,
        task_id: String,
        status: TaskStatus,
        result: Result<(), FetchFailure>,
    ) -> Effect {
        self.pending_toggles.remove(&task_id);
        let kind = MutationKind::ToggleStatus {
            goal_id,
            task_id: task_id.clone(),
            status,
        };
        if result.is_ok() {
            if epoch == self.epoch {
                self.board.set_status(&task_id, status);
            } else {
                debug!(task_id = %task_id, "selection moved on; status confirmed but not shown");
            }
        }
        self.finish_mutation(kind, result);
        Effect::none()
    }

    pub(crate) fn request_delete(&mut self, goal_id: String) -> Effect {
        if self.delete != DeletePhase::Idle {
            debug!(phase = ?self.delete, "deletion already under way");
            return Effect::none();
        }
        self.delete = DeletePhase::ConfirmPending { goal_id };
        Effect::none()
    }

    pub(crate) fn cancel_delete(&mut self) -> Effect {
        if let DeletePhase::ConfirmPending { .. } = self.delete {
            self.delete = DeletePhase::Idle;
        }
        Effect::none()
    }

    pub(crate) fn confirm_delete(&mut self) -> Effect {
        let DeletePhase::ConfirmPending { goal_id } = &self.delete else {
            debug!("no deletion awaiting confirmation");
            return Effect::none();
        };
        let goal_id = goal_id.clone();
        info!(goal_id = %goal_id, "deleting goal");
        self.delete = DeletePhase::Deleting {
            goal_id: goal_id.clone(),
        };
        delete_command(self.api.clone(), self.session.clone(), goal_id)
    }

    pub(crate) fn finish_delete(
        &mut self,
        goal_id: String,
        result: Result<(), FetchFailure>,
    ) -> Effect {
        let kind = MutationKind::DeleteGoal {
            goal_id: goal_id.clone(),
        };
        if result.is_err() {
            self.delete = DeletePhase::Idle;
            self.finish_mutation(kind, result);
            return Effect::none();
        }

        self.finish_mutation(kind, result);
        self.clear_active();
        self.collections.goals.retain(|goal| goal.id != goal_id);
        self.delete = DeletePhase::Refreshing;
        refresh_goals_command(self.api.clone(), self.session.clone())
    }

    pub(crate) fn handle_goals_refreshed(&mut self, result: Result<Vec<Goal>, FetchFailure>) -> Effect {
        match result {
            Ok(goals) => self.collections.goals = goals,
            Err(failure) => {
                warn!(error = %failure, "goal list refresh after delete failed");
            }
        }
        settle_command(self.options.refresh_settle)
    }

    pub(crate) fn handle_refresh_settled(&mut self) -> Effect {
        if self.delete != DeletePhase::Refreshing {
            return Effect::none();
        }
        self.delete = DeletePhase::Idle;
        match self.collections.goals.first().cloned() {
            Some(goal) => self.activate(PlanningItem::Goal(goal)),
            None => {
                self.replace_route(None);
                Effect::none()
            }
        }
    }

    pub(crate) fn finish_mutation(&mut self, kind: MutationKind, result: Result<(), FetchFailure>) {
        match &result {
            Ok(()) => {
                self.telemetry
                    .record(TelemetryEvent::MutationApplied(kind.label().into()));
                let message = match &kind {
                    MutationKind::ToggleStatus { status, .. } => {
                        format!("Task marked {}", status)
                    }
                    MutationKind::DeleteGoal { .. } => "Goal deleted".to_string(),
                };
                self.show_toast(message, ToastKind::Info);
            }
            Err(failure) => {
                warn!(action = kind.label(), error = %failure, "mutation failed");
                self.telemetry.record(TelemetryEvent::MutationFailed {
                    action: kind.label().into(),
                    error: failure.to_string(),
                });
                self.show_toast(
                    format!("Failed to {}: {}", kind.label(), failure),
                    ToastKind::Error,
                );
            }
        }
        self.last_mutation = Some((kind, result.is_ok()));
    }
}
