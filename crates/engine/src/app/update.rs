//! Core update loop: aggregation results, selection changes and navigation.

use planboard_client::FetchFailure;
use planboard_core::canonical::normalize;
use planboard_core::model::{Goal, PlanningItem, Selection};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::aggregation::{select_default, LoadReport};
use crate::app::commands::{
    goal_detail_command, goal_list_command, goal_tasks_command, load_all_command,
};
use crate::app::message::{Effect, Message};
use crate::app::planner::Planner;
use crate::app::state::Phase;
use crate::telemetry::Event as TelemetryEvent;

impl Planner {
    pub fn react(&mut self, message: Message) -> Effect {
        self.prune_toast();
        if message.is_interaction() {
            if let Some(overlay) = self.overlay() {
                debug!(overlay, "page locked; ignoring interaction");
                return Effect::none();
            }
        }

        match message {
            Message::Mount(route) => self.mount_page(route),
            Message::Reload => self.reload_collections(),
            Message::CollectionsLoaded(report) => self.handle_collections_loaded(report),
            Message::RouteChanged(route) => self.handle_route_changed(route),
            Message::SelectItem(selection) => self.select_item(selection),
            Message::GoalDetailLoaded {
                epoch,
                goal_id,
                result,
            } => self.handle_goal_detail(epoch, goal_id, result),
            Message::TasksLoaded {
                epoch,
                goal_id,
                result,
            } => self.handle_tasks_loaded(epoch, goal_id, result),
            Message::GoalsLoaded { epoch, result } => self.handle_goals_loaded(epoch, result),
            Message::ToggleTaskStatus { goal_id, task_id } => {
                self.request_status_toggle(goal_id, task_id)
            }
            Message::StatusUpdated {
                epoch,
                goal_id,
                task_id,
                status,
                result,
            } => self.finish_status_toggle(epoch, goal_id, task_id, status, result),
            Message::RequestDeleteGoal(goal_id) => self.request_delete(goal_id),
            Message::ConfirmDelete => self.confirm_delete(),
            Message::CancelDelete => self.cancel_delete(),
            Message::GoalDeleted { goal_id, result } => self.finish_delete(goal_id, result),
            Message::GoalsRefreshed(result) => self.handle_goals_refreshed(result),
            Message::RefreshSettled => self.handle_refresh_settled(),
        }
    }

    fn mount_page(&mut self, route: Option<String>) -> Effect {
        info!(route = ?route, "mounting planner");
        self.telemetry.record(TelemetryEvent::InitialLoadStarted);
        self.route = route;
        self.phase = Phase::InitialLoad;
        self.initial_load_in_progress = true;
        self.aggregate_in_flight = true;
        self.goal_list_in_flight = false;
        self.pending_echoes.clear();
        self.page_error = None;
        load_all_command(self.api.clone(), self.session.clone())
    }

    fn reload_collections(&mut self) -> Effect {
        if self.aggregate_in_flight {
            debug!("aggregate fetch already in flight; relying on it");
            return Effect::none();
        }
        self.aggregate_in_flight = true;
        load_all_command(self.api.clone(), self.session.clone())
    }

    fn handle_collections_loaded(&mut self, report: LoadReport) -> Effect {
        self.aggregate_in_flight = false;
        for (kind, failure) in &report.failures {
            self.telemetry.record(TelemetryEvent::CollectionFailed {
                collection: kind.to_string(),
                error: failure.to_string(),
            });
        }
        self.collections = report.collections;
        self.telemetry.record(TelemetryEvent::CollectionsLoaded {
            goals: self.collections.goals.len(),
            reminders: self.collections.reminders.len(),
            habits: self.collections.habits.len(),
        });

        if self.phase == Phase::InitialLoad {
            self.initial_load_in_progress = false;
            self.phase = Phase::Ready;
            let url_goal = self.route.clone();
            return match select_default(&self.collections, url_goal.as_deref()) {
                Some(item) => self.activate(item),
                None => {
                    if self.route.is_some() {
                        self.replace_route(None);
                    }
                    Effect::none()
                }
            };
        }

        // A later reload keeps the current choice when it still exists, with fresh fields.
        let current = self.selection();
        if let Some(item) = self.collections.find(&current) {
            self.active = Some(item);
            return Effect::none();
        }
        match select_default(&self.collections, None) {
            Some(item) => self.activate(item),
            None => {
                self.clear_active();
                Effect::none()
            }
        }
    }

    fn handle_route_changed(&mut self, route: Option<String>) -> Effect {
        if self.take_echo(&route) {
            debug!(route = ?route, "navigation echo; nothing to load");
            return Effect::none();
        }
        if route == self.route {
            debug!(route = ?route, "route unchanged; nothing to load");
            return Effect::none();
        }
        self.route = route.clone();
        if self.initial_load_in_progress {
            debug!("initial load owns this transition");
            return Effect::none();
        }
        match route {
            Some(goal_id) => self.load_goal(goal_id),
            None => Effect::none(),
        }
    }

    fn select_item(&mut self, selection: Selection) -> Effect {
        if selection == self.selection() {
            return Effect::none();
        }
        match self.collections.find(&selection) {
            Some(item) => self.activate(item),
            None => {
                warn!(selection = ?selection, "selected item is not in the loaded collections");
                Effect::none()
            }
        }
    }

    /// Make `item` the single active item and bring its tasks into view.
    pub(crate) fn activate(&mut self, item: PlanningItem) -> Effect {
        let epoch = self.bump_epoch();
        self.page_error = None;
        if let Phase::Loading { .. } = self.phase {
            self.phase = Phase::Ready;
        }
        self.telemetry.record(TelemetryEvent::SelectionChanged(format!(
            "{}:{}",
            item.kind(),
            item.id()
        )));

        if let PlanningItem::Goal(goal) = &item {
            if self.route.as_deref() != Some(goal.id.as_str()) {
                self.replace_route(Some(goal.id.clone()));
            }
        }

        let effect = match (item.embedded_tasks(), &item) {
            (Some(raw), _) => {
                self.board.replace(normalize(raw));
                Effect::none()
            }
            (None, PlanningItem::Goal(goal)) => {
                self.board.clear();
                goal_tasks_command(
                    self.api.clone(),
                    self.session.clone(),
                    epoch,
                    goal.id.clone(),
                )
            }
            (None, _) => {
                self.board.clear();
                Effect::none()
            }
        };
        self.active = Some(item);
        effect
    }

    pub(crate) fn clear_active(&mut self) {
        self.bump_epoch();
        self.active = None;
        self.board.clear();
    }

    fn load_goal(&mut self, goal_id: String) -> Effect {
        let epoch = self.bump_epoch();
        info!(goal_id = %goal_id, epoch, "loading goal from navigation");
        self.phase = Phase::Loading {
            goal_id: goal_id.clone(),
        };
        goal_detail_command(self.api.clone(), self.session.clone(), epoch, goal_id)
    }

    fn handle_goal_detail(
        &mut self,
        epoch: u64,
        goal_id: String,
        result: Result<Goal, FetchFailure>,
    ) -> Effect {
        if self.is_stale(epoch) {
            return Effect::none();
        }
        match result {
            Ok(goal) => {
                self.telemetry
                    .record(TelemetryEvent::SelectionChanged(format!("goal:{}", goal.id)));
                self.active = Some(PlanningItem::Goal(goal));
                self.board.clear();
                goal_tasks_command(self.api.clone(), self.session.clone(), epoch, goal_id)
            }
            Err(failure) => {
                warn!(goal_id = %goal_id, error = %failure, "goal detail fetch failed");
                self.page_error = Some(format!("Could not load goal {}: {}", goal_id, failure));
                self.phase = Phase::Ready;
                Effect::none()
            }
        }
    }

    fn handle_tasks_loaded(
        &mut self,
        epoch: u64,
        goal_id: String,
        result: Result<Vec<Value>, FetchFailure>,
    ) -> Effect {
        if self.is_stale(epoch) {
            return Effect::none();
        }
        match result {
            Ok(raw) => self.board.replace(normalize(&raw)),
            Err(failure) => {
                warn!(goal_id = %goal_id, error = %failure, "tasks fetch failed; clearing tasks");
                self.board.clear();
            }
        }

        if !matches!(self.phase, Phase::Loading { .. }) {
            return Effect::none();
        }
        if self.aggregate_in_flight || self.goal_list_in_flight {
            debug!("goal list already loading; skipping refetch");
            self.phase = Phase::Ready;
            return Effect::none();
        }
        self.goal_list_in_flight = true;
        goal_list_command(self.api.clone(), self.session.clone(), epoch)
    }

    fn handle_goals_loaded(&mut self, epoch: u64, result: Result<Vec<Goal>, FetchFailure>) -> Effect {
        self.goal_list_in_flight = false;
        match result {
            Ok(goals) => self.collections.goals = goals,
            Err(failure) => {
                warn!(error = %failure, "goal list fetch failed; showing it empty");
                self.collections.goals.clear();
            }
        }
        if epoch == self.epoch {
            self.phase = Phase::Ready;
        }
        Effect::none()
    }
}
