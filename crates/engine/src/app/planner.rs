//! The planner page state and its read-only view surface.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use planboard_client::{Fetcher, PlannerApi};
use planboard_core::canonical::DateIndex;
use planboard_core::model::{Goal, Habit, PlanningItem, Reminder, Selection, Task};
use planboard_core::{AppConfig, Session};

use crate::app::aggregation::Collections;
use crate::app::options::PlannerOptions;
use crate::app::state::{
    DeletePhase, MutationKind, NavigationRequest, Phase, StatusToast, TaskBoard, ToastKind,
};
use crate::telemetry::{self, Event as TelemetryEvent};

/// Own route rewrites remembered until the router echoes them back.
const MAX_PENDING_ECHOES: usize = 16;

pub struct Planner {
    pub(crate) api: PlannerApi,
    pub(crate) session: Session,
    pub(crate) options: PlannerOptions,
    pub(crate) telemetry: Arc<telemetry::Handle>,
    pub(crate) phase: Phase,
    pub(crate) collections: Collections,
    pub(crate) active: Option<PlanningItem>,
    pub(crate) board: TaskBoard,
    pub(crate) epoch: u64,
    pub(crate) route: Option<String>,
    pub(crate) navigations: Vec<NavigationRequest>,
    pub(crate) pending_echoes: VecDeque<Option<String>>,
    pub(crate) initial_load_in_progress: bool,
    pub(crate) aggregate_in_flight: bool,
    pub(crate) goal_list_in_flight: bool,
    pub(crate) delete: DeletePhase,
    pub(crate) pending_toggles: HashSet<String>,
    pub(crate) last_mutation: Option<(MutationKind, bool)>,
    pub(crate) status: Option<StatusToast>,
    pub(crate) page_error: Option<String>,
}

impl Planner {
    pub fn new(fetcher: Fetcher, session: Session, options: PlannerOptions) -> Self {
        let telemetry = Arc::new(telemetry::Handle::new());
        let observer_handle = telemetry.clone();
        let fetcher = fetcher.with_observer(Arc::new(move |method, path| {
            observer_handle.record(TelemetryEvent::RequestIssued {
                endpoint: format!("{} {}", method, path),
            });
        }));

        Self {
            api: PlannerApi::new(fetcher),
            session,
            options,
            telemetry,
            phase: Phase::Idle,
            collections: Collections::default(),
            active: None,
            board: TaskBoard::default(),
            epoch: 0,
            route: None,
            navigations: Vec::new(),
            pending_echoes: VecDeque::new(),
            initial_load_in_progress: false,
            aggregate_in_flight: false,
            goal_list_in_flight: false,
            delete: DeletePhase::Idle,
            pending_toggles: HashSet::new(),
            last_mutation: None,
            status: None,
            page_error: None,
        }
    }

    /// Planner talking HTTP to the configured backend.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Fetcher::http(config.api_url()).context("failed to build HTTP client")?;
        Ok(Self::new(
            fetcher,
            config.session(),
            PlannerOptions::from(config),
        ))
    }

    pub fn api(&self) -> &PlannerApi {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn telemetry(&self) -> &telemetry::Handle {
        &self.telemetry
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Merged selector list in goal, reminder, habit order.
    pub fn items(&self) -> Vec<PlanningItem> {
        self.collections.items()
    }

    pub fn active(&self) -> Option<&PlanningItem> {
        self.active.as_ref()
    }

    pub fn selection(&self) -> Selection {
        self.active
            .as_ref()
            .map(PlanningItem::selection)
            .unwrap_or_default()
    }

    pub fn active_goal(&self) -> Option<&Goal> {
        match &self.active {
            Some(PlanningItem::Goal(goal)) => Some(goal),
            _ => None,
        }
    }

    pub fn active_reminder(&self) -> Option<&Reminder> {
        match &self.active {
            Some(PlanningItem::Reminder(reminder)) => Some(reminder),
            _ => None,
        }
    }

    pub fn active_habit(&self) -> Option<&Habit> {
        match &self.active {
            Some(PlanningItem::Habit(habit)) => Some(habit),
            _ => None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.board.tasks()
    }

    pub fn date_index(&self) -> &DateIndex {
        self.board.index()
    }

    pub fn tasks_on(&self, date: NaiveDate) -> &[Task] {
        self.board.index().tasks_on(date)
    }

    pub fn upcoming(&self, today: NaiveDate) -> Vec<Task> {
        self.board
            .upcoming(today, planboard_core::canonical::UPCOMING_LIMIT)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Drain the route rewrites issued since the last call.
    pub fn take_navigations(&mut self) -> Vec<NavigationRequest> {
        std::mem::take(&mut self.navigations)
    }

    pub fn initial_load_in_progress(&self) -> bool {
        self.initial_load_in_progress
    }

    pub fn aggregate_fetch_in_flight(&self) -> bool {
        self.aggregate_in_flight
    }

    /// Goals-only refetch issued at the end of a navigation-driven load.
    pub fn goal_list_fetch_in_flight(&self) -> bool {
        self.goal_list_in_flight
    }

    pub fn delete_phase(&self) -> &DeletePhase {
        &self.delete
    }

    pub fn overlay(&self) -> Option<&'static str> {
        self.delete.overlay()
    }

    pub fn page_error(&self) -> Option<&str> {
        self.page_error.as_deref()
    }

    /// The current notification, if it has not expired yet.
    pub fn toast(&self) -> Option<&StatusToast> {
        self.status
            .as_ref()
            .filter(|toast| toast.created_at.elapsed() < self.options.toast_ttl)
    }

    pub(crate) fn show_toast(&mut self, message: String, kind: ToastKind) {
        self.status = Some(StatusToast {
            message,
            kind,
            created_at: Instant::now(),
        });
    }

    pub(crate) fn prune_toast(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|toast| toast.created_at.elapsed() >= self.options.toast_ttl)
        {
            self.status = None;
        }
    }

    pub(crate) fn replace_route(&mut self, target: Option<String>) {
        self.route = target.clone();
        if self.pending_echoes.len() == MAX_PENDING_ECHOES {
            self.pending_echoes.pop_front();
        }
        self.pending_echoes.push_back(target.clone());
        self.navigations.push(NavigationRequest::Replace(target));
    }

    /// Consume the oldest unechoed rewrite to `route`, if this planner issued one.
    pub(crate) fn take_echo(&mut self, route: &Option<String>) -> bool {
        match self.pending_echoes.iter().position(|issued| issued == route) {
            Some(position) => {
                self.pending_echoes.remove(position);
                true
            }
            None => false,
        }
    }

    pub(crate) fn bump_epoch(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    /// True (and logged) when a response belongs to an earlier selection.
    pub(crate) fn is_stale(&self, epoch: u64) -> bool {
        if epoch == self.epoch {
            return false;
        }
        tracing::debug!(epoch, current = self.epoch, "discarding stale response");
        self.telemetry
            .record(TelemetryEvent::StaleResponseDiscarded {
                epoch,
                current: self.epoch,
            });
        true
    }
}
