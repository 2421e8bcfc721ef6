//! Concurrent loading of the three item collections and the default-selection rule.

use planboard_client::{FetchFailure, PlannerApi};
use planboard_core::model::{Goal, Habit, ItemKind, PlanningItem, Reminder, Selection};
use planboard_core::Session;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub goals: Vec<Goal>,
    pub reminders: Vec<Reminder>,
    pub habits: Vec<Habit>,
}

impl Collections {
    /// Merged selector list: goals, then reminders, then habits.
    pub fn items(&self) -> Vec<PlanningItem> {
        self.goals
            .iter()
            .cloned()
            .map(PlanningItem::Goal)
            .chain(self.reminders.iter().cloned().map(PlanningItem::Reminder))
            .chain(self.habits.iter().cloned().map(PlanningItem::Habit))
            .collect()
    }

    pub fn find(&self, selection: &Selection) -> Option<PlanningItem> {
        match selection {
            Selection::None => None,
            Selection::Goal(id) => self.goal(id).cloned().map(PlanningItem::Goal),
            Selection::Reminder(id) => self
                .reminders
                .iter()
                .find(|reminder| &reminder.id == id)
                .cloned()
                .map(PlanningItem::Reminder),
            Selection::Habit(id) => self
                .habits
                .iter()
                .find(|habit| &habit.id == id)
                .cloned()
                .map(PlanningItem::Habit),
        }
    }

    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == goal_id)
    }

    pub fn len(&self) -> usize {
        self.goals.len() + self.reminders.len() + self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one full aggregation; failed collections are already empty.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub collections: Collections,
    pub failures: Vec<(ItemKind, FetchFailure)>,
}

/// Fetch goals, reminders and habits concurrently. A failing collection degrades to empty.
pub async fn load_all(api: &PlannerApi, session: &Session) -> LoadReport {
    let (goals, reminders, habits) = futures::join!(
        api.list_goals(session),
        api.list_reminders(session),
        api.list_habits(session)
    );

    let mut failures = Vec::new();
    let collections = Collections {
        goals: degrade(ItemKind::Goal, goals, &mut failures),
        reminders: degrade(ItemKind::Reminder, reminders, &mut failures),
        habits: degrade(ItemKind::Habit, habits, &mut failures),
    };
    LoadReport {
        collections,
        failures,
    }
}

fn degrade<T>(
    kind: ItemKind,
    result: Result<Vec<T>, FetchFailure>,
    failures: &mut Vec<(ItemKind, FetchFailure)>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(failure) => {
            warn!(collection = %kind, error = %failure, "collection fetch failed; showing it empty");
            failures.push((kind, failure));
            Vec::new()
        }
    }
}

/// The goal named by the URL when it exists, otherwise the first merged item.
pub fn select_default(collections: &Collections, url_goal_id: Option<&str>) -> Option<PlanningItem> {
    if let Some(goal) = url_goal_id.and_then(|id| collections.goal(id)) {
        return Some(PlanningItem::Goal(goal.clone()));
    }
    collections
        .goals
        .first()
        .cloned()
        .map(PlanningItem::Goal)
        .or_else(|| {
            collections
                .reminders
                .first()
                .cloned()
                .map(PlanningItem::Reminder)
        })
        .or_else(|| collections.habits.first().cloned().map(PlanningItem::Habit))
}
