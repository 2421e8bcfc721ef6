use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::canonical::parse_calendar_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Delayed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Delayed => "delayed",
        }
    }

    /// Status written by the completion toggle: `completed` flips back to `pending`,
    /// every other status becomes `completed`.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            _ => TaskStatus::Completed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "delayed" => Ok(TaskStatus::Delayed),
            other => Err(anyhow!(
                "Unknown status '{}': expected pending|in-progress|completed|delayed",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(anyhow!(
                "Unknown priority '{}': expected low|medium|high",
                other
            )),
        }
    }
}

/// Canonical task shape. Only the canonicalizer builds these; everything else reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Task {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub priority: Priority,
    pub status: TaskStatus,
    pub order: i64,
}

impl Task {
    pub(crate) fn new(
        id: String,
        name: String,
        date: NaiveDate,
        priority: Priority,
        status: TaskStatus,
        order: i64,
    ) -> Self {
        Self {
            id,
            name,
            date,
            priority,
            status,
            order,
        }
    }

    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    #[serde(
        rename = "eventDeadLine",
        default,
        deserialize_with = "calendar_day",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(rename = "eventMode", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(
        rename = "eventDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "embedded_tasks",
        skip_serializing_if = "Option::is_none"
    )]
    pub tasks: Option<Vec<Value>>,
    #[serde(rename = "learningLinks", default, deserialize_with = "lenient_links")]
    pub learning_links: Vec<LearningLink>,
}

impl Goal {
    /// Share of embedded tasks marked completed, rounded to a whole percent.
    pub fn progress(&self) -> u8 {
        let Some(tasks) = self.tasks.as_ref() else {
            return 0;
        };
        if tasks.is_empty() {
            return 0;
        }
        let completed = tasks
            .iter()
            .filter(|record| {
                record
                    .get("status")
                    .and_then(Value::as_str)
                    .and_then(|raw| raw.parse::<TaskStatus>().ok())
                    .is_some_and(|status| status.is_completed())
            })
            .count();
        ((completed as f64 / tasks.len() as f64) * 100.0).round() as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    #[serde(
        rename = "eventDeadLine",
        default,
        deserialize_with = "calendar_day",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(rename = "eventMode", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<String>,
    #[serde(
        rename = "createAt",
        default,
        deserialize_with = "calendar_day",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "embedded_tasks",
        skip_serializing_if = "Option::is_none"
    )]
    pub tasks: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Goal,
    Reminder,
    Habit,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Goal => "goal",
            ItemKind::Reminder => "reminder",
            ItemKind::Habit => "habit",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanningItem {
    Goal(Goal),
    Reminder(Reminder),
    Habit(Habit),
}

impl PlanningItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            PlanningItem::Goal(_) => ItemKind::Goal,
            PlanningItem::Reminder(_) => ItemKind::Reminder,
            PlanningItem::Habit(_) => ItemKind::Habit,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PlanningItem::Goal(goal) => &goal.id,
            PlanningItem::Reminder(reminder) => &reminder.id,
            PlanningItem::Habit(habit) => &habit.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PlanningItem::Goal(goal) => &goal.event_name,
            PlanningItem::Reminder(reminder) => &reminder.event_name,
            PlanningItem::Habit(habit) => &habit.name,
        }
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        match self {
            PlanningItem::Goal(goal) => goal.deadline,
            PlanningItem::Reminder(reminder) => reminder.deadline,
            PlanningItem::Habit(_) => None,
        }
    }

    /// Raw task records carried inline by the item, if the backend embedded them.
    pub fn embedded_tasks(&self) -> Option<&[Value]> {
        match self {
            PlanningItem::Goal(goal) => goal.tasks.as_deref(),
            PlanningItem::Reminder(_) => None,
            PlanningItem::Habit(habit) => habit.tasks.as_deref(),
        }
    }

    /// Text shown for the item in a selector list.
    pub fn label(&self) -> String {
        match self {
            PlanningItem::Habit(habit) if habit.frequency.is_empty() => habit.name.clone(),
            PlanningItem::Habit(habit) => format!("{} ({})", habit.name, habit.frequency),
            other => match other.deadline() {
                Some(deadline) => format!(
                    "{} (deadline: {})",
                    other.name(),
                    deadline.format("%Y-%m-%d")
                ),
                None => other.name().to_string(),
            },
        }
    }

    pub fn selection(&self) -> Selection {
        match self {
            PlanningItem::Goal(goal) => Selection::Goal(goal.id.clone()),
            PlanningItem::Reminder(reminder) => Selection::Reminder(reminder.id.clone()),
            PlanningItem::Habit(habit) => Selection::Habit(habit.id.clone()),
        }
    }
}

/// The single active-item slot. Holding one variant excludes the other two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    Goal(String),
    Reminder(String),
    Habit(String),
}

impl Selection {
    pub fn kind(&self) -> Option<ItemKind> {
        match self {
            Selection::None => None,
            Selection::Goal(_) => Some(ItemKind::Goal),
            Selection::Reminder(_) => Some(ItemKind::Reminder),
            Selection::Habit(_) => Some(ItemKind::Habit),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Goal(id) | Selection::Reminder(id) | Selection::Habit(id) => Some(id),
        }
    }

    pub fn goal_id(&self) -> Option<&str> {
        match self {
            Selection::Goal(id) => Some(id),
            _ => None,
        }
    }

    pub fn reminder_id(&self) -> Option<&str> {
        match self {
            Selection::Reminder(id) => Some(id),
            _ => None,
        }
    }

    pub fn habit_id(&self) -> Option<&str> {
        match self {
            Selection::Habit(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

fn calendar_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|raw| parse_calendar_day(raw, &Local)))
}

fn embedded_tasks<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(Some(items)),
        _ => Ok(None),
    }
}

fn lenient_links<'de, D>(deserializer: D) -> Result<Vec<LearningLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(TaskStatus::Pending, TaskStatus::Completed)]
    #[case(TaskStatus::Completed, TaskStatus::Pending)]
    #[case(TaskStatus::InProgress, TaskStatus::Completed)]
    #[case(TaskStatus::Delayed, TaskStatus::Completed)]
    fn toggle_flips_between_completed_and_pending(
        #[case] from: TaskStatus,
        #[case] expected: TaskStatus,
    ) {
        assert_eq!(from.toggled(), expected);
    }

    #[test]
    fn status_and_priority_parse_case_insensitively() {
        assert_eq!("In-Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("med".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn goal_decodes_backend_field_names() {
        let goal: Goal = serde_json::from_value(json!({
            "id": "g1",
            "eventName": "Learn Rust",
            "eventDeadLine": "2025-06-30",
            "eventMode": "detailed",
            "learningLinks": [{"title": "Book", "link": "https://doc.rust-lang.org/book/"}, 42],
            "tasks": [{"due_date": "2025-04-23", "status": "completed"}, {"due_date": "2025-04-24"}]
        }))
        .unwrap();

        assert_eq!(goal.event_name, "Learn Rust");
        assert_eq!(goal.deadline, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(goal.learning_links.len(), 1);
        assert_eq!(goal.tasks.as_ref().map(Vec::len), Some(2));
        assert_eq!(goal.progress(), 50);
    }

    #[test]
    fn non_array_tasks_are_treated_as_absent() {
        let goal: Goal = serde_json::from_value(json!({"id": "g1", "tasks": {"oops": true}})).unwrap();
        assert!(goal.tasks.is_none());
        assert_eq!(goal.progress(), 0);
    }

    #[test]
    fn labels_follow_item_kind() {
        let goal = PlanningItem::Goal(Goal {
            id: "g1".into(),
            event_name: "Marathon".into(),
            deadline: NaiveDate::from_ymd_opt(2025, 10, 1),
            mode: None,
            description: None,
            tasks: None,
            learning_links: Vec::new(),
        });
        let habit = PlanningItem::Habit(Habit {
            id: "h1".into(),
            name: "Drink water".into(),
            frequency: "high".into(),
            intensity: None,
            created: None,
            tasks: None,
        });

        assert_eq!(goal.label(), "Marathon (deadline: 2025-10-01)");
        assert_eq!(habit.label(), "Drink water (high)");
        assert_eq!(goal.selection(), Selection::Goal("g1".into()));
        assert_eq!(habit.selection().habit_id(), Some("h1"));
        assert!(habit.selection().goal_id().is_none());
    }

    #[test]
    fn planning_item_serializes_with_kind_tag() {
        let reminder = PlanningItem::Reminder(Reminder {
            id: "r1".into(),
            event_name: "Read paper".into(),
            deadline: None,
            mode: Some("simple".into()),
        });
        let value = serde_json::to_value(&reminder).unwrap();
        assert_eq!(value["kind"], "reminder");
        assert_eq!(value["eventName"], "Read paper");
    }
}
