//! Reshapes raw task records from any backend collection into canonical [`Task`]s and
//! derives the per-day index the calendar renders from.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{Priority, Task, TaskStatus};

/// Number of entries in the "upcoming" strip.
pub const UPCOMING_LIMIT: usize = 10;

const DATE_FIELDS: &[&str] = &["due_date", "dueDate"];
const NAME_FIELDS: &[&str] = &["task_name", "title"];
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Tasks grouped by calendar day, each day ordered by ascending `order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateIndex {
    buckets: BTreeMap<NaiveDate, Vec<Task>>,
}

impl DateIndex {
    pub fn tasks_on(&self, date: NaiveDate) -> &[Task] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.tasks_on(date).len()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Task])> + '_ {
        self.buckets
            .iter()
            .map(|(date, tasks)| (*date, tasks.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All tasks, day by day in calendar order.
    pub fn flatten(&self) -> Vec<Task> {
        self.buckets.values().flatten().cloned().collect()
    }
}

/// Reduce a backend date or date-time string to the calendar day it falls on in `tz`.
///
/// Plain dates and naive date-times are taken as already local; offset-bearing values
/// (RFC 3339, RFC 2822) are converted into `tz` first.
pub fn parse_calendar_day<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(tz).date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.date());
        }
    }
    if let Ok(stamp) = DateTime::parse_from_rfc2822(raw) {
        return Some(stamp.with_timezone(tz).date_naive());
    }
    None
}

/// Canonicalize raw task records using the machine's local timezone.
pub fn normalize(raw: &[Value]) -> Vec<Task> {
    normalize_in(raw, &Local)
}

/// Canonicalize raw task records, resolving date-times to calendar days in `tz`.
///
/// Records without `due_date`/`dueDate`, or whose date cannot be read, are dropped.
pub fn normalize_in<Tz: TimeZone>(raw: &[Value], tz: &Tz) -> Vec<Task> {
    raw.iter()
        .enumerate()
        .filter_map(|(position, record)| canonical_task(position, record, tz))
        .collect()
}

/// Group tasks by day; within a day, a stable sort by `order`.
pub fn bucket(tasks: &[Task]) -> DateIndex {
    let mut buckets: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        buckets.entry(task.date).or_default().push(task.clone());
    }
    for day in buckets.values_mut() {
        day.sort_by_key(|task| task.order);
    }
    DateIndex { buckets }
}

/// Tasks due on or after `today`, earliest first, at most `limit` of them.
pub fn upcoming(tasks: &[Task], today: NaiveDate, limit: usize) -> Vec<Task> {
    let mut due: Vec<Task> = tasks
        .iter()
        .filter(|task| task.date >= today)
        .cloned()
        .collect();
    due.sort_by_key(|task| task.date);
    due.truncate(limit);
    due
}

fn canonical_task<Tz: TimeZone>(position: usize, record: &Value, tz: &Tz) -> Option<Task> {
    let fields = record.as_object()?;
    let raw_date = first_present(fields, DATE_FIELDS)?;
    let Some(date) = raw_date
        .as_str()
        .and_then(|raw| parse_calendar_day(raw, tz))
    else {
        debug!(position, value = %raw_date, "dropping task with unreadable date");
        return None;
    };

    let id = first_present(fields, &["id"])
        .and_then(scalar_text)
        .unwrap_or_else(|| format!("task-{}", position + 1));
    let name = first_present(fields, NAME_FIELDS)
        .and_then(scalar_text)
        .unwrap_or_default();
    let priority = first_present(fields, &["priority"])
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<Priority>().ok())
        .unwrap_or_default();
    let status = first_present(fields, &["status"])
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<TaskStatus>().ok())
        .unwrap_or_default();
    let order = first_present(fields, &["order"])
        .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)))
        .unwrap_or(0);

    Some(Task::new(id, name, date, priority, status, order))
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
