//! Plain-text rendering of the planner view: selector list, day agenda, month grid.

use std::io::Write;

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use planboard_core::canonical::DateIndex;
use planboard_core::model::{PlanningItem, Selection, Task, TaskStatus};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
const CELL_WIDTH: usize = 6;

pub fn write_items<W: Write>(
    mut writer: W,
    items: &[PlanningItem],
    selection: &Selection,
) -> Result<()> {
    if items.is_empty() {
        writeln!(writer, "No goals, reminders or habits yet.")?;
        return Ok(());
    }
    for item in items {
        let marker = if &item.selection() == selection { '>' } else { ' ' };
        let progress = match item {
            PlanningItem::Goal(goal) => format!("  {}%", goal.progress()),
            _ => String::new(),
        };
        writeln!(
            writer,
            "{} {:<8} {:<16} {}{}",
            marker,
            item.kind().as_str(),
            item.id(),
            item.label(),
            progress
        )?;
    }
    Ok(())
}

pub fn write_active<W: Write>(mut writer: W, item: Option<&PlanningItem>) -> Result<()> {
    let Some(item) = item else {
        writeln!(writer, "Nothing selected.")?;
        return Ok(());
    };
    writeln!(writer, "{}: {}", capitalize(item.kind().as_str()), item.label())?;
    match item {
        PlanningItem::Goal(goal) => {
            if let Some(description) = goal.description.as_deref().filter(|d| !d.is_empty()) {
                writeln!(writer, "  {}", description)?;
            }
            for link in &goal.learning_links {
                match &link.title {
                    Some(title) => writeln!(writer, "  - {} <{}>", title, link.link)?,
                    None => writeln!(writer, "  - <{}>", link.link)?,
                }
            }
        }
        PlanningItem::Reminder(reminder) => {
            if let Some(mode) = &reminder.mode {
                writeln!(writer, "  mode: {}", mode)?;
            }
        }
        PlanningItem::Habit(habit) => {
            if let Some(intensity) = &habit.intensity {
                writeln!(writer, "  intensity: {}", intensity)?;
            }
        }
    }
    Ok(())
}

pub fn write_day<W: Write>(mut writer: W, date: NaiveDate, tasks: &[Task]) -> Result<()> {
    writeln!(writer, "Tasks on {}:", date.format("%Y-%m-%d"))?;
    if tasks.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    for task in tasks {
        writeln!(writer, "  {}", task_line(task))?;
    }
    Ok(())
}

/// Month grid around `anchor`; days with tasks carry their count, `anchor` is bracketed.
pub fn write_month<W: Write>(mut writer: W, index: &DateIndex, anchor: NaiveDate) -> Result<()> {
    let first = anchor.with_day(1).unwrap_or(anchor);
    writeln!(writer, "{}", first.format("%B %Y"))?;
    let header: String = WEEKDAYS
        .iter()
        .map(|day| format!("{:<width$}", day, width = CELL_WIDTH))
        .collect();
    writeln!(writer, "{}", header.trim_end())?;

    let mut line = " ".repeat(first.weekday().num_days_from_monday() as usize * CELL_WIDTH);
    let mut day = first;
    while day.month() == first.month() {
        line.push_str(&day_cell(day, index.count_on(day), day == anchor));
        if day.weekday().num_days_from_monday() == 6 {
            writeln!(writer, "{}", line.trim_end())?;
            line.clear();
        }
        day += Duration::days(1);
    }
    if !line.trim().is_empty() {
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}

pub fn write_upcoming<W: Write>(mut writer: W, tasks: &[Task]) -> Result<()> {
    writeln!(writer, "Upcoming:")?;
    if tasks.is_empty() {
        writeln!(writer, "  (nothing scheduled)")?;
    }
    for task in tasks {
        writeln!(writer, "  {}  {}", task.date_key(), task_line(task))?;
    }
    Ok(())
}

fn day_cell(day: NaiveDate, count: usize, highlighted: bool) -> String {
    let number = if highlighted {
        format!("[{}]", day.day())
    } else {
        day.day().to_string()
    };
    let badge = if count > 0 {
        format!("*{}", count)
    } else {
        String::new()
    };
    format!("{:<width$}", format!("{}{}", number, badge), width = CELL_WIDTH)
}

fn task_line(task: &Task) -> String {
    let check = match task.status {
        TaskStatus::Completed => "[x]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Delayed => "[!]",
        TaskStatus::Pending => "[ ]",
    };
    format!("{} {} ({}) #{}", check, task.name, task.priority, task.id)
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
