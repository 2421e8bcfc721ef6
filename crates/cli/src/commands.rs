use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use planboard_client::api::endpoints;
use planboard_client::Method;
use planboard_core::input::{GoalInput, HabitInput, ReminderInput};
use planboard_core::model::Selection;
use planboard_engine::{Message, Planner, ToastKind};
use tracing::debug;

use crate::cli::{AgendaArgs, CliCommand, DeleteArgs, ToggleArgs};
use crate::render;

/// Run one command against the planner. `input` answers confirmation prompts.
pub async fn execute<R: BufRead, W: Write>(
    planner: &mut Planner,
    command: CliCommand,
    today: NaiveDate,
    input: R,
    mut writer: W,
) -> Result<()> {
    match command {
        CliCommand::Agenda(args) => handle_agenda(planner, &args, today, &mut writer).await,
        CliCommand::Items => handle_items(planner, &mut writer).await,
        CliCommand::Toggle(args) => handle_toggle(planner, &args, &mut writer).await,
        CliCommand::Delete(args) => handle_delete(planner, &args, input, &mut writer).await,
        CliCommand::AddGoal(args) => {
            handle_add_goal(planner, GoalInput::from(args), &mut writer).await
        }
        CliCommand::AddReminder(args) => {
            handle_add_reminder(planner, ReminderInput::from(args), &mut writer).await
        }
        CliCommand::AddHabit(args) => {
            handle_add_habit(planner, HabitInput::from(args), &mut writer).await
        }
        CliCommand::Ping => handle_ping(planner, &mut writer).await,
    }
}

async fn handle_agenda<W: Write>(
    planner: &mut Planner,
    args: &AgendaArgs,
    today: NaiveDate,
    mut writer: W,
) -> Result<()> {
    planner.mount(args.goal.clone()).await;
    if let Some(reminder_id) = &args.reminder {
        planner.select(Selection::Reminder(reminder_id.clone())).await;
    } else if let Some(habit_id) = &args.habit {
        planner.select(Selection::Habit(habit_id.clone())).await;
    }
    write_page_error(planner, &mut writer)?;

    let date = args.date.unwrap_or(today);
    render::write_items(&mut writer, &planner.items(), &planner.selection())?;
    writeln!(writer)?;
    render::write_active(&mut writer, planner.active())?;
    if planner.active().is_none() {
        return Ok(());
    }
    writeln!(writer)?;
    render::write_day(&mut writer, date, planner.tasks_on(date))?;
    writeln!(writer)?;
    render::write_month(&mut writer, planner.date_index(), date)?;
    writeln!(writer)?;
    render::write_upcoming(&mut writer, &planner.upcoming(date))?;
    Ok(())
}

async fn handle_items<W: Write>(planner: &mut Planner, mut writer: W) -> Result<()> {
    planner.mount(None).await;
    write_page_error(planner, &mut writer)?;
    render::write_items(&mut writer, &planner.items(), &planner.selection())
}

async fn handle_toggle<W: Write>(
    planner: &mut Planner,
    args: &ToggleArgs,
    mut writer: W,
) -> Result<()> {
    planner.mount(Some(args.goal.clone())).await;
    if planner.active_goal().map(|goal| goal.id.as_str()) != Some(args.goal.as_str()) {
        bail!("goal '{}' not found", args.goal);
    }
    if !planner.tasks().iter().any(|task| task.id == args.task) {
        bail!("task '{}' not found in goal '{}'", args.task, args.goal);
    }

    let confirmed = planner.toggle_status(&args.goal, &args.task).await;
    write_toast(planner, &mut writer)?;
    if !confirmed {
        bail!("status of task '{}' was not changed", args.task);
    }
    Ok(())
}

async fn handle_delete<R: BufRead, W: Write>(
    planner: &mut Planner,
    args: &DeleteArgs,
    mut input: R,
    mut writer: W,
) -> Result<()> {
    planner.mount(Some(args.goal.clone())).await;
    let Some(goal) = planner.collections().goal(&args.goal) else {
        bail!("goal '{}' not found", args.goal);
    };
    let name = goal.event_name.clone();

    planner
        .dispatch(Message::RequestDeleteGoal(args.goal.clone()))
        .await;
    if !args.yes && !confirm(&mut input, &mut writer, &name)? {
        planner.dispatch(Message::CancelDelete).await;
        writeln!(writer, "Kept '{}'.", name)?;
        return Ok(());
    }
    planner.dispatch(Message::ConfirmDelete).await;
    write_toast(planner, &mut writer)?;

    let failed = planner
        .toast()
        .is_some_and(|toast| toast.kind == ToastKind::Error);
    if failed {
        bail!("goal '{}' was not deleted", args.goal);
    }
    if let Some(navigation) = planner.take_navigations().pop() {
        match navigation.target() {
            Some(target) => writeln!(writer, "Now showing goal {}.", target)?,
            None => writeln!(writer, "No goals left.")?,
        }
    }
    Ok(())
}

async fn handle_add_goal<W: Write>(
    planner: &mut Planner,
    input: GoalInput,
    mut writer: W,
) -> Result<()> {
    let created = planner
        .api()
        .create_goal(planner.session(), &input)
        .await
        .context("failed to create goal")?;
    let next = created
        .as_ref()
        .map(|id| format!("planboard agenda --goal {}", id));
    write_created(&mut writer, "goal", &input.name, created)?;
    if let Some(next) = next {
        writeln!(writer, "Open it with: {}", next)?;
    }
    Ok(())
}

async fn handle_add_reminder<W: Write>(
    planner: &mut Planner,
    input: ReminderInput,
    mut writer: W,
) -> Result<()> {
    let created = planner
        .api()
        .create_reminder(planner.session(), &input)
        .await
        .context("failed to create reminder")?;
    write_created(&mut writer, "reminder", &input.name, created)
}

async fn handle_add_habit<W: Write>(
    planner: &mut Planner,
    input: HabitInput,
    mut writer: W,
) -> Result<()> {
    let created = planner
        .api()
        .create_habit(planner.session(), &input)
        .await
        .context("failed to create habit")?;
    write_created(&mut writer, "habit", &input.name, created)
}

async fn handle_ping<W: Write>(planner: &mut Planner, mut writer: W) -> Result<()> {
    let path = endpoints::goals(planner.session());
    let body = planner
        .api()
        .fetcher()
        .request(&path, Method::Get, None)
        .await
        .map_err(|failure| anyhow!("GET {} failed: {}", path, failure))?;
    writeln!(writer, "{}", serde_json::to_string_pretty(&body)?)?;
    Ok(())
}

fn confirm<R: BufRead, W: Write>(mut input: R, mut writer: W, name: &str) -> Result<bool> {
    write!(writer, "Delete goal '{}'? [y/N] ", name)?;
    writer.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    debug!(answer = answer.trim(), "confirmation answered");
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn write_page_error<W: Write>(planner: &Planner, mut writer: W) -> Result<()> {
    if let Some(error) = planner.page_error() {
        writeln!(writer, "Error: {}", error)?;
    }
    Ok(())
}

fn write_toast<W: Write>(planner: &Planner, mut writer: W) -> Result<()> {
    if let Some(toast) = planner.toast() {
        writeln!(writer, "{}", toast.message)?;
    }
    Ok(())
}

fn write_created<W: Write>(
    mut writer: W,
    kind: &str,
    name: &str,
    id: Option<String>,
) -> Result<()> {
    match id {
        Some(id) => writeln!(writer, "Created {} '{}' ({}).", kind, name, id)?,
        None => writeln!(writer, "Created {} '{}'.", kind, name)?,
    }
    Ok(())
}
