use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use planboard_core::input::{GoalInput, HabitInput, ReminderInput};
use planboard_core::ConfigOverrides;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "planboard",
    version,
    about = "Calendar view over your goals, reminders and habits.",
    after_help = "Examples:\n  planboard agenda\n  planboard agenda --goal g1 --date 2025-04-23\n  planboard toggle --goal g1 --task t3\n  planboard delete --goal g1 --yes\n  planboard --log debug ping"
)]
pub struct Cli {
    /// Backend base URL (defaults to PLANBOARD_API_URL, the config file, then http://localhost:5000/api)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// User whose items are shown
    #[arg(long, value_name = "ID", global = true)]
    pub user: Option<String>,

    /// Read settings from this JSON file instead of the platform config dir
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override the tracing filter (e.g. "warn", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            user_id: self.user.clone(),
            config_path: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Show the active item, its tasks for a day, the month calendar and what is coming up
    Agenda(AgendaArgs),
    /// List every goal, reminder and habit
    Items,
    /// Flip a task between completed and pending
    Toggle(ToggleArgs),
    /// Delete a goal (asks for confirmation unless --yes)
    Delete(DeleteArgs),
    /// Create a goal and print its id
    AddGoal(GoalArgs),
    /// Create a reminder
    AddReminder(ReminderArgs),
    /// Create a habit
    AddHabit(HabitArgs),
    /// Fetch the raw goal list to check the backend connection
    Ping,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AgendaArgs {
    /// Goal to open (as if navigating to it)
    #[arg(long, value_name = "ID", conflicts_with_all = ["reminder", "habit"])]
    pub goal: Option<String>,

    /// Reminder to select after loading
    #[arg(long, value_name = "ID", conflicts_with = "habit")]
    pub reminder: Option<String>,

    /// Habit to select after loading
    #[arg(long, value_name = "ID")]
    pub habit: Option<String>,

    /// Day to show (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct ToggleArgs {
    #[arg(long, value_name = "ID")]
    pub goal: String,

    #[arg(long, value_name = "ID")]
    pub task: String,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[arg(long, value_name = "ID")]
    pub goal: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GoalArgs {
    #[arg(value_name = "NAME", required = true)]
    pub name: Vec<String>,

    /// Deadline (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub deadline: String,

    /// Breakdown mode
    #[arg(long, default_value = "simple")]
    pub mode: String,

    /// What the goal is about
    #[arg(long, value_name = "TEXT")]
    pub description: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReminderArgs {
    #[arg(value_name = "NAME", required = true)]
    pub name: Vec<String>,

    /// Deadline (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub deadline: String,

    /// Reminder mode (defaults to "simple")
    #[arg(long)]
    pub mode: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct HabitArgs {
    #[arg(value_name = "NAME", required = true)]
    pub name: Vec<String>,

    /// low, medium or high
    #[arg(long, value_name = "LEVEL")]
    pub frequency: String,

    /// low, medium or high
    #[arg(long, value_name = "LEVEL")]
    pub intensity: String,
}

impl From<GoalArgs> for GoalInput {
    fn from(args: GoalArgs) -> Self {
        GoalInput {
            name: args.name.join(" "),
            deadline: args.deadline,
            mode: args.mode,
            description: args.description,
        }
    }
}

impl From<ReminderArgs> for ReminderInput {
    fn from(args: ReminderArgs) -> Self {
        ReminderInput {
            name: args.name.join(" "),
            deadline: args.deadline,
            mode: args.mode,
        }
    }
}

impl From<HabitArgs> for HabitInput {
    fn from(args: HabitArgs) -> Self {
        HabitInput {
            name: args.name.join(" "),
            frequency: args.frequency,
            intensity: args.intensity,
        }
    }
}
