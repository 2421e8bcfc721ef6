pub mod canonical;
pub mod config;
pub mod input;
pub mod model;
pub mod session;

pub use canonical::{bucket, normalize, normalize_in, upcoming, DateIndex, UPCOMING_LIMIT};
pub use config::{AppConfig, ConfigOverrides};
pub use input::{GoalInput, HabitInput, InputError, ReminderInput};
pub use model::*;
pub use session::Session;
