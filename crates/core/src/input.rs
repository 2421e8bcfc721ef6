use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{json, Value};
use thiserror::Error;

/// Goal capture. Every field is required by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalInput {
    pub name: String,
    pub deadline: String,
    pub mode: String,
    pub description: String,
}

/// Reminder capture as typed by a user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderInput {
    pub name: String,
    pub deadline: String,
    pub mode: Option<String>,
}

/// Habit capture as typed by a user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitInput {
    pub name: String,
    pub frequency: String,
    pub intensity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("{0} cannot be empty")]
    MissingField(&'static str),
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid {field} '{value}': expected low|medium|high")]
    InvalidLevel { field: &'static str, value: String },
}

/// Shared scale for habit frequency and intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            _ => Err(()),
        }
    }
}

const DEFAULT_REMINDER_MODE: &str = "simple";

impl GoalInput {
    /// Validate and build the POST body for a new goal breakdown.
    pub fn to_payload(&self) -> Result<Value, InputError> {
        let name = require_name(&self.name)?;
        let deadline = parse_deadline(&self.deadline)?;
        let mode = require_field("Mode", &self.mode)?;
        let description = require_field("Description", &self.description)?;
        Ok(json!({
            "eventName": name,
            "eventDeadLine": deadline.format("%Y-%m-%d").to_string(),
            "eventMode": mode,
            "eventDescription": description,
        }))
    }
}

impl ReminderInput {
    pub fn new(name: impl Into<String>, deadline: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deadline: deadline.into(),
            mode: None,
        }
    }

    /// Validate and build the POST body for the reminders collection.
    pub fn to_payload(&self) -> Result<Value, InputError> {
        let name = require_name(&self.name)?;
        let deadline = parse_deadline(&self.deadline)?;
        let mode = self
            .mode
            .as_deref()
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
            .unwrap_or(DEFAULT_REMINDER_MODE);
        Ok(json!({
            "eventName": name,
            "eventDeadLine": deadline.format("%Y-%m-%d").to_string(),
            "eventMode": mode,
        }))
    }
}

impl HabitInput {
    pub fn to_payload(&self) -> Result<Value, InputError> {
        let name = require_name(&self.name)?;
        let frequency = parse_level("frequency", &self.frequency)?;
        let intensity = parse_level("intensity", &self.intensity)?;
        Ok(json!({
            "name": name,
            "frequency": frequency.as_str(),
            "intensity": intensity.as_str(),
        }))
    }
}

fn require_name(raw: &str) -> Result<&str, InputError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(InputError::EmptyName);
    }
    Ok(name)
}

fn require_field<'a>(field: &'static str, raw: &'a str) -> Result<&'a str, InputError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(InputError::MissingField(field));
    }
    Ok(value)
}

fn parse_deadline(raw: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(raw.to_string()))
}

fn parse_level(field: &'static str, raw: &str) -> Result<Level, InputError> {
    raw.parse().map_err(|_| InputError::InvalidLevel {
        field,
        value: raw.to_string(),
    })
}
