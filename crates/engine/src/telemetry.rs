//! Lightweight planner telemetry: lifecycle events plus the log of issued API calls.

#[cfg(feature = "telemetry")]
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
#[cfg(feature = "telemetry")]
use parking_lot::Mutex;

/// Oldest entries are dropped once a log reaches its cap.
pub const MAX_EVENTS: usize = 512;
pub const MAX_API_CALLS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    InitialLoadStarted,
    RequestIssued { endpoint: String },
    CollectionsLoaded { goals: usize, reminders: usize, habits: usize },
    CollectionFailed { collection: String, error: String },
    SelectionChanged(String),
    StaleResponseDiscarded { epoch: u64, current: u64 },
    MutationApplied(String),
    MutationFailed { action: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub endpoint: String,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Handle {
    #[cfg(feature = "telemetry")]
    events: Mutex<VecDeque<Event>>,
    #[cfg(feature = "telemetry")]
    calls: Mutex<VecDeque<ApiCall>>,
}

impl Handle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: Event) {
        #[cfg(feature = "telemetry")]
        {
            match &event {
                Event::InitialLoadStarted => tracing::debug!("planner telemetry initial load started"),
                Event::RequestIssued { endpoint } => {
                    tracing::debug!(endpoint = endpoint.as_str(), "planner telemetry request issued");
                    push_capped(
                        &mut *self.calls.lock(),
                        ApiCall {
                            endpoint: endpoint.clone(),
                            at: Utc::now(),
                        },
                        MAX_API_CALLS,
                    );
                }
                Event::CollectionsLoaded {
                    goals,
                    reminders,
                    habits,
                } => tracing::debug!(
                    goals,
                    reminders,
                    habits,
                    "planner telemetry collections loaded"
                ),
                Event::CollectionFailed { collection, error } => tracing::debug!(
                    collection = collection.as_str(),
                    error = %error,
                    "planner telemetry collection failed"
                ),
                Event::SelectionChanged(selection) => tracing::debug!(
                    selection = selection.as_str(),
                    "planner telemetry selection changed"
                ),
                Event::StaleResponseDiscarded { epoch, current } => tracing::debug!(
                    epoch,
                    current,
                    "planner telemetry stale response discarded"
                ),
                Event::MutationApplied(action) => tracing::debug!(
                    action = action.as_str(),
                    "planner telemetry mutation applied"
                ),
                Event::MutationFailed { action, error } => tracing::debug!(
                    action = action.as_str(),
                    error = %error,
                    "planner telemetry mutation failed"
                ),
            }
            push_capped(&mut *self.events.lock(), event, MAX_EVENTS);
        }
        #[cfg(not(feature = "telemetry"))]
        {
            let _ = event;
        }
    }

    pub fn is_enabled(&self) -> bool {
        cfg!(feature = "telemetry")
    }

    pub fn events(&self) -> Vec<Event> {
        #[cfg(feature = "telemetry")]
        {
            self.events.lock().iter().cloned().collect()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            Vec::new()
        }
    }

    /// The most recent requests, oldest first.
    pub fn api_calls(&self) -> Vec<ApiCall> {
        #[cfg(feature = "telemetry")]
        {
            self.calls.lock().iter().cloned().collect()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            Vec::new()
        }
    }
}

#[cfg(feature = "telemetry")]
fn push_capped<T>(log: &mut VecDeque<T>, entry: T, cap: usize) {
    if log.len() == cap {
        log.pop_front();
    }
    log.push_back(entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_requests_as_api_calls_when_enabled() {
        let handle = Handle::new();
        handle.record(Event::RequestIssued {
            endpoint: "GET /users/u/habit_building".into(),
        });
        handle.record(Event::InitialLoadStarted);
        if handle.is_enabled() {
            assert_eq!(handle.events().len(), 2);
            assert_eq!(handle.api_calls()[0].endpoint, "GET /users/u/habit_building");
        } else {
            assert!(handle.events().is_empty());
            assert!(handle.api_calls().is_empty());
        }
    }

    #[test]
    fn logs_keep_only_the_most_recent_entries() {
        let handle = Handle::new();
        for n in 0..MAX_API_CALLS + 5 {
            handle.record(Event::RequestIssued {
                endpoint: format!("GET /call/{}", n),
            });
        }
        if !handle.is_enabled() {
            return;
        }
        let calls = handle.api_calls();
        assert_eq!(calls.len(), MAX_API_CALLS);
        assert_eq!(calls[0].endpoint, "GET /call/5");
        assert_eq!(
            calls.last().map(|call| call.endpoint.as_str()),
            Some(format!("GET /call/{}", MAX_API_CALLS + 4).as_str())
        );

        for _ in 0..MAX_EVENTS {
            handle.record(Event::InitialLoadStarted);
        }
        let events = handle.events();
        assert_eq!(events.len(), MAX_EVENTS);
        assert!(events.iter().all(|event| *event == Event::InitialLoadStarted));
    }
}
