//! State engine behind the planner page: collections, selection, tasks and mutations.

mod app;
mod telemetry;

pub use app::{
    load_all, select_default, Collections, DeletePhase, Effect, LoadReport, Message,
    MutationKind, NavigationRequest, Phase, Planner, PlannerOptions, StatusToast, TaskBoard,
    ToastKind,
};
pub use telemetry::{
    ApiCall, Event as TelemetryEvent, Handle as TelemetryHandle, MAX_API_CALLS, MAX_EVENTS,
};
