//! Planner page wiring: aggregation, selection and mutation over one message loop.

pub use self::aggregation::{load_all, select_default, Collections, LoadReport};
pub use self::message::{Effect, Message};
pub use self::options::PlannerOptions;
pub use self::planner::Planner;
pub use self::state::{
    DeletePhase, MutationKind, NavigationRequest, Phase, StatusToast, TaskBoard, ToastKind,
};

mod aggregation;
mod commands;
mod message;
mod mutation;
mod options;
mod planner;
mod runtime;
mod state;
mod update;

#[cfg(test)]
mod tests;
