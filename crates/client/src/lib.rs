//! Network side of planboard: the request primitive and the typed planner endpoints.

pub mod api;
pub mod fetcher;
#[cfg(any(test, feature = "stub"))]
pub mod stub;

pub use api::{CreateError, PlannerApi};
pub use fetcher::{
    FailureKind, FetchFailure, Fetcher, HttpTransport, Method, RequestObserver, Transport,
    TransportError, TransportRequest, TransportResponse,
};
#[cfg(any(test, feature = "stub"))]
pub use stub::StubTransport;
