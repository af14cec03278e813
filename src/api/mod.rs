//! Triage HTTP API.
//!
//! `GET /health`, `POST /triage` and `POST /yandex/prompt`, wrapped in
//! CORS → Audit → no-store. `triage_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::triage_api_router;
pub use server::{start_triage_server, TriageServer, TriageServerSession};
pub use types::ApiContext;
