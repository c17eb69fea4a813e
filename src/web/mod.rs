//! HTTP server module.
//!
//! Serves the documentation page as HTML, as structured JSON for an external
//! page shell, and one sample at a time as plain text.

mod handlers;
mod server;

pub use handlers::USER_HEADER;
pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
