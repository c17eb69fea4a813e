//! aiproxy-docs - API documentation page for an OpenAI-compatible AI proxy
//!
//! This library resolves which example model identifiers the documentation
//! shows for the configured allow-lists, renders the request/response samples,
//! and serves the resulting page over HTTP.

pub mod config;
pub mod docs;
pub mod error;
pub mod verify;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
