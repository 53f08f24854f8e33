//! HTTP API: routing, principal resolution and request/response mapping.

pub mod app;
pub mod middleware;
