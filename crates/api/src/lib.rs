//! HTTP API: template catalog server, routing and request/response mapping.
//!
//! Serves permission matrices, persists template grants and fans module
//! grants out to the roles inheriting from a template.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
pub mod seed;
pub mod store;
