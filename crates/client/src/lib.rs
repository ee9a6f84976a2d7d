//! `inmoadmin-client`
//!
//! **Responsibility:** load, edit, save and propagate a template's permission
//! matrix against the catalog API.
//!
//! - [`MatrixApi`]: the remote calls, each taking an explicit credential
//! - [`HttpMatrixApi`]: `reqwest` implementation of it
//! - [`MatrixEditor`]: the stateful controller a UI binds to (table, dirty
//!   state, in-flight operations, error banner)

pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod http;

pub use api::MatrixApi;
pub use config::{ClientConfig, ConfigError};
pub use editor::{Banner, BannerKind, MatrixEditor, PropagationOutcome};
pub use error::{ClientError, EditorError};
pub use http::HttpMatrixApi;
