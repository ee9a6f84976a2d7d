use axum::{Router, routing::get};

pub mod roles;
pub mod system;
pub mod templates;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/templates", templates::router())
        .nest("/roles", roles::router())
}
