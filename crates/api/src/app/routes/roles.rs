use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use inmoadmin_auth::permissions;
use inmoadmin_core::RoleId;

use crate::app::errors;
use crate::context::RequestContext;
use crate::store::CatalogStore;

pub fn router() -> Router {
    Router::new().route("/:id/modulos", get(get_role_modules))
}

pub async fn get_role_modules(
    Extension(store): Extension<Arc<CatalogStore>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let role_id: RoleId = match errors::parse_id(&id, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = crate::authz::require(&ctx, &permissions::templates::READ) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match store.role_grants(ctx.tenant_id(), role_id) {
        Ok(grants) => (StatusCode::OK, Json(grants)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
