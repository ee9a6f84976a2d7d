use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use inmoadmin_auth::permissions;
use inmoadmin_core::{ModuleId, TemplateId};
use inmoadmin_permissions::{GrantEntry, PermissionGrant, PropagateResponse, TemplateList};

use crate::app::errors;
use crate::context::RequestContext;
use crate::store::CatalogStore;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_templates))
        .route("/:id/matrix", get(get_matrix))
        .route("/:id/modulos", put(replace_modules))
        .route("/:id/modulos/:module_id/propagate", post(propagate_module))
}

pub async fn list_templates(
    Extension(store): Extension<Arc<CatalogStore>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&ctx, &permissions::templates::READ) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let templates = store.list_templates(ctx.tenant_id());
    (StatusCode::OK, Json(TemplateList { templates })).into_response()
}

pub async fn get_matrix(
    Extension(store): Extension<Arc<CatalogStore>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let template_id: TemplateId = match errors::parse_id(&id, "template") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = crate::authz::require(&ctx, &permissions::templates::READ) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match store.matrix(ctx.tenant_id(), template_id) {
        Ok(matrix) => (StatusCode::OK, Json(matrix)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Replace the template's grant set. Modules not listed end up with no grant.
pub async fn replace_modules(
    Extension(store): Extension<Arc<CatalogStore>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<Vec<GrantEntry>>,
) -> axum::response::Response {
    let template_id: TemplateId = match errors::parse_id(&id, "template") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = crate::authz::require(&ctx, &permissions::templates::WRITE) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match store.replace_grants(ctx.tenant_id(), template_id, &body) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Copy the template's grant for one module onto every inheriting role.
pub async fn propagate_module(
    Extension(store): Extension<Arc<CatalogStore>>,
    Extension(ctx): Extension<RequestContext>,
    Path((id, module_id)): Path<(String, String)>,
    Json(grant): Json<PermissionGrant>,
) -> axum::response::Response {
    let template_id: TemplateId = match errors::parse_id(&id, "template") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let module_id: ModuleId = match errors::parse_id(&module_id, "module") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = crate::authz::require(&ctx, &permissions::templates::WRITE) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match store.propagate(ctx.tenant_id(), template_id, module_id, grant) {
        Ok(propagated_count) => {
            (StatusCode::OK, Json(PropagateResponse { propagated_count })).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
