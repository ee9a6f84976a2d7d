//! Request authorization for catalog routes.
//!
//! Checked in the handler, before the store is touched.

use inmoadmin_auth::{AuthzError, Permission, Principal, Role, TenantMembership, authorize, permissions};

use crate::context::RequestContext;

/// Check that the request principal holds `required` in its tenant.
pub fn require(ctx: &RequestContext, required: &Permission) -> Result<(), AuthzError> {
    let membership = TenantMembership {
        tenant_id: ctx.tenant_id(),
        roles: ctx.roles().to_vec(),
        permissions: permissions_from_roles(ctx.roles()),
    };

    let principal = Principal {
        principal_id: ctx.principal_id(),
        active_tenant_id: ctx.tenant_id(),
        membership,
    };

    authorize(&principal, required)
}

/// Static role→permission policy.
///
/// - `admin`: everything
/// - `template_admin`: read and write templates
/// - `viewer`: read templates
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.contains(&Role::ADMIN) {
        return vec![Permission::new("*")];
    }

    let mut granted = Vec::new();
    if roles.contains(&Role::TEMPLATE_ADMIN) {
        granted.push(permissions::templates::READ);
        granted.push(permissions::templates::WRITE);
    } else if roles.contains(&Role::VIEWER) {
        granted.push(permissions::templates::READ);
    }
    granted
}
