//! `inmoadmin-permissions`: the template permission matrix.
//!
//! Pure model and edit rules (no IO):
//! - [`model`]: modules, grants, scopes and the capability-dependency rule
//! - [`layout`]: presentation order (category groups, parents before children)
//! - [`matrix`]: the editable table with baseline/dirty tracking and the
//!   propagation guard
//! - [`wire`]: JSON shapes exchanged with the catalog API

pub mod layout;
pub mod matrix;
pub mod model;
pub mod wire;

pub use layout::{CategoryGroup, arrange};
pub use matrix::{MatrixRow, PermissionMatrix, PropagateBlocked};
pub use model::{GrantEdit, GrantField, Module, PermissionGrant, Scope, default_grant};
pub use wire::{
    GrantEntry, MatrixResponse, ModuleEntry, PropagateResponse, RoleGrantsResponse, RoleSummary,
    TemplateList, TemplateSummary,
};
