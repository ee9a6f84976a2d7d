//! `inmoadmin-core`: identifiers and the domain error model shared by every
//! crate in the workspace.
//!
//! No IO and no framework types live here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ModuleId, PrincipalId, RoleId, TemplateId, TenantId};
