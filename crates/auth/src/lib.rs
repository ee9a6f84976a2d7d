//! `inmoadmin-auth`: authentication/authorization boundary.
//!
//! Server side: JWT claims, HS256 validation and RBAC checks.
//! Client side: the bearer [`Credential`] and the [`SessionProvider`] it is
//! fetched from before every remote call.
//!
//! Nothing here depends on HTTP or storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod roles;
pub mod session;

pub use authorize::{AuthzError, Principal, TenantMembership, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use roles::Role;

pub use inmoadmin_core::PrincipalId;
pub use session::{Credential, SessionProvider, StaticSession};
