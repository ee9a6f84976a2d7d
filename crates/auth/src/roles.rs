use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Back-office role carried in access tokens.
///
/// Distinct from the CRM roles that inherit from permission templates; those
/// are catalog records identified by `RoleId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Every permission.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    /// Reads and edits permission templates.
    pub const TEMPLATE_ADMIN: Role = Role(Cow::Borrowed("template_admin"));
    /// Reads permission templates.
    pub const VIEWER: Role = Role(Cow::Borrowed("viewer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_roles_equal_their_parsed_form() {
        assert_eq!(Role::new("template_admin"), Role::TEMPLATE_ADMIN);
        let roles: Vec<Role> = serde_json::from_str(r#"["admin","viewer"]"#).unwrap();
        assert_eq!(roles, vec![Role::ADMIN, Role::VIEWER]);
    }
}
