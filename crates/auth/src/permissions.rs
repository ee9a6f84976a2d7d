use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Opaque strings such as `"templates.write"`. The wildcard `"*"` means
/// "allow all" and is handed out by the policy layer, never put in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permissions guarding the template catalog.
pub mod templates {
    use super::Permission;

    /// Read templates, their matrices and role grants.
    pub const READ: Permission = Permission::from_static("templates.read");
    /// Save template matrices and propagate module grants.
    pub const WRITE: Permission = Permission::from_static("templates.write");
}
