//! Modules, grants and the capability-dependency rule.
//!
//! A [`PermissionGrant`] is what a template (or a role) holds for one
//! [`Module`]. Viewing is the prerequisite of every other capability:
//!
//! - `can_create ⇒ can_view`
//! - `can_edit ⇒ can_view`
//! - `can_delete ⇒ can_view`
//!
//! [`PermissionGrant::apply`] keeps that rule after every single edit.

use serde::{Deserialize, Serialize};

use inmoadmin_core::{DomainError, DomainResult, ModuleId};

// ─────────────────────────────────────────────────────────────────────────────
// Module
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of CRM functionality a role may be granted access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,

    #[serde(rename = "nombre")]
    pub name: String,

    /// Presentational grouping key (e.g. `"crm"`, `"finanzas"`).
    #[serde(rename = "categoria")]
    pub category: String,

    /// Sort key within its category or parent.
    #[serde(rename = "orden")]
    pub order: i32,

    #[serde(rename = "esSubmenu", default)]
    pub is_submenu: bool,

    #[serde(rename = "moduloPadreId", default)]
    pub parent_id: Option<ModuleId>,
}

impl Module {
    pub fn top_level(name: impl Into<String>, category: impl Into<String>, order: i32) -> Self {
        Self {
            id: ModuleId::new(),
            name: name.into(),
            category: category.into(),
            order,
            is_submenu: false,
            parent_id: None,
        }
    }

    pub fn submenu(parent: &Module, name: impl Into<String>, order: i32) -> Self {
        Self {
            id: ModuleId::new(),
            name: name.into(),
            category: parent.category.clone(),
            order,
            is_submenu: true,
            parent_id: Some(parent.id),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

/// How broad a view/edit capability is in terms of record ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Records the grantee owns.
    #[default]
    Own,
    /// Records owned by the grantee's team (office).
    Team,
    /// Every record in the tenant.
    All,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Team => "team",
            Scope::All => "all",
        }
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grant
// ─────────────────────────────────────────────────────────────────────────────

/// Access conferred on one module.
///
/// Only view and edit carry a scope; create and delete are unqualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(rename = "puedeVer")]
    pub can_view: bool,

    #[serde(rename = "puedeCrear")]
    pub can_create: bool,

    #[serde(rename = "puedeEditar")]
    pub can_edit: bool,

    #[serde(rename = "puedeEliminar")]
    pub can_delete: bool,

    #[serde(rename = "alcanceVer", default)]
    pub view_scope: Scope,

    #[serde(rename = "alcanceEditar", default)]
    pub edit_scope: Scope,
}

/// The grant of a module the template says nothing about: every capability
/// off, both scopes `own`.
///
/// Absent and explicitly disabled grants are the same value; saving omits
/// disabled rows and loading fills them back in with this.
pub const fn default_grant() -> PermissionGrant {
    PermissionGrant {
        can_view: false,
        can_create: false,
        can_edit: false,
        can_delete: false,
        view_scope: Scope::Own,
        edit_scope: Scope::Own,
    }
}

impl Default for PermissionGrant {
    fn default() -> Self {
        default_grant()
    }
}

impl PermissionGrant {
    /// View-only grant with the given view scope.
    pub fn view_only(view_scope: Scope) -> Self {
        Self {
            can_view: true,
            view_scope,
            ..default_grant()
        }
    }

    /// Every capability on, both scopes `all`.
    pub fn full() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
            view_scope: Scope::All,
            edit_scope: Scope::All,
        }
    }

    /// Whether the grant confers anything at all (only viewable rows are stored).
    pub fn is_granted(&self) -> bool {
        self.can_view
    }

    /// Whether the capability-dependency rule holds.
    pub fn is_consistent(&self) -> bool {
        self.can_view || !(self.can_create || self.can_edit || self.can_delete)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(DomainError::invariant(
                "create, edit and delete require view (puedeVer)",
            ))
        }
    }

    /// Set one field, then restore the dependency rule for this grant.
    ///
    /// - turning view off turns create/edit/delete off
    /// - turning create, edit or delete on turns view on
    pub fn apply(&mut self, edit: GrantEdit) {
        match edit {
            GrantEdit::View(value) => {
                self.can_view = value;
                if !value {
                    self.can_create = false;
                    self.can_edit = false;
                    self.can_delete = false;
                }
            }
            GrantEdit::Create(value) => {
                self.can_create = value;
                if value {
                    self.can_view = true;
                }
            }
            GrantEdit::Edit(value) => {
                self.can_edit = value;
                if value {
                    self.can_view = true;
                }
            }
            GrantEdit::Delete(value) => {
                self.can_delete = value;
                if value {
                    self.can_view = true;
                }
            }
            GrantEdit::ViewScope(scope) => self.view_scope = scope,
            GrantEdit::EditScope(scope) => self.edit_scope = scope,
        }
    }

    pub fn with(mut self, edit: GrantEdit) -> Self {
        self.apply(edit);
        self
    }

    /// Repair a grant received from outside: without view nothing else holds.
    pub fn normalized(self) -> Self {
        if self.is_consistent() {
            self
        } else {
            self.with(GrantEdit::View(false))
        }
    }

    /// The value this grant reads back as after a save/load cycle.
    pub fn canonical(self) -> Self {
        if self.can_view { self } else { default_grant() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edits
// ─────────────────────────────────────────────────────────────────────────────

/// Names of the editable grant fields (wire names in `Display`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantField {
    View,
    Create,
    Edit,
    Delete,
    ViewScope,
    EditScope,
}

impl GrantField {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantField::View => "puedeVer",
            GrantField::Create => "puedeCrear",
            GrantField::Edit => "puedeEditar",
            GrantField::Delete => "puedeEliminar",
            GrantField::ViewScope => "alcanceVer",
            GrantField::EditScope => "alcanceEditar",
        }
    }
}

impl core::fmt::Display for GrantField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field write: the field together with a value of the right type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantEdit {
    View(bool),
    Create(bool),
    Edit(bool),
    Delete(bool),
    ViewScope(Scope),
    EditScope(Scope),
}

impl GrantEdit {
    pub fn field(&self) -> GrantField {
        match self {
            GrantEdit::View(_) => GrantField::View,
            GrantEdit::Create(_) => GrantField::Create,
            GrantEdit::Edit(_) => GrantField::Edit,
            GrantEdit::Delete(_) => GrantField::Delete,
            GrantEdit::ViewScope(_) => GrantField::ViewScope,
            GrantEdit::EditScope(_) => GrantField::EditScope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabling_edit_turns_view_on() {
        let g = default_grant().with(GrantEdit::Edit(true));
        assert!(g.can_view);
        assert!(g.can_edit);
        assert!(!g.can_create);
        assert!(!g.can_delete);
    }

    #[test]
    fn disabling_view_clears_dependent_capabilities_but_not_scopes() {
        let g = PermissionGrant::full().with(GrantEdit::View(false));
        assert_eq!(
            (g.can_view, g.can_create, g.can_edit, g.can_delete),
            (false, false, false, false)
        );
        assert_eq!(g.view_scope, Scope::All);
        assert_eq!(g.canonical(), default_grant());
    }

    #[test]
    fn disabling_create_leaves_view_alone() {
        let g = PermissionGrant::full().with(GrantEdit::Create(false));
        assert!(g.can_view);
        assert!(!g.can_create);
    }

    #[test]
    fn inconsistent_grant_is_detected_and_normalized() {
        let g = PermissionGrant {
            can_delete: true,
            ..default_grant()
        };
        assert!(!g.is_consistent());
        assert!(matches!(g.validate(), Err(DomainError::InvariantViolation(_))));
        assert_eq!(g.normalized(), default_grant());
    }

    #[test]
    fn grant_uses_wire_field_names() {
        let json = serde_json::to_value(PermissionGrant::view_only(Scope::Team)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "puedeVer": true,
                "puedeCrear": false,
                "puedeEditar": false,
                "puedeEliminar": false,
                "alcanceVer": "team",
                "alcanceEditar": "own",
            })
        );
    }

    #[test]
    fn missing_scopes_default_to_own() {
        let g: PermissionGrant = serde_json::from_value(serde_json::json!({
            "puedeVer": true,
            "puedeCrear": true,
            "puedeEditar": false,
            "puedeEliminar": false,
        }))
        .unwrap();
        assert_eq!(g.view_scope, Scope::Own);
        assert_eq!(g.edit_scope, Scope::Own);
    }

    #[test]
    fn edit_fields_display_as_wire_keys() {
        let json = serde_json::to_value(PermissionGrant::full()).unwrap();
        let edits = [
            GrantEdit::View(true),
            GrantEdit::Create(true),
            GrantEdit::Edit(true),
            GrantEdit::Delete(true),
            GrantEdit::ViewScope(Scope::All),
            GrantEdit::EditScope(Scope::All),
        ];
        for edit in edits {
            let key = edit.field().to_string();
            assert!(json.get(&key).is_some(), "{key} is not a grant key");
        }
    }

    #[test]
    fn submenu_inherits_parent_category() {
        let parent = Module::top_level("Propiedades", "crm", 1);
        let child = Module::submenu(&parent, "Visitas", 2);
        assert!(child.is_submenu);
        assert_eq!(child.parent_id, Some(parent.id));
        assert_eq!(child.category, "crm");
    }
}
