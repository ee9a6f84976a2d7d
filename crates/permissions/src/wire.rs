//! JSON shapes of the template catalog API.
//!
//! Field names follow the API (`nombre`, `modulos`, `moduloId`, ...).

use serde::{Deserialize, Serialize};

use inmoadmin_core::{ModuleId, RoleId, TemplateId};

use crate::model::{Module, PermissionGrant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: TemplateId,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// `GET /templates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateList {
    pub templates: Vec<TemplateSummary>,
}

/// A module as listed in a template matrix, with the template's grant if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    #[serde(flatten)]
    pub module: Module,
    #[serde(rename = "permisos", default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<PermissionGrant>,
}

/// `GET /templates/{templateId}/matrix`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixResponse {
    pub template: TemplateSummary,
    #[serde(rename = "modulos")]
    pub modules: Vec<ModuleEntry>,
}

/// One element of the `PUT /templates/{templateId}/modulos` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    #[serde(rename = "moduloId")]
    pub module_id: ModuleId,
    #[serde(flatten)]
    pub grant: PermissionGrant,
}

/// `POST /templates/{templateId}/modulos/{moduloId}/propagate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagateResponse {
    pub propagated_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: RoleId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "plantillaId")]
    pub template_id: Option<TemplateId>,
}

/// `GET /roles/{roleId}/modulos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantsResponse {
    pub role: RoleSummary,
    #[serde(rename = "modulos")]
    pub modules: Vec<GrantEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scope;

    #[test]
    fn module_entry_reads_api_shape_without_grant() {
        let id = ModuleId::new();
        let parent = ModuleId::new();
        let entry: ModuleEntry = serde_json::from_value(serde_json::json!({
            "id": id.to_string(),
            "nombre": "Importador",
            "categoria": "propiedades",
            "orden": 3,
            "esSubmenu": true,
            "moduloPadreId": parent.to_string(),
        }))
        .unwrap();

        assert_eq!(entry.module.id, id);
        assert_eq!(entry.module.parent_id, Some(parent));
        assert!(entry.module.is_submenu);
        assert_eq!(entry.grant, None);
    }

    #[test]
    fn grant_entry_is_flat() {
        let module_id = ModuleId::new();
        let entry = GrantEntry {
            module_id,
            grant: PermissionGrant::view_only(Scope::All),
        };
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["moduloId"], module_id.to_string());
        assert_eq!(json["puedeVer"], true);
        assert_eq!(json["alcanceVer"], "all");
    }

    #[test]
    fn propagate_response_uses_camel_case() {
        let r: PropagateResponse =
            serde_json::from_str(r#"{"propagatedCount": 4}"#).unwrap();
        assert_eq!(r.propagated_count, 4);
    }
}
