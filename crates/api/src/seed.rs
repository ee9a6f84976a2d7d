//! Catalog seeding: JSON seed files and the built-in demo catalog.
//!
//! A seed file is a JSON array of tenants:
//!
//! ```json
//! [{ "tenantId": "...", "modulos": [...], "plantillas": [...], "roles": [...] }]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use inmoadmin_core::{RoleId, TemplateId, TenantId};
use inmoadmin_permissions::{GrantEdit, GrantEntry, Module, PermissionGrant, Scope};

use crate::store::{CatalogStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(rename = "modulos", default)]
    pub modules: Vec<Module>,
    #[serde(rename = "plantillas", default)]
    pub templates: Vec<TemplateSeed>,
    #[serde(default)]
    pub roles: Vec<RoleSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSeed {
    pub id: TemplateId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "modulos", default)]
    pub modules: Vec<GrantEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSeed {
    pub id: RoleId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "plantillaId", default)]
    pub template_id: Option<TemplateId>,
    #[serde(rename = "modulos", default)]
    pub modules: Vec<GrantEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSeed {
    #[serde(rename = "tenantId")]
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub catalog: CatalogSeed,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tenant {tenant_id}: {source}")]
    Store {
        tenant_id: TenantId,
        #[source]
        source: StoreError,
    },
}

/// Seed every tenant listed in the file at `path`. Returns the tenant count.
pub fn load_seed_file(store: &CatalogStore, path: &Path) -> Result<usize, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    let tenants: Vec<TenantSeed> = serde_json::from_str(&raw)?;
    let count = tenants.len();

    for tenant in tenants {
        let tenant_id = tenant.tenant_id;
        store
            .seed_tenant(tenant_id, tenant.catalog)
            .map_err(|source| SeedError::Store { tenant_id, source })?;
    }

    Ok(count)
}

/// Small real-estate catalog used when no seed file is configured.
///
/// Two templates: `Agente` (inherited by two branch roles) and `Coordinador`
/// (inherited by one).
pub fn demo_catalog() -> CatalogSeed {
    let propiedades = Module::top_level("Propiedades", "crm", 1);
    let importador = Module::submenu(&propiedades, "Importador", 2);
    let fichas = Module::submenu(&propiedades, "Fichas", 1);
    let contactos = Module::top_level("Contactos", "crm", 2);
    let flyers = Module::top_level("Flyers", "marketing", 1);
    let pagos = Module::top_level("Pagos", "finanzas", 1);
    let equipos = Module::top_level("Equipos", "admin", 1);
    let oficinas = Module::submenu(&equipos, "Oficinas", 1);

    let agente = TemplateId::new();
    let coordinador = TemplateId::new();

    let grant = |module: &Module, grant: PermissionGrant| GrantEntry {
        module_id: module.id,
        grant,
    };

    let agente_grants = vec![
        grant(&propiedades, PermissionGrant::view_only(Scope::All)),
        grant(
            &fichas,
            PermissionGrant::view_only(Scope::Own).with(GrantEdit::Edit(true)),
        ),
        grant(&contactos, PermissionGrant::view_only(Scope::Own)),
        grant(&flyers, PermissionGrant::view_only(Scope::All)),
    ];
    let coordinador_grants = vec![
        grant(&propiedades, PermissionGrant::full()),
        grant(&importador, PermissionGrant::full()),
        grant(&fichas, PermissionGrant::full()),
        grant(&contactos, PermissionGrant::view_only(Scope::Team)),
        grant(&pagos, PermissionGrant::view_only(Scope::Team)),
        grant(&equipos, PermissionGrant::view_only(Scope::All)),
    ];

    let role = |name: &str, template_id: TemplateId, modules: &[GrantEntry]| RoleSeed {
        id: RoleId::new(),
        name: name.to_string(),
        template_id: Some(template_id),
        modules: modules.to_vec(),
    };

    CatalogSeed {
        roles: vec![
            role("Agente Centro", agente, &agente_grants),
            role("Agente Norte", agente, &agente_grants),
            role("Coordinador", coordinador, &coordinador_grants),
        ],
        templates: vec![
            TemplateSeed {
                id: agente,
                name: "Agente".to_string(),
                modules: agente_grants,
            },
            TemplateSeed {
                id: coordinador,
                name: "Coordinador".to_string(),
                modules: coordinador_grants,
            },
        ],
        modules: vec![
            propiedades,
            importador,
            fichas,
            contactos,
            flyers,
            pagos,
            equipos,
            oficinas,
        ],
    }
}
