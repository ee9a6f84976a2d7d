//! Tenant-isolated in-memory template catalog.
//!
//! Holds, per tenant, the module list, the templates with their grants and
//! the roles (each optionally inheriting from one template). Only viewable
//! grants are stored; a module without a stored grant reads back as
//! `default_grant()`.
//!
//! Every mutation validates its whole input before writing, under one write
//! lock, so a rejected request leaves the catalog unchanged and a
//! propagation is all-or-nothing.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use inmoadmin_core::{DomainError, ModuleId, RoleId, TemplateId, TenantId};
use inmoadmin_permissions::{
    GrantEntry, MatrixResponse, Module, ModuleEntry, PermissionGrant, RoleGrantsResponse,
    RoleSummary, TemplateSummary,
};

use crate::seed::CatalogSeed;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("template {0} not found")]
    TemplateNotFound(TemplateId),

    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),

    #[error("role {0} not found")]
    RoleNotFound(RoleId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone)]
struct TemplateRecord {
    summary: TemplateSummary,
    grants: HashMap<ModuleId, PermissionGrant>,
}

#[derive(Debug, Clone)]
struct RoleRecord {
    summary: RoleSummary,
    grants: HashMap<ModuleId, PermissionGrant>,
}

#[derive(Debug, Clone, Default)]
struct TenantCatalog {
    modules: Vec<Module>,
    templates: Vec<TemplateRecord>,
    roles: Vec<RoleRecord>,
}

impl TenantCatalog {
    fn has_module(&self, module_id: ModuleId) -> bool {
        self.modules.iter().any(|m| m.id == module_id)
    }

    fn template(&self, template_id: TemplateId) -> Result<&TemplateRecord, StoreError> {
        self.templates
            .iter()
            .find(|t| t.summary.id == template_id)
            .ok_or(StoreError::TemplateNotFound(template_id))
    }

    fn template_mut(&mut self, template_id: TemplateId) -> Result<&mut TemplateRecord, StoreError> {
        self.templates
            .iter_mut()
            .find(|t| t.summary.id == template_id)
            .ok_or(StoreError::TemplateNotFound(template_id))
    }

    /// Validate a full grant set and keep only the viewable entries.
    fn checked_grants(&self, entries: &[GrantEntry]) -> Result<HashMap<ModuleId, PermissionGrant>, StoreError> {
        let mut seen = HashSet::new();
        let mut grants = HashMap::new();
        for entry in entries {
            if !self.has_module(entry.module_id) {
                return Err(StoreError::ModuleNotFound(entry.module_id));
            }
            if !seen.insert(entry.module_id) {
                return Err(DomainError::validation(format!(
                    "module {} listed more than once",
                    entry.module_id
                ))
                .into());
            }
            entry.grant.validate()?;
            if entry.grant.is_granted() {
                grants.insert(entry.module_id, entry.grant);
            }
        }
        Ok(grants)
    }
}

fn sorted_entries(grants: &HashMap<ModuleId, PermissionGrant>) -> Vec<GrantEntry> {
    let mut entries: Vec<GrantEntry> = grants
        .iter()
        .map(|(module_id, grant)| GrantEntry {
            module_id: *module_id,
            grant: *grant,
        })
        .collect();
    entries.sort_by_key(|e| e.module_id);
    entries
}

#[derive(Debug, Default)]
pub struct CatalogStore {
    inner: RwLock<HashMap<TenantId, TenantCatalog>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TenantId, TenantCatalog>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TenantId, TenantCatalog>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace a tenant's catalog with `seed`.
    ///
    /// Module ids must be unique within the seed.
    pub fn seed_tenant(&self, tenant_id: TenantId, seed: CatalogSeed) -> Result<(), StoreError> {
        let mut module_ids = HashSet::new();
        if let Some(dup) = seed.modules.iter().find(|m| !module_ids.insert(m.id)) {
            return Err(DomainError::validation(format!("module {} seeded more than once", dup.id)).into());
        }

        let mut catalog = TenantCatalog {
            modules: seed.modules,
            ..TenantCatalog::default()
        };

        for template in seed.templates {
            let grants = catalog.checked_grants(&template.modules)?;
            catalog.templates.push(TemplateRecord {
                summary: TemplateSummary {
                    id: template.id,
                    name: template.name,
                },
                grants,
            });
        }

        for role in seed.roles {
            if let Some(template_id) = role.template_id {
                catalog.template(template_id)?;
            }
            let grants = catalog.checked_grants(&role.modules)?;
            catalog.roles.push(RoleRecord {
                summary: RoleSummary {
                    id: role.id,
                    name: role.name,
                    template_id: role.template_id,
                },
                grants,
            });
        }

        tracing::info!(
            %tenant_id,
            modules = catalog.modules.len(),
            templates = catalog.templates.len(),
            roles = catalog.roles.len(),
            "tenant catalog seeded"
        );
        self.write().insert(tenant_id, catalog);
        Ok(())
    }

    /// Templates of a tenant, sorted by name.
    pub fn list_templates(&self, tenant_id: TenantId) -> Vec<TemplateSummary> {
        let guard = self.read();
        let mut templates: Vec<TemplateSummary> = guard
            .get(&tenant_id)
            .map(|c| c.templates.iter().map(|t| t.summary.clone()).collect())
            .unwrap_or_default();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        templates
    }

    /// Every module of the tenant with the template's grant where one is stored.
    pub fn matrix(&self, tenant_id: TenantId, template_id: TemplateId) -> Result<MatrixResponse, StoreError> {
        let guard = self.read();
        let catalog = guard
            .get(&tenant_id)
            .ok_or(StoreError::TemplateNotFound(template_id))?;
        let template = catalog.template(template_id)?;

        Ok(MatrixResponse {
            template: template.summary.clone(),
            modules: catalog
                .modules
                .iter()
                .map(|m| ModuleEntry {
                    module: m.clone(),
                    grant: template.grants.get(&m.id).copied(),
                })
                .collect(),
        })
    }

    /// Replace the template's grant set. Returns the number of grants stored.
    pub fn replace_grants(
        &self,
        tenant_id: TenantId,
        template_id: TemplateId,
        entries: &[GrantEntry],
    ) -> Result<usize, StoreError> {
        let mut guard = self.write();
        let catalog = guard
            .get_mut(&tenant_id)
            .ok_or(StoreError::TemplateNotFound(template_id))?;
        catalog.template(template_id)?;

        let grants = catalog.checked_grants(entries)?;
        let stored = grants.len();

        let template = catalog.template_mut(template_id)?;
        template.grants = grants;

        tracing::info!(%tenant_id, %template_id, stored, "template grants replaced");
        Ok(stored)
    }

    /// Overwrite `module_id` on every role inheriting from the template.
    ///
    /// `grant` must be viewable and equal to the grant the template has
    /// persisted for the module; anything else is refused before any role is
    /// touched. Returns the number of roles updated.
    pub fn propagate(
        &self,
        tenant_id: TenantId,
        template_id: TemplateId,
        module_id: ModuleId,
        grant: PermissionGrant,
    ) -> Result<u32, StoreError> {
        let mut guard = self.write();
        let catalog = guard
            .get_mut(&tenant_id)
            .ok_or(StoreError::TemplateNotFound(template_id))?;
        let template = catalog.template(template_id)?;
        if !catalog.has_module(module_id) {
            return Err(StoreError::ModuleNotFound(module_id));
        }

        grant.validate()?;
        if !grant.is_granted() {
            return Err(DomainError::validation("a grant without puedeVer cannot be propagated").into());
        }
        if template.grants.get(&module_id) != Some(&grant) {
            return Err(DomainError::conflict(format!(
                "grant differs from the one persisted for module {module_id}; save the template first"
            ))
            .into());
        }

        let mut count = 0u32;
        for role in catalog
            .roles
            .iter_mut()
            .filter(|r| r.summary.template_id == Some(template_id))
        {
            role.grants.insert(module_id, grant);
            count += 1;
        }

        tracing::info!(%tenant_id, %template_id, %module_id, roles = count, "module grant propagated");
        Ok(count)
    }

    /// A role's own grants (viewable ones only), sorted by module id.
    pub fn role_grants(&self, tenant_id: TenantId, role_id: RoleId) -> Result<RoleGrantsResponse, StoreError> {
        let guard = self.read();
        let role = guard
            .get(&tenant_id)
            .and_then(|c| c.roles.iter().find(|r| r.summary.id == role_id))
            .ok_or(StoreError::RoleNotFound(role_id))?;

        Ok(RoleGrantsResponse {
            role: role.summary.clone(),
            modules: sorted_entries(&role.grants),
        })
    }
}
