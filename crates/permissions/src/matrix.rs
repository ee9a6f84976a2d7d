//! Editable permission matrix of one template.
//!
//! The table is built from a [`MatrixResponse`], edited in memory, and
//! compared against the baseline it was loaded (or last saved) with. It is
//! dirty whenever some row differs from that baseline.
//!
//! # Invariants
//! - Every row satisfies the capability-dependency rule after every edit,
//!   single-row or bulk.
//! - Propagation is only allowed from a clean table, for a known module that
//!   has a view grant.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use inmoadmin_core::ModuleId;

use crate::layout::{CategoryGroup, arrange};
use crate::model::{GrantEdit, Module, PermissionGrant, default_grant};
use crate::wire::{GrantEntry, MatrixResponse, TemplateSummary};

/// One module and the template's current (possibly edited) grant for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub module: Module,
    pub grant: PermissionGrant,
}

impl AsRef<Module> for MatrixRow {
    fn as_ref(&self) -> &Module {
        &self.module
    }
}

/// Why a module cannot be propagated right now.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagateBlocked {
    #[error("module {0} is not part of this template")]
    UnknownModule(ModuleId),

    #[error("there are unsaved changes; save before propagating")]
    UnsavedChanges,

    #[error("module {0} has no view grant to propagate")]
    NotGranted(ModuleId),
}

#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    template: TemplateSummary,
    groups: Vec<CategoryGroup<MatrixRow>>,
    baseline: HashMap<ModuleId, PermissionGrant>,
}

impl PermissionMatrix {
    /// Build the table from a loaded matrix.
    ///
    /// Modules without a grant get [`default_grant`]. Grants that break the
    /// dependency rule are normalised so the table starts consistent. A module
    /// listed twice keeps its first entry.
    pub fn from_response(response: MatrixResponse) -> Self {
        let mut seen = HashSet::new();
        let rows: Vec<MatrixRow> = response
            .modules
            .into_iter()
            .filter(|entry| {
                let first = seen.insert(entry.module.id);
                if !first {
                    tracing::warn!(
                        template_id = %response.template.id,
                        module_id = %entry.module.id,
                        "duplicate module in matrix response ignored"
                    );
                }
                first
            })
            .map(|entry| {
                let received = entry.grant.unwrap_or_else(default_grant);
                let grant = received.normalized();
                if grant != received {
                    tracing::warn!(
                        template_id = %response.template.id,
                        module_id = %entry.module.id,
                        "normalized inconsistent grant received from server"
                    );
                }
                MatrixRow {
                    module: entry.module,
                    grant,
                }
            })
            .collect();

        let baseline = rows.iter().map(|r| (r.module.id, r.grant)).collect();

        Self {
            template: response.template,
            groups: arrange(rows),
            baseline,
        }
    }

    pub fn template(&self) -> &TemplateSummary {
        &self.template
    }

    /// Rows grouped by category, in display order.
    pub fn groups(&self) -> &[CategoryGroup<MatrixRow>] {
        &self.groups
    }

    pub fn rows(&self) -> impl Iterator<Item = &MatrixRow> + '_ {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut MatrixRow> + '_ {
        self.groups.iter_mut().flat_map(|g| g.items.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    pub fn row(&self, module_id: ModuleId) -> Option<&MatrixRow> {
        self.rows().find(|r| r.module.id == module_id)
    }

    pub fn grant(&self, module_id: ModuleId) -> Option<PermissionGrant> {
        self.row(module_id).map(|r| r.grant)
    }

    // ── edits ────────────────────────────────────────────────────────────────

    /// Apply one field write to one module.
    ///
    /// Returns `false` (and changes nothing) for a module not in the table.
    pub fn set_field(&mut self, module_id: ModuleId, edit: GrantEdit) -> bool {
        match self.rows_mut().find(|r| r.module.id == module_id) {
            Some(row) => {
                row.grant.apply(edit);
                true
            }
            None => {
                tracing::debug!(%module_id, field = %edit.field(), "edit for unknown module ignored");
                false
            }
        }
    }

    /// Apply the same field write to every row.
    pub fn set_field_for_all(&mut self, edit: GrantEdit) {
        for row in self.rows_mut() {
            row.grant.apply(edit);
        }
    }

    /// Apply the same field write to every row of one category group.
    ///
    /// Returns the number of rows touched.
    pub fn set_field_for_category(&mut self, category: &str, edit: GrantEdit) -> usize {
        let mut touched = 0;
        for group in self.groups.iter_mut().filter(|g| g.category == category) {
            for row in group.items.iter_mut() {
                row.grant.apply(edit);
                touched += 1;
            }
        }
        touched
    }

    /// Revert every row to the baseline.
    pub fn discard_changes(&mut self) {
        let baseline = &self.baseline;
        for group in self.groups.iter_mut() {
            for row in group.items.iter_mut() {
                if let Some(grant) = baseline.get(&row.module.id) {
                    row.grant = *grant;
                }
            }
        }
    }

    // ── dirty tracking ───────────────────────────────────────────────────────

    pub fn is_dirty(&self) -> bool {
        self.rows().any(|r| self.baseline.get(&r.module.id) != Some(&r.grant))
    }

    /// Modules whose grant differs from the baseline, in display order.
    pub fn changed_modules(&self) -> Vec<ModuleId> {
        self.rows()
            .filter(|r| self.baseline.get(&r.module.id) != Some(&r.grant))
            .map(|r| r.module.id)
            .collect()
    }

    // ── save ─────────────────────────────────────────────────────────────────

    /// Current grant of every row, keyed by module.
    pub fn grants(&self) -> HashMap<ModuleId, PermissionGrant> {
        self.rows().map(|r| (r.module.id, r.grant)).collect()
    }

    /// Body of a save: rows with a view grant only. Omitted rows read back as
    /// [`default_grant`].
    pub fn entries_for_save(&self) -> Vec<GrantEntry> {
        self.rows()
            .filter(|r| r.grant.is_granted())
            .map(|r| GrantEntry {
                module_id: r.module.id,
                grant: r.grant,
            })
            .collect()
    }

    /// Make a successfully saved snapshot the new baseline.
    ///
    /// Disabled rows are stored as "no grant", so their baseline becomes
    /// [`default_grant`]. Rows edited after the snapshot was taken keep their
    /// edits and stay dirty.
    pub fn commit_baseline(&mut self, saved: &HashMap<ModuleId, PermissionGrant>) {
        let baseline = &mut self.baseline;
        for group in self.groups.iter_mut() {
            for row in group.items.iter_mut() {
                let Some(saved_grant) = saved.get(&row.module.id) else {
                    continue;
                };
                let canonical = saved_grant.canonical();
                baseline.insert(row.module.id, canonical);
                if row.grant == *saved_grant {
                    row.grant = canonical;
                }
            }
        }
    }

    /// [`commit_baseline`](Self::commit_baseline) with the current rows.
    pub fn mark_saved(&mut self) {
        let saved = self.grants();
        self.commit_baseline(&saved);
    }

    // ── propagation guard ────────────────────────────────────────────────────

    /// Check whether `module_id` may be propagated and return the grant to send.
    ///
    /// The table must be clean, so the returned grant is the persisted one.
    pub fn propagation_guard(&self, module_id: ModuleId) -> Result<PermissionGrant, PropagateBlocked> {
        let row = self
            .row(module_id)
            .ok_or(PropagateBlocked::UnknownModule(module_id))?;
        if self.is_dirty() {
            return Err(PropagateBlocked::UnsavedChanges);
        }
        if !row.grant.is_granted() {
            return Err(PropagateBlocked::NotGranted(module_id));
        }
        Ok(row.grant)
    }

    /// Table-level gate: nothing may be propagated while there are unsaved edits.
    pub fn can_propagate(&self) -> bool {
        !self.is_dirty()
    }

    pub fn can_propagate_module(&self, module_id: ModuleId) -> bool {
        self.propagation_guard(module_id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scope;
    use crate::wire::ModuleEntry;
    use inmoadmin_core::TemplateId;
    use proptest::prelude::*;

    fn template() -> TemplateSummary {
        TemplateSummary {
            id: TemplateId::new(),
            name: "Agente".to_string(),
        }
    }

    fn entry(module: Module, grant: Option<PermissionGrant>) -> ModuleEntry {
        ModuleEntry { module, grant }
    }

    fn matrix_of(entries: Vec<ModuleEntry>) -> PermissionMatrix {
        PermissionMatrix::from_response(MatrixResponse {
            template: template(),
            modules: entries,
        })
    }

    fn flags(g: PermissionGrant) -> (bool, bool, bool, bool) {
        (g.can_view, g.can_create, g.can_edit, g.can_delete)
    }

    #[test]
    fn absent_grant_loads_as_default() {
        let m = Module::top_level("Propiedades", "crm", 1);
        let id = m.id;
        let matrix = matrix_of(vec![entry(m, None)]);

        assert_eq!(matrix.grant(id), Some(default_grant()));
        assert!(!matrix.is_dirty());
    }

    #[test]
    fn edit_then_unview_scenario() {
        let m1 = Module::top_level("M1", "crm", 1);
        let id = m1.id;
        let mut matrix = matrix_of(vec![entry(m1, None)]);

        assert!(matrix.set_field(id, GrantEdit::Edit(true)));
        assert_eq!(flags(matrix.grant(id).unwrap()), (true, false, true, false));
        assert!(matrix.is_dirty());

        matrix.set_field(id, GrantEdit::View(false));
        assert_eq!(flags(matrix.grant(id).unwrap()), (false, false, false, false));
    }

    #[test]
    fn module_listed_twice_loads_once_and_clean() {
        let m = Module::top_level("Propiedades", "crm", 1);
        let id = m.id;
        let matrix = matrix_of(vec![
            entry(m.clone(), Some(PermissionGrant::full())),
            entry(m, None),
        ]);

        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.rows().count(), 1);
        assert_eq!(matrix.grant(id), Some(PermissionGrant::full()));
        assert!(!matrix.is_dirty());
    }

    #[test]
    fn unknown_module_edit_is_a_noop() {
        let m = Module::top_level("Contactos", "crm", 1);
        let mut matrix = matrix_of(vec![entry(m, None)]);

        assert!(!matrix.set_field(ModuleId::new(), GrantEdit::View(true)));
        assert!(!matrix.is_dirty());
    }

    #[test]
    fn view_for_all_keeps_existing_capabilities() {
        let enabled = PermissionGrant {
            can_view: true,
            can_create: true,
            can_edit: false,
            can_delete: true,
            view_scope: Scope::Team,
            edit_scope: Scope::Own,
        };
        let modules: Vec<Module> = (0..5)
            .map(|i| Module::top_level(format!("M{i}"), "crm", i))
            .collect();
        let entries = modules
            .iter()
            .enumerate()
            .map(|(i, m)| entry(m.clone(), if i < 2 { None } else { Some(enabled) }))
            .collect();
        let mut matrix = matrix_of(entries);

        matrix.set_field_for_all(GrantEdit::View(true));

        for (i, m) in modules.iter().enumerate() {
            let g = matrix.grant(m.id).unwrap();
            assert!(g.can_view);
            if i >= 2 {
                assert_eq!(g, enabled);
            } else {
                assert_eq!(flags(g), (true, false, false, false));
            }
        }
    }

    #[test]
    fn bulk_clear_is_idempotent() {
        let modules: Vec<Module> = (0..3)
            .map(|i| Module::top_level(format!("M{i}"), "crm", i))
            .collect();
        let entries = modules
            .iter()
            .map(|m| entry(m.clone(), Some(PermissionGrant::full())))
            .collect();
        let mut matrix = matrix_of(entries);

        matrix.set_field_for_all(GrantEdit::View(false));
        let once = matrix.grants();
        matrix.set_field_for_all(GrantEdit::View(false));

        assert_eq!(matrix.grants(), once);
        assert!(matrix.rows().all(|r| !r.grant.can_view
            && !r.grant.can_create
            && !r.grant.can_edit
            && !r.grant.can_delete));
    }

    #[test]
    fn category_bulk_edit_touches_only_that_group() {
        let crm = Module::top_level("Contactos", "crm", 1);
        let sub = Module::submenu(&crm, "Etiquetas", 1);
        let fin = Module::top_level("Pagos", "finanzas", 2);
        let (crm_id, sub_id, fin_id) = (crm.id, sub.id, fin.id);
        let mut matrix = matrix_of(vec![entry(crm, None), entry(sub, None), entry(fin, None)]);

        assert_eq!(matrix.set_field_for_category("crm", GrantEdit::Create(true)), 2);
        assert!(matrix.grant(crm_id).unwrap().can_create);
        assert!(matrix.grant(sub_id).unwrap().can_view);
        assert_eq!(matrix.grant(fin_id), Some(default_grant()));
    }

    #[test]
    fn save_body_only_contains_viewable_rows() {
        let a = Module::top_level("A", "crm", 1);
        let b = Module::top_level("B", "crm", 2);
        let (a_id, b_id) = (a.id, b.id);
        let mut matrix = matrix_of(vec![entry(a, None), entry(b, Some(PermissionGrant::full()))]);

        matrix.set_field(a_id, GrantEdit::Delete(true));
        matrix.set_field(b_id, GrantEdit::View(false));

        let body = matrix.entries_for_save();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].module_id, a_id);
        assert_eq!(flags(body[0].grant), (true, false, false, true));
    }

    #[test]
    fn save_then_reload_reproduces_the_table() {
        let a = Module::top_level("A", "crm", 1);
        let b = Module::top_level("B", "crm", 2);
        let (a_id, b_id) = (a.id, b.id);
        let modules = vec![a.clone(), b.clone()];
        let mut matrix = matrix_of(vec![entry(a, None), entry(b, Some(PermissionGrant::full()))]);

        matrix.set_field(a_id, GrantEdit::Edit(true));
        matrix.set_field(a_id, GrantEdit::EditScope(Scope::Team));
        matrix.set_field(b_id, GrantEdit::ViewScope(Scope::Team));
        matrix.set_field(b_id, GrantEdit::View(false));

        let body = matrix.entries_for_save();
        matrix.mark_saved();
        assert!(!matrix.is_dirty());

        // What the server would answer after storing `body`.
        let stored: HashMap<ModuleId, PermissionGrant> =
            body.iter().map(|e| (e.module_id, e.grant)).collect();
        let reloaded = matrix_of(
            modules
                .into_iter()
                .map(|m| {
                    let grant = stored.get(&m.id).copied();
                    entry(m, grant)
                })
                .collect(),
        );

        assert_eq!(reloaded.grants(), matrix.grants());
        assert_eq!(reloaded.grant(b_id), Some(default_grant()));
    }

    #[test]
    fn edits_made_after_the_save_snapshot_stay_dirty() {
        let a = Module::top_level("A", "crm", 1);
        let id = a.id;
        let mut matrix = matrix_of(vec![entry(a, None)]);

        matrix.set_field(id, GrantEdit::View(true));
        let snapshot = matrix.grants();
        matrix.set_field(id, GrantEdit::Create(true));

        matrix.commit_baseline(&snapshot);
        assert_eq!(matrix.changed_modules(), vec![id]);

        matrix.discard_changes();
        assert_eq!(flags(matrix.grant(id).unwrap()), (true, false, false, false));
        assert!(!matrix.is_dirty());
    }

    #[test]
    fn propagation_requires_clean_table_and_view_grant() {
        let a = Module::top_level("A", "crm", 1);
        let b = Module::top_level("B", "crm", 2);
        let (a_id, b_id) = (a.id, b.id);
        let mut matrix = matrix_of(vec![entry(a, Some(PermissionGrant::full())), entry(b, None)]);

        assert_eq!(matrix.propagation_guard(a_id), Ok(PermissionGrant::full()));
        assert_eq!(matrix.propagation_guard(b_id), Err(PropagateBlocked::NotGranted(b_id)));

        let stranger = ModuleId::new();
        assert_eq!(
            matrix.propagation_guard(stranger),
            Err(PropagateBlocked::UnknownModule(stranger))
        );

        matrix.set_field(b_id, GrantEdit::View(true));
        assert!(!matrix.can_propagate());
        assert_eq!(matrix.propagation_guard(a_id), Err(PropagateBlocked::UnsavedChanges));

        // Toggling back to the baseline makes the table clean again.
        matrix.set_field(b_id, GrantEdit::View(false));
        assert!(matrix.can_propagate_module(a_id));
    }

    #[derive(Debug, Clone)]
    enum Op {
        One(usize, GrantEdit),
        All(GrantEdit),
    }

    fn scope() -> impl Strategy<Value = Scope> {
        prop_oneof![Just(Scope::Own), Just(Scope::Team), Just(Scope::All)]
    }

    fn grant_edit() -> impl Strategy<Value = GrantEdit> {
        prop_oneof![
            any::<bool>().prop_map(GrantEdit::View),
            any::<bool>().prop_map(GrantEdit::Create),
            any::<bool>().prop_map(GrantEdit::Edit),
            any::<bool>().prop_map(GrantEdit::Delete),
            scope().prop_map(GrantEdit::ViewScope),
            scope().prop_map(GrantEdit::EditScope),
        ]
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0usize..6, grant_edit()).prop_map(|(i, e)| Op::One(i, e)),
            1 => grant_edit().prop_map(Op::All),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of single or bulk edits leaves a row with
        /// create/edit/delete but without view.
        #[test]
        fn dependency_rule_holds_after_every_edit(ops in prop::collection::vec(op(), 1..40)) {
            let modules: Vec<Module> = (0..5)
                .map(|i| Module::top_level(format!("M{i}"), "crm", i))
                .collect();
            let mut matrix = matrix_of(modules.iter().map(|m| entry(m.clone(), None)).collect());

            for op in ops {
                match op {
                    // Index 5 is deliberately out of range (unknown module).
                    Op::One(i, edit) => {
                        let id = modules.get(i).map(|m| m.id).unwrap_or_else(ModuleId::new);
                        matrix.set_field(id, edit);
                    }
                    Op::All(edit) => matrix.set_field_for_all(edit),
                }
                for row in matrix.rows() {
                    prop_assert!(row.grant.is_consistent());
                }
            }
        }

        /// Property: turning on create/edit/delete always leaves view on.
        #[test]
        fn enabling_any_capability_implies_view(which in 0usize..3, start in grant_edit()) {
            let m = Module::top_level("M", "crm", 0);
            let id = m.id;
            let mut matrix = matrix_of(vec![entry(m, None)]);
            matrix.set_field(id, start);

            let edit = match which {
                0 => GrantEdit::Create(true),
                1 => GrantEdit::Edit(true),
                _ => GrantEdit::Delete(true),
            };
            matrix.set_field(id, edit);
            prop_assert!(matrix.grant(id).unwrap().can_view);
        }
    }
}
