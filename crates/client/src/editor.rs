//! Stateful permission-matrix editor.
//!
//! [`MatrixEditor`] owns the in-memory table of one template and coordinates
//! the three remote operations:
//!
//! - **load** replaces the table; the answer of a superseded load is dropped
//! - **save** persists the table; one at a time
//! - **propagate** pushes one module's persisted grant to inheriting roles;
//!   one in flight per module, none while saving or while the table is dirty
//!
//! State lives behind a `Mutex` that is never held across an `.await`: an
//! operation checks its guards and marks itself in flight, releases the lock
//! for the remote call, then re-locks to apply the outcome. Failures set a
//! dismissible [`Banner`] and leave unrelated state alone.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use inmoadmin_auth::{Credential, SessionProvider};
use inmoadmin_core::{ModuleId, TemplateId};
use inmoadmin_permissions::{GrantEdit, PermissionGrant, PermissionMatrix};

use crate::api::MatrixApi;
use crate::error::{ClientError, EditorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Load,
    Save,
    Propagate,
}

/// Human-readable error message for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    fn new(kind: BannerKind, err: &ClientError) -> Self {
        let action = match kind {
            BannerKind::Load => "Could not load the permission matrix",
            BannerKind::Save => "Could not save the permission matrix; your changes were kept",
            BannerKind::Propagate => "Could not propagate the module to its roles",
        };
        Self {
            kind,
            message: format!("{action}: {err}"),
        }
    }
}

/// Result of the last successful propagation, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropagationOutcome {
    pub module_id: ModuleId,
    pub propagated_count: u32,
}

#[derive(Debug, Default)]
struct EditorState {
    matrix: Option<PermissionMatrix>,
    /// Bumped by every load; a load only applies if it is still the latest.
    generation: u64,
    /// Bumped whenever a load replaces the table. A save only commits its
    /// baseline onto the table it was taken from.
    applied: u64,
    loading: bool,
    saving: bool,
    propagating: HashSet<ModuleId>,
    banner: Option<Banner>,
    last_propagation: Option<PropagationOutcome>,
}

impl EditorState {
    fn matrix_mut(&mut self) -> Result<&mut PermissionMatrix, EditorError> {
        self.matrix.as_mut().ok_or(EditorError::NotLoaded)
    }

    fn propagation_guard(&self, module_id: ModuleId) -> Result<PermissionGrant, EditorError> {
        let matrix = self.matrix.as_ref().ok_or(EditorError::NotLoaded)?;
        if self.saving {
            return Err(EditorError::SaveInFlight);
        }
        if self.propagating.contains(&module_id) {
            return Err(EditorError::PropagationInFlight(module_id));
        }
        Ok(matrix.propagation_guard(module_id)?)
    }

    fn fail(&mut self, kind: BannerKind, err: ClientError) -> EditorError {
        self.banner = Some(Banner::new(kind, &err));
        EditorError::Remote(err)
    }

    fn clear_banner(&mut self, kind: BannerKind) {
        if self.banner.as_ref().is_some_and(|b| b.kind == kind) {
            self.banner = None;
        }
    }
}

pub struct MatrixEditor<A, S> {
    api: A,
    session: S,
    template_id: TemplateId,
    state: Mutex<EditorState>,
}

impl<A, S> MatrixEditor<A, S>
where
    A: MatrixApi,
    S: SessionProvider,
{
    pub fn new(api: A, session: S, template_id: TemplateId) -> Self {
        Self {
            api,
            session,
            template_id,
            state: Mutex::new(EditorState::default()),
        }
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn credential(&self) -> Result<Credential, ClientError> {
        self.session.credential().ok_or(ClientError::Unauthenticated)
    }

    // ── load ─────────────────────────────────────────────────────────────────

    /// Fetch the matrix and replace the table with it.
    ///
    /// On failure the table is emptied; calling `load` again retries.
    pub async fn load(&self) -> Result<(), EditorError> {
        let generation = {
            let mut st = self.state();
            st.generation += 1;
            st.loading = true;
            st.generation
        };

        let result = match self.credential() {
            Ok(credential) => self.api.load_matrix(&credential, self.template_id).await,
            Err(err) => Err(err),
        };

        let mut st = self.state();
        if st.generation != generation {
            tracing::debug!(template_id = %self.template_id, generation, "superseded load ignored");
            return Ok(());
        }
        st.loading = false;

        match result {
            Ok(response) => {
                let matrix = PermissionMatrix::from_response(response);
                tracing::info!(
                    template_id = %self.template_id,
                    modules = matrix.len(),
                    "permission matrix loaded"
                );
                st.matrix = Some(matrix);
                st.applied += 1;
                st.clear_banner(BannerKind::Load);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(template_id = %self.template_id, error = %err, "permission matrix load failed");
                st.matrix = None;
                st.applied += 1;
                Err(st.fail(BannerKind::Load, err))
            }
        }
    }

    // ── edits ────────────────────────────────────────────────────────────────

    /// Apply one field write to one module (no-op for an unknown module).
    ///
    /// Returns whether the module was found.
    pub fn set_field(&self, module_id: ModuleId, edit: GrantEdit) -> Result<bool, EditorError> {
        Ok(self.state().matrix_mut()?.set_field(module_id, edit))
    }

    pub fn set_field_for_all(&self, edit: GrantEdit) -> Result<(), EditorError> {
        self.state().matrix_mut()?.set_field_for_all(edit);
        Ok(())
    }

    pub fn set_field_for_category(&self, category: &str, edit: GrantEdit) -> Result<usize, EditorError> {
        Ok(self.state().matrix_mut()?.set_field_for_category(category, edit))
    }

    pub fn discard_changes(&self) -> Result<(), EditorError> {
        self.state().matrix_mut()?.discard_changes();
        Ok(())
    }

    // ── save ─────────────────────────────────────────────────────────────────

    /// Persist the whole table.
    ///
    /// On success the saved snapshot becomes the baseline, unless a load
    /// replaced the table meanwhile. On failure the edits stay in memory,
    /// still dirty, ready for a retry.
    pub async fn save(&self) -> Result<(), EditorError> {
        let (applied, snapshot, entries, credential) = {
            let mut st = self.state();
            if st.saving {
                return Err(EditorError::SaveInFlight);
            }
            let matrix = st.matrix.as_ref().ok_or(EditorError::NotLoaded)?;
            let snapshot = matrix.grants();
            let entries = matrix.entries_for_save();
            let credential = match self.credential() {
                Ok(c) => c,
                Err(err) => return Err(st.fail(BannerKind::Save, err)),
            };
            st.saving = true;
            (st.applied, snapshot, entries, credential)
        };

        let result = self
            .api
            .save_matrix(&credential, self.template_id, &entries)
            .await;

        let mut st = self.state();
        st.saving = false;

        match result {
            Ok(()) => {
                if st.applied == applied {
                    if let Some(matrix) = st.matrix.as_mut() {
                        matrix.commit_baseline(&snapshot);
                    }
                } else {
                    tracing::debug!(template_id = %self.template_id, "table reloaded while saving; baseline left to the new load");
                }
                tracing::info!(
                    template_id = %self.template_id,
                    granted_modules = entries.len(),
                    "permission matrix saved"
                );
                st.clear_banner(BannerKind::Save);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(template_id = %self.template_id, error = %err, "permission matrix save failed");
                Err(st.fail(BannerKind::Save, err))
            }
        }
    }

    // ── propagate ────────────────────────────────────────────────────────────

    /// Whether `propagate(module_id)` would be attempted right now.
    ///
    /// Same guard the operation itself uses; bind trigger enablement to it.
    pub fn can_propagate(&self, module_id: ModuleId) -> bool {
        self.state().propagation_guard(module_id).is_ok()
    }

    /// Push the module's persisted grant to every role inheriting from the
    /// template and return how many roles were updated.
    ///
    /// Guard failures are returned without contacting the server.
    pub async fn propagate(&self, module_id: ModuleId) -> Result<u32, EditorError> {
        let (grant, credential) = {
            let mut st = self.state();
            let grant = match st.propagation_guard(module_id) {
                Ok(grant) => grant,
                Err(err) => {
                    tracing::debug!(%module_id, reason = %err, "propagation blocked");
                    return Err(err);
                }
            };
            let credential = match self.credential() {
                Ok(c) => c,
                Err(err) => return Err(st.fail(BannerKind::Propagate, err)),
            };
            st.propagating.insert(module_id);
            (grant, credential)
        };

        let result = self
            .api
            .propagate_module(&credential, self.template_id, module_id, &grant)
            .await;

        let mut st = self.state();
        st.propagating.remove(&module_id);

        match result {
            Ok(response) => {
                tracing::info!(
                    template_id = %self.template_id,
                    %module_id,
                    propagated_count = response.propagated_count,
                    "module grant propagated"
                );
                st.last_propagation = Some(PropagationOutcome {
                    module_id,
                    propagated_count: response.propagated_count,
                });
                st.clear_banner(BannerKind::Propagate);
                Ok(response.propagated_count)
            }
            Err(err) => {
                tracing::warn!(template_id = %self.template_id, %module_id, error = %err, "propagation failed");
                Err(st.fail(BannerKind::Propagate, err))
            }
        }
    }

    // ── queries ──────────────────────────────────────────────────────────────

    /// Run `f` against the current table, if one is loaded.
    pub fn with_matrix<R>(&self, f: impl FnOnce(&PermissionMatrix) -> R) -> Option<R> {
        self.state().matrix.as_ref().map(f)
    }

    pub fn is_loaded(&self) -> bool {
        self.state().matrix.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.state().matrix.as_ref().is_some_and(PermissionMatrix::is_dirty)
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_saving(&self) -> bool {
        self.state().saving
    }

    pub fn is_propagating(&self, module_id: ModuleId) -> bool {
        self.state().propagating.contains(&module_id)
    }

    pub fn banner(&self) -> Option<Banner> {
        self.state().banner.clone()
    }

    pub fn dismiss_banner(&self) {
        self.state().banner = None;
    }

    pub fn last_propagation(&self) -> Option<PropagationOutcome> {
        self.state().last_propagation
    }
}
