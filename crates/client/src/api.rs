use std::sync::Arc;

use async_trait::async_trait;

use inmoadmin_auth::Credential;
use inmoadmin_core::{ModuleId, TemplateId};
use inmoadmin_permissions::{GrantEntry, MatrixResponse, PermissionGrant, PropagateResponse, TemplateSummary};

use crate::error::ClientError;

/// Remote side of the permission-matrix editor.
///
/// Every call receives the credential explicitly; implementations never look
/// one up themselves.
#[async_trait]
pub trait MatrixApi: Send + Sync {
    async fn list_templates(&self, credential: &Credential) -> Result<Vec<TemplateSummary>, ClientError>;

    async fn load_matrix(
        &self,
        credential: &Credential,
        template_id: TemplateId,
    ) -> Result<MatrixResponse, ClientError>;

    /// Replace the template's stored grants with `entries` (viewable rows only).
    async fn save_matrix(
        &self,
        credential: &Credential,
        template_id: TemplateId,
        entries: &[GrantEntry],
    ) -> Result<(), ClientError>;

    /// Overwrite `module_id` on every role inheriting from the template.
    async fn propagate_module(
        &self,
        credential: &Credential,
        template_id: TemplateId,
        module_id: ModuleId,
        grant: &PermissionGrant,
    ) -> Result<PropagateResponse, ClientError>;
}

#[async_trait]
impl<T> MatrixApi for Arc<T>
where
    T: MatrixApi + ?Sized,
{
    async fn list_templates(&self, credential: &Credential) -> Result<Vec<TemplateSummary>, ClientError> {
        (**self).list_templates(credential).await
    }

    async fn load_matrix(
        &self,
        credential: &Credential,
        template_id: TemplateId,
    ) -> Result<MatrixResponse, ClientError> {
        (**self).load_matrix(credential, template_id).await
    }

    async fn save_matrix(
        &self,
        credential: &Credential,
        template_id: TemplateId,
        entries: &[GrantEntry],
    ) -> Result<(), ClientError> {
        (**self).save_matrix(credential, template_id, entries).await
    }

    async fn propagate_module(
        &self,
        credential: &Credential,
        template_id: TemplateId,
        module_id: ModuleId,
        grant: &PermissionGrant,
    ) -> Result<PropagateResponse, ClientError> {
        (**self)
            .propagate_module(credential, template_id, module_id, grant)
            .await
    }
}
