use thiserror::Error;

use inmoadmin_core::ModuleId;
use inmoadmin_permissions::PropagateBlocked;

/// Failure of a remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("not signed in: no session credential available")]
    Unauthenticated,
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(status, _) => Some(*status),
            _ => None,
        }
    }
}

/// Failure of an editor operation.
///
/// Everything except [`EditorError::Remote`] is decided locally, before any
/// request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("the permission matrix has not been loaded")]
    NotLoaded,
    #[error("a save is in progress")]
    SaveInFlight,
    #[error("module {0} is already being propagated")]
    PropagationInFlight(ModuleId),
    #[error(transparent)]
    Blocked(#[from] PropagateBlocked),
    #[error(transparent)]
    Remote(#[from] ClientError),
}
