//! Client-side session access.
//!
//! Remote calls never read an ambient token: each call asks a
//! [`SessionProvider`] for a [`Credential`] and passes it explicitly.

use std::sync::{Arc, RwLock};

/// Bearer credential attached to every outgoing request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank tokens; an empty bearer is never sent.
    pub fn bearer(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Source of the current session's credential.
///
/// `None` means "not signed in"; callers treat it as a hard failure.
pub trait SessionProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

impl<S> SessionProvider for Arc<S>
where
    S: SessionProvider + ?Sized,
{
    fn credential(&self) -> Option<Credential> {
        (**self).credential()
    }
}

/// Session holding a replaceable credential (sign-in / sign-out).
#[derive(Debug, Default)]
pub struct StaticSession {
    inner: RwLock<Option<Credential>>,
}

impl StaticSession {
    pub fn signed_in(credential: Credential) -> Self {
        Self {
            inner: RwLock::new(Some(credential)),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, credential: Credential) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(credential);
    }

    pub fn sign_out(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        tracing::debug!("session signed out");
    }
}

impl SessionProvider for StaticSession {
    fn credential(&self) -> Option<Credential> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
