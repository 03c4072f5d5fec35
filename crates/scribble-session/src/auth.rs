//! Authentication hook for validating player identity.
//!
//! Scribble doesn't verify credentials itself; that belongs to your
//! identity provider (session cookies, JWT, an auth API). Instead it
//! defines the [`Authenticator`] trait: a single async method that takes
//! the bearer credential from the join URL and returns an [`Identity`].
//!
//! [`MemoryAuthenticator`] is a token table for development and tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use scribble_protocol::PlayerId;

use crate::SessionError;

/// Who a connection belongs to, as verified by the authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub player_id: PlayerId,
    /// Display name shown to the other players.
    pub name: String,
}

impl Identity {
    pub fn new(player_id: PlayerId, name: impl Into<String>) -> Self {
        Self { player_id, name: name.into() }
    }
}

/// Validates a client's bearer credential and returns their identity.
///
/// # Trait bounds
///
/// - `Send + Sync` → the authenticator is shared by every connection task.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use scribble_session::{Authenticator, Identity, SessionError};
/// use scribble_protocol::PlayerId;
///
/// /// Accepts `<id>:<name>` tokens. Only for development!
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<Identity, SessionError> {
///         let (id, name) = token
///             .split_once(':')
///             .ok_or_else(|| SessionError::Unauthorized("expected <id>:<name>".into()))?;
///         let id: u64 = id
///             .parse()
///             .map_err(|_| SessionError::Unauthorized("id must be a number".into()))?;
///         Ok(Identity::new(PlayerId(id), name))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the given credential and returns the player's identity.
    ///
    /// # Returns
    /// - `Ok(Identity)`: the credential is valid
    /// - `Err(SessionError::Unauthorized)`: it is missing, unknown, or expired
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Identity, SessionError>> + Send;
}

/// An in-memory credential table.
///
/// Tokens are registered up front with [`insert`](Self::insert) or
/// [`with_token`](Self::with_token); anything else is unauthorized.
#[derive(Debug, Default)]
pub struct MemoryAuthenticator {
    tokens: RwLock<HashMap<String, Identity>>,
}

impl MemoryAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_token(self, token: impl Into<String>, identity: Identity) -> Self {
        self.insert(token, identity);
        self
    }

    /// Registers (or replaces) a credential.
    pub fn insert(&self, token: impl Into<String>, identity: Identity) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), identity);
    }

    /// Revokes a credential. Returns `true` if it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

impl Authenticator for MemoryAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Unauthorized("missing credential".into()));
        }
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or_else(|| SessionError::Unauthorized("unknown credential".into()))
    }
}
