use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, PoisonError, RwLock},
};

use axum::{
    extract::FromRequestParts,
    http::{HeaderName, request::Parts},
};

use crate::models::Session;

/// Storage key holding the opaque session token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the role label.
pub const ROLE_KEY: &str = "role";

/// Request header carrying the session token in the HTTP rendition of the portal.
pub static SESSION_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-session-token");
/// Request header carrying the role label.
pub static SESSION_ROLE_HEADER: HeaderName = HeaderName::from_static("x-session-role");

/// SessionReader
///
/// The guard's only view of authentication state. Implementations must read
/// their backing state on every call; nothing may be cached between
/// navigation attempts, since a logout can happen at any time.
pub trait SessionReader: Send + Sync {
    fn read(&self) -> Session;
}

/// SessionState
///
/// The shared handle the routing runtime holds on to.
pub type SessionState = Arc<dyn SessionReader>;

/// SessionStore
///
/// Process-wide persisted key/value state written by the authentication flow
/// (login stores `token` and `role`, logout removes them). The token and the
/// role live in separate slots, so a reader can observe one without the other.
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Stores a signed-in session the way the login screen does.
    pub fn sign_in(&self, token: impl Into<String>, role: impl Into<String>) {
        self.set(TOKEN_KEY, token);
        self.set(ROLE_KEY, role);
    }

    pub fn sign_out(&self) {
        self.remove(TOKEN_KEY);
        self.remove(ROLE_KEY);
    }
}

impl SessionReader for SessionStore {
    fn read(&self) -> Session {
        // Two independent slot reads.
        let token = self.get(TOKEN_KEY);
        let role = self.get(ROLE_KEY);
        Session::from_parts(token, role.as_deref())
    }
}

/// Session Extractor Implementation
///
/// Lets HTTP handlers take the visitor's `Session` as an argument. The values
/// are read from the `x-session-token` and `x-session-role` headers and taken
/// at face value. Missing or non-UTF-8 headers simply yield an anonymous or
/// role-unknown session, so extraction never rejects.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .map(str::to_string)
        };

        let token = header(&SESSION_TOKEN_HEADER);
        let role = header(&SESSION_ROLE_HEADER);

        Ok(Session::from_parts(token, role.as_deref()))
    }
}
