use thiserror::Error;

use crate::models::Role;

/// ConfigError
///
/// Raised by `AppConfig::load()` when an environment variable is missing in
/// production or cannot be parsed.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// RouteTableError
///
/// Structural defects in the route table or the role realm mapping. These are
/// detected once at startup; the guard itself never sees them.
#[derive(Debug, Error, PartialEq)]
pub enum RouteTableError {
    #[error("route {path} requires both an authenticated session and a guest")]
    ConflictingFlags { path: String },

    #[error("route {path} redirects to {target}, which matches no route")]
    DanglingRedirect { path: String, target: String },

    #[error("route redirects starting at {path} never settle")]
    RedirectCycle { path: String },

    #[error("route {path} is restricted to {role} but lies outside that role's realm")]
    OutsideRealm { path: String, role: Role },

    #[error("route {path} lies inside the {role} realm without requiring that role")]
    UnguardedRealmRoute { path: String, role: Role },

    #[error("realm prefix {prefix} is claimed by both {first} and {second}")]
    OverlappingRealms {
        prefix: String,
        first: Role,
        second: Role,
    },

    #[error("home path {path} for {role} does not resolve to a screen")]
    MissingHome { role: Role, path: String },

    #[error("home path {path} for {role} is guest-only")]
    GuestOnlyHome { role: Role, path: String },

    #[error("home path {path} for {role} lies outside that role's realm")]
    HomeOutsideRealm { role: Role, path: String },

    #[error("realm prefix {prefix:?} must be an absolute path")]
    InvalidPrefix { prefix: String },

    #[error("role {role} is given more than one realm")]
    DuplicateRealm { role: Role },

    #[error("auth entry path {path} does not resolve to a screen")]
    MissingAuthEntry { path: String },

    #[error("auth entry path {path} requires an authenticated session")]
    ProtectedAuthEntry { path: String },

    #[error("auth entry path {path} lies inside the {role} realm")]
    AuthEntryInRealm { path: String, role: Role },
}

/// NavigationError
///
/// Failures of the routing runtime while applying guard decisions.
#[derive(Debug, Error, PartialEq)]
pub enum NavigationError {
    #[error("navigation to {path} exceeded {hops} immediate redirects")]
    RedirectLoop { path: String, hops: usize },
}
