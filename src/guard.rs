use std::time::Duration;

use crate::{
    config::AppConfig,
    models::{Decision, Role, Session, Severity, TransitionAttempt},
    policy::RealmPolicy,
};

pub const LOGIN_REQUIRED: &str = "You need to log in to access this page!";
pub const ALREADY_LOGGED_IN: &str = "You are already logged in.";
pub const DENIED_TO_HOME: &str = "Access Denied! Redirecting to Home.";

/// The public landing path. It is also where sessions with an unknown role
/// are sent, since they have no home of their own.
pub const ROOT_PATH: &str = "/";

/// Guard
///
/// The navigation access-control guard. It is evaluated for every attempted
/// screen change and is a pure function of the attempt, the session snapshot
/// the caller read for it, and this immutable configuration.
///
/// Rules are checked in order and the first match wins:
/// 1. an authenticated visitor requesting `/` goes straight to their home;
/// 2. a protected destination without a session redirects to the auth entry
///    point after a warning;
/// 3. a guest-only destination with a session redirects home after an info
///    notice;
/// 4. a destination inside another role's realm redirects home after an
///    error notice;
/// 5. anything else proceeds.
#[derive(Debug, Clone)]
pub struct Guard {
    realms: RealmPolicy,
    auth_entry_path: String,
    redirect_delay: Duration,
}

impl Guard {
    pub fn new(realms: RealmPolicy, auth_entry_path: impl Into<String>, redirect_delay: Duration) -> Self {
        Self {
            realms,
            auth_entry_path: auth_entry_path.into(),
            redirect_delay,
        }
    }

    pub fn from_config(realms: RealmPolicy, config: &AppConfig) -> Self {
        Self::new(realms, config.auth_entry_path.clone(), config.redirect_delay)
    }

    pub fn realms(&self) -> &RealmPolicy {
        &self.realms
    }

    pub fn redirect_delay(&self) -> Duration {
        self.redirect_delay
    }

    /// evaluate
    ///
    /// Produces exactly one decision for the attempt. Nothing here reads
    /// global state or the clock; the caller applies the decision.
    pub fn evaluate(&self, attempt: &TransitionAttempt, session: &Session) -> Decision {
        let meta = attempt.destination_meta;
        let authenticated = session.is_authenticated();
        let role = session.known_role();

        // 1. Home-redirect shortcut, exact root only.
        if attempt.destination_path == ROOT_PATH {
            if let Some(home) = role.and_then(|role| self.realms.home_path(role)) {
                return Decision::RedirectTo {
                    path: home.to_string(),
                };
            }
        }

        // 2. Auth-required gate.
        if meta.requires_auth && !authenticated {
            return self.after_notice(&self.auth_entry_path, LOGIN_REQUIRED, Severity::Warning);
        }

        // 3. Guest-only gate. A session whose role is unknown is sent to the
        // root, never to the user dashboard: that role was not established.
        if meta.requires_guest && authenticated {
            let home = self.home_or_root(role);
            return self.after_notice(home, ALREADY_LOGGED_IN, Severity::Info);
        }

        // 4. Cross-role denial.
        if authenticated {
            if let Some(owner) = self.realms.owner_of(&attempt.destination_path) {
                match role {
                    Some(current) if current == owner => {}
                    Some(current) => {
                        let home = self.home_or_root(Some(current));
                        return self.after_notice(home, &denied_message(current), Severity::Error);
                    }
                    None => {
                        return self.after_notice(ROOT_PATH, DENIED_TO_HOME, Severity::Error);
                    }
                }
            }
        }

        Decision::Proceed
    }

    fn home_or_root(&self, role: Option<Role>) -> &str {
        role.and_then(|role| self.realms.home_path(role))
            .unwrap_or(ROOT_PATH)
    }

    fn after_notice(&self, path: &str, message: &str, severity: Severity) -> Decision {
        Decision::redirect_after_notice(path, message, severity, self.redirect_delay)
    }
}

/// Denial message naming the dashboard the visitor is sent back to.
pub fn denied_message(role: Role) -> String {
    format!("Access Denied! Redirecting to {} Dashboard.", role.label())
}
