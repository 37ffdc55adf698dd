use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Session & Roles ---

/// Role
///
/// The closed set of tenant roles. `Unknown` stands for an absent or malformed
/// persisted role label; it never equals any real role, so it can not satisfy
/// a role-scoped check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Professional,
    User,
    #[default]
    Unknown,
}

impl Role {
    /// Every role that owns a realm, in the order the route tables are declared.
    pub const KNOWN: [Role; 3] = [Role::Admin, Role::Professional, Role::User];

    /// Parses a persisted role label. Anything outside the enumeration maps to
    /// `Role::Unknown`; labels are matched exactly, as they were written.
    pub fn parse(label: &str) -> Role {
        match label {
            "admin" => Role::Admin,
            "professional" => Role::Professional,
            "user" => Role::User,
            _ => Role::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Role::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professional => "professional",
            Role::User => "user",
            Role::Unknown => "unknown",
        }
    }

    /// Human-facing name used in denial notices ("Admin Dashboard").
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Professional => "Professional",
            Role::User => "User",
            Role::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session
///
/// The client's local belief about who is signed in. It is read fresh for
/// every navigation attempt and trusted at face value: no token verification
/// happens on this side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Session {
    /// Opaque session token. `None` (or an empty string) means anonymous.
    pub token: Option<String>,
    pub role: Role,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builds a session from raw persisted values.
    pub fn from_parts(token: Option<String>, role_label: Option<&str>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            role: role_label.map(Role::parse).unwrap_or(Role::Unknown),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The role, only when the session is authenticated and the role is real.
    pub fn known_role(&self) -> Option<Role> {
        if self.is_authenticated() && self.role.is_known() {
            Some(self.role)
        } else {
            None
        }
    }
}

// --- Route Policy ---

/// RouteMetadata
///
/// Policy flags attached to a destination. The default value (all false, no
/// role) describes a fully public destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RouteMetadata {
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub requires_guest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl RouteMetadata {
    pub const PUBLIC: RouteMetadata = RouteMetadata {
        requires_auth: false,
        requires_guest: false,
        role: None,
    };

    pub const GUEST: RouteMetadata = RouteMetadata {
        requires_auth: false,
        requires_guest: true,
        role: None,
    };

    /// Metadata for the root of a role's view tree.
    pub const fn realm(role: Role) -> RouteMetadata {
        RouteMetadata {
            requires_auth: true,
            requires_guest: false,
            role: Some(role),
        }
    }

    /// Merges a child's flags over the metadata inherited from its parent.
    pub fn inherit(self, parent: RouteMetadata) -> RouteMetadata {
        RouteMetadata {
            requires_auth: self.requires_auth || parent.requires_auth,
            requires_guest: self.requires_guest || parent.requires_guest,
            role: self.role.or(parent.role),
        }
    }
}

/// TransitionAttempt
///
/// One attempted screen change, alive only for the duration of a guard
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionAttempt {
    pub destination_path: String,
    pub destination_meta: RouteMetadata,
    pub origin_path: String,
}

impl TransitionAttempt {
    pub fn new(
        destination_path: impl Into<String>,
        destination_meta: RouteMetadata,
        origin_path: impl Into<String>,
    ) -> Self {
        Self {
            destination_path: destination_path.into(),
            destination_meta,
            origin_path: origin_path.into(),
        }
    }
}

// --- Decisions & Notices ---

/// Severity
///
/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Decision
///
/// The guard's verdict for one transition attempt. The redirect target and the
/// denial itself are always decided synchronously; only the application of a
/// notice-bearing redirect is deferred by `delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    Proceed,
    RedirectTo {
        path: String,
    },
    RedirectToAfterNotice {
        path: String,
        message: String,
        severity: Severity,
        delay_ms: u64,
    },
}

impl Decision {
    pub fn redirect_after_notice(
        path: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        delay: Duration,
    ) -> Self {
        Decision::RedirectToAfterNotice {
            path: path.into(),
            message: message.into(),
            severity,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Where the decision sends the visitor, if anywhere else.
    pub fn target(&self) -> Option<&str> {
        match self {
            Decision::Proceed => None,
            Decision::RedirectTo { path } | Decision::RedirectToAfterNotice { path, .. } => {
                Some(path)
            }
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            Decision::RedirectToAfterNotice { delay_ms, .. } => Duration::from_millis(*delay_ms),
            _ => Duration::ZERO,
        }
    }
}

/// Notice
///
/// A transient message shown to the visitor while a denial redirect is
/// pending. `duration_ms` is how long the display layer keeps it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub duration_ms: u64,
    #[ts(type = "string")]
    pub issued_at: DateTime<Utc>,
}

// --- HTTP Payloads ---

/// NavigateRequest
///
/// Input payload for `POST /api/navigate`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    #[schema(example = "/admin/users")]
    pub to: String,
    #[serde(default = "root_path")]
    #[schema(example = "/")]
    pub from: String,
}

fn root_path() -> String {
    "/".to_string()
}

/// NavigateResponse
///
/// The guard's decision for a requested destination, together with the
/// destination it actually resolved to after route-level redirects.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateResponse {
    pub resolved_path: String,
    pub screen: Option<String>,
    pub decision: Decision,
}

/// ScreenView
///
/// What the portal renders for an allowed destination: the screen and the
/// layout chain wrapping it, plus any path parameters.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ScreenView {
    pub path: String,
    pub screen: String,
    pub layouts: Vec<String>,
    pub params: BTreeMap<String, String>,
}

/// NoticeView
///
/// Body returned by the fallback screen handler when a redirect waits behind
/// a notice.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NoticeView {
    pub redirect_to: String,
    pub delay_ms: u64,
    pub notice: Notice,
}

/// RouteSummary
///
/// One compiled entry of the route table (GET /api/routes).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteSummary {
    pub path: String,
    pub name: Option<String>,
    pub screen: Option<String>,
    pub redirect: Option<String>,
    pub meta: RouteMetadata,
}
