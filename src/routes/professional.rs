use crate::models::{Role, RouteMetadata};

use super::RouteDef;

/// Professional Route Tree
///
/// Screens for service professionals. `/professional` renders the bare
/// layout; it has no redirect of its own.
pub fn professional_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("/professional")
            .screen("ProfessionalLayout")
            .meta(RouteMetadata::realm(Role::Professional))
            .children(vec![
                RouteDef::new("dashboard")
                    .screen("ProfessionalDashboard")
                    .name("professional-dashboard"),
                RouteDef::new("profile").screen("ProfessionalProfile"),
            ]),
    ]
}
