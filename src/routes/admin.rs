use crate::models::{Role, RouteMetadata};

use super::RouteDef;

/// Admin Route Tree
///
/// Moderation and catalogue management screens. The whole subtree inherits
/// `requires_auth` and `role = admin` from its root; `/admin` itself lands on
/// the dashboard.
pub fn admin_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("/admin")
            .screen("AdminLayout")
            .meta(RouteMetadata::realm(Role::Admin))
            .redirect("/admin/dashboard")
            .children(vec![
                RouteDef::new("dashboard").screen("AdminDashboard").name("admin-dashboard"),
                RouteDef::new("profile").screen("AdminProfile").name("admin-profile"),
                RouteDef::new("users").screen("AdminUsers").name("admin-users"),
                // Single professional record, looked up by id.
                RouteDef::new("professional/:id")
                    .screen("ProfessionalDetails")
                    .name("professional-details"),
                RouteDef::new("onboard-professional")
                    .screen("ApproveProfessional")
                    .name("approve-professional"),
                RouteDef::new("professionals")
                    .screen("AllProfessional")
                    .name("all-professional"),
                RouteDef::new("locations").screen("AdminLocation").name("admin-location"),
                RouteDef::new("add-location").screen("AddLocation").name("add-location"),
                RouteDef::new("categories")
                    .screen("AdminCategories")
                    .name("admin-categories"),
                RouteDef::new("add-category").screen("AddCategory").name("add-category"),
                RouteDef::new("services").screen("AdminServices").name("admin-services"),
                RouteDef::new("add-service").screen("AddService").name("add-service"),
            ]),
    ]
}
