use crate::models::{Role, RouteMetadata};

use super::{NOT_FOUND_SCREEN, RouteDef};

/// User Route Tree
///
/// Screens for end users booking services. Unknown paths under `/user` stay
/// inside the user layout and render the not-found screen there, still
/// guarded by the user realm.
pub fn user_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("/user")
            .screen("UserLayout")
            .meta(RouteMetadata::realm(Role::User))
            .children(vec![
                RouteDef::new("bookings").screen("UserBooking").name("user-booking"),
                RouteDef::new("dashboard").screen("UserDashboard").name("user-dashboard"),
                RouteDef::new("profile").screen("UserProfile").name("user-profile"),
                RouteDef::new(":pathMatch(.*)*").screen(NOT_FOUND_SCREEN),
            ]),
    ]
}
