use crate::models::RouteMetadata;

use super::RouteDef;

/// Guest Route Tree
///
/// The public landing page, the authentication flow, and the unauthorized
/// notice. Only the `/auth` subtree is guest-only: an already signed-in
/// visitor is bounced back to their home screen.
pub fn guest_routes() -> Vec<RouteDef> {
    vec![
        // / renders the public service listing inside the guest layout.
        RouteDef::new("/")
            .screen("GuestLayout")
            .children(vec![RouteDef::new("").screen("Services").name("services")]),
        // /auth lands on the login form.
        RouteDef::new("/auth")
            .screen("AuthView")
            .name("auth")
            .redirect("/auth/login")
            .meta(RouteMetadata::GUEST)
            .children(vec![
                RouteDef::new("login").screen("Login").name("login"),
                RouteDef::new("register").screen("UserRegister").name("register"),
                RouteDef::new("forgot-password")
                    .screen("ForgotPassword")
                    .name("forgot-password"),
            ]),
        RouteDef::new("/unauthorized").screen("Unauthorized"),
    ]
}
