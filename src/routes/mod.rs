/// Route Table Index
///
/// The portal's screens are organized into role-partitioned view trees, each
/// declared in its own module. The tree is compiled once at startup into a
/// flat, immutable `RouteTable` that the guard and the HTTP layer consult.
///
/// The four modules map directly onto the access partitions.

/// Screens for anonymous visitors (landing page, login/register flow).
pub mod guest;

/// Screens restricted to the 'admin' role.
pub mod admin;

/// Screens restricted to the 'professional' role.
pub mod professional;

/// Screens restricted to the 'user' role.
pub mod user;

mod table;

pub use table::{ResolvedRoute, RouteDef, RouteEntry, RouteTable, Segment, normalize_path};

/// Screen rendered for any path no route claims.
pub const NOT_FOUND_SCREEN: &str = "NotFound";

/// portal_routes
///
/// Assembles every view tree, followed by the global not-found catch-all.
pub fn portal_routes() -> Vec<RouteDef> {
    let mut routes = Vec::new();
    routes.extend(guest::guest_routes());
    routes.extend(admin::admin_routes());
    routes.extend(professional::professional_routes());
    routes.extend(user::user_routes());
    routes.push(RouteDef::new("/:pathMatch(.*)*").screen(NOT_FOUND_SCREEN));
    routes
}

/// load_routes
///
/// Compiles the portal's route tree and runs the structural checks. Called
/// once at startup; a failure here means the table itself is wrong.
pub fn load_routes() -> Result<RouteTable, crate::error::RouteTableError> {
    let table = RouteTable::compile(&portal_routes());
    table.validate()?;
    Ok(table)
}
