use std::collections::HashMap;

use crate::{
    error::RouteTableError,
    models::Role,
    routes::{RouteTable, normalize_path},
};

/// Realm
///
/// The slice of the route tree a single role owns: its home screen and the
/// path prefixes below which every destination belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realm {
    pub role: Role,
    pub home: String,
    pub prefixes: Vec<String>,
}

/// RealmPolicy
///
/// Explicit mapping from role to owned path prefixes. Membership is decided
/// by whole path segments, so `/user` owns `/user/bookings` but not
/// `/users` or `/username`.
#[derive(Debug, Clone)]
pub struct RealmPolicy {
    realms: HashMap<Role, Realm>,
}

impl Default for RealmPolicy {
    /// Each role owns the subtree named after it and lands on its root.
    fn default() -> Self {
        let realms = Role::KNOWN
            .iter()
            .map(|&role| {
                let root = format!("/{}", role.as_str());
                (
                    role,
                    Realm {
                        role,
                        home: root.clone(),
                        prefixes: vec![root],
                    },
                )
            })
            .collect();
        Self { realms }
    }
}

impl RealmPolicy {
    /// Builds a policy from explicit realms, rejecting relative prefixes and
    /// prefixes claimed by two roles.
    pub fn new(realms: impl IntoIterator<Item = Realm>) -> Result<Self, RouteTableError> {
        let mut map: HashMap<Role, Realm> = HashMap::new();
        let mut claimed: HashMap<String, Role> = HashMap::new();

        for mut realm in realms {
            if map.contains_key(&realm.role) {
                return Err(RouteTableError::DuplicateRealm { role: realm.role });
            }

            realm.prefixes = realm
                .prefixes
                .iter()
                .map(|prefix| {
                    if prefix.starts_with('/') {
                        Ok(normalize_path(prefix))
                    } else {
                        Err(RouteTableError::InvalidPrefix {
                            prefix: prefix.clone(),
                        })
                    }
                })
                .collect::<Result<_, _>>()?;

            for prefix in &realm.prefixes {
                for (other, owner) in &claimed {
                    if *owner != realm.role
                        && (segment_prefix(other, prefix) || segment_prefix(prefix, other))
                    {
                        return Err(RouteTableError::OverlappingRealms {
                            prefix: prefix.clone(),
                            first: *owner,
                            second: realm.role,
                        });
                    }
                }
                claimed.insert(prefix.clone(), realm.role);
            }

            map.insert(realm.role, realm);
        }

        Ok(Self { realms: map })
    }

    pub fn realm(&self, role: Role) -> Option<&Realm> {
        self.realms.get(&role)
    }

    /// Canonical landing path for a role. `Role::Unknown` has none.
    pub fn home_path(&self, role: Role) -> Option<&str> {
        self.realms.get(&role).map(|realm| realm.home.as_str())
    }

    /// The role whose realm contains `path`, if any.
    pub fn owner_of(&self, path: &str) -> Option<Role> {
        let path = strip_query(path);
        self.realms
            .values()
            .find(|realm| realm.prefixes.iter().any(|prefix| segment_prefix(prefix, path)))
            .map(|realm| realm.role)
    }

    /// validate
    ///
    /// Checks the realm mapping against the route table so that no destination
    /// silently falls outside the authorization model:
    /// - every route restricted to a role lies inside that role's realm;
    /// - every route inside a realm requires authentication and that role;
    /// - every home path resolves to a real (non catch-all) screen that its
    ///   role can actually open: inside its own realm and not guest-only.
    pub fn validate(&self, table: &RouteTable) -> Result<(), RouteTableError> {
        for entry in table.entries() {
            let owner = self.owner_of(&entry.path);

            if let Some(role) = entry.meta.role {
                if owner != Some(role) {
                    return Err(RouteTableError::OutsideRealm {
                        path: entry.path.clone(),
                        role,
                    });
                }
            }

            if let Some(role) = owner {
                if entry.meta.role != Some(role) || !entry.meta.requires_auth {
                    return Err(RouteTableError::UnguardedRealmRoute {
                        path: entry.path.clone(),
                        role,
                    });
                }
            }
        }

        let mut roles: Vec<&Realm> = self.realms.values().collect();
        roles.sort_by_key(|realm| realm.home.clone());
        for realm in roles {
            let Some(resolved) = table
                .resolve(&realm.home)
                .filter(|resolved| !resolved.entry.is_catch_all())
            else {
                return Err(RouteTableError::MissingHome {
                    role: realm.role,
                    path: realm.home.clone(),
                });
            };

            if resolved.entry.meta.requires_guest {
                return Err(RouteTableError::GuestOnlyHome {
                    role: realm.role,
                    path: realm.home.clone(),
                });
            }

            // A home the role can not enter would bounce it between denials.
            let owned = [realm.home.as_str(), resolved.path.as_str()]
                .iter()
                .all(|path| self.owner_of(path) == Some(realm.role));
            if !owned {
                return Err(RouteTableError::HomeOutsideRealm {
                    role: realm.role,
                    path: realm.home.clone(),
                });
            }
        }

        Ok(())
    }

    /// validate_auth_entry
    ///
    /// Checks the path anonymous visitors are sent to when they hit a
    /// protected screen. It must resolve to a real screen that needs no
    /// session and belongs to no realm, otherwise every denial would schedule
    /// another denial.
    pub fn validate_auth_entry(&self, table: &RouteTable, path: &str) -> Result<(), RouteTableError> {
        let Some(resolved) = table
            .resolve(path)
            .filter(|resolved| !resolved.entry.is_catch_all())
        else {
            return Err(RouteTableError::MissingAuthEntry {
                path: path.to_string(),
            });
        };

        if resolved.entry.meta.requires_auth {
            return Err(RouteTableError::ProtectedAuthEntry {
                path: path.to_string(),
            });
        }

        for candidate in [path, resolved.path.as_str()] {
            if let Some(role) = self.owner_of(candidate) {
                return Err(RouteTableError::AuthEntryInRealm {
                    path: path.to_string(),
                    role,
                });
            }
        }

        Ok(())
    }
}

/// True when `path` equals `prefix` or continues it at a segment boundary.
pub fn segment_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
