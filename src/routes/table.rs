use std::collections::{BTreeMap, HashSet};

use crate::{
    error::RouteTableError,
    models::{RouteMetadata, RouteSummary},
};

/// RouteDef
///
/// One node of a declarative view tree. Child paths are relative to their
/// parent unless they start with `/`; an empty child path renders at the
/// parent's own path.
#[derive(Debug, Clone, Default)]
pub struct RouteDef {
    pub path: String,
    pub screen: Option<String>,
    pub name: Option<String>,
    pub meta: RouteMetadata,
    pub redirect: Option<String>,
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn meta(mut self, meta: RouteMetadata) -> Self {
        self.meta = meta;
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn children(mut self, children: Vec<RouteDef>) -> Self {
        self.children = children;
        self
    }
}

/// Segment
///
/// A compiled path pattern component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    /// `:name`, exactly one non-empty segment.
    Param(String),
    /// `:name(.*)*`, zero or more trailing segments.
    CatchAll(String),
}

impl Segment {
    fn parse(raw: &str) -> Segment {
        match raw.strip_prefix(':') {
            None => Segment::Static(raw.to_string()),
            Some(rest) => {
                let name = rest.split('(').next().unwrap_or(rest).to_string();
                if rest.contains("(.*)") && rest.ends_with('*') {
                    Segment::CatchAll(name)
                } else {
                    Segment::Param(name)
                }
            }
        }
    }
}

/// RouteEntry
///
/// A flattened destination: full path pattern, inherited metadata, and the
/// layout chain the screen renders inside.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub path: String,
    pub segments: Vec<Segment>,
    pub name: Option<String>,
    pub screen: Option<String>,
    pub layouts: Vec<String>,
    pub redirect: Option<String>,
    pub meta: RouteMetadata,
}

impl RouteEntry {
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// Matches a normalized path, returning the per-segment rank and the
    /// captured parameters.
    fn matches(&self, parts: &[&str]) -> Option<(Vec<u8>, BTreeMap<String, String>)> {
        let mut rank = Vec::with_capacity(parts.len());
        let mut params = BTreeMap::new();
        let mut idx = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(expected) => {
                    if parts.get(idx) != Some(&expected.as_str()) {
                        return None;
                    }
                    rank.push(3);
                    idx += 1;
                }
                Segment::Param(name) => {
                    let value = parts.get(idx).filter(|value| !value.is_empty())?;
                    params.insert(name.clone(), (*value).to_string());
                    rank.push(2);
                    idx += 1;
                }
                Segment::CatchAll(name) => {
                    let rest = &parts[idx.min(parts.len())..];
                    params.insert(name.clone(), rest.join("/"));
                    rank.extend(std::iter::repeat_n(1, rest.len()));
                    idx = parts.len();
                }
            }
        }

        (idx == parts.len()).then_some((rank, params))
    }
}

/// ResolvedRoute
///
/// The final destination for a requested path after route-level redirects
/// have been followed.
#[derive(Debug, Clone)]
pub struct ResolvedRoute<'a> {
    /// Concrete normalized path of the destination.
    pub path: String,
    pub entry: &'a RouteEntry,
    pub params: BTreeMap<String, String>,
    /// The originally requested path, when a route-level redirect was followed.
    pub redirected_from: Option<String>,
}

/// RouteTable
///
/// The compiled, immutable route table. Built once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn compile(defs: &[RouteDef]) -> Self {
        let mut entries = Vec::new();
        for def in defs {
            flatten(def, "", RouteMetadata::PUBLIC, &[], &mut entries);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Finds the best-ranked entry for a path: static segments beat
    /// parameters, parameters beat catch-alls, and on a tie an entry without
    /// a catch-all wins over one with, then declaration order decides.
    pub fn match_path(&self, path: &str) -> Option<(&RouteEntry, BTreeMap<String, String>)> {
        let normalized = normalize_path(path);
        let parts = split_segments(&normalized);

        let mut best: Option<(Vec<u8>, bool, &RouteEntry, BTreeMap<String, String>)> = None;
        for entry in &self.entries {
            let Some((rank, params)) = entry.matches(&parts) else {
                continue;
            };
            let exact = !entry.is_catch_all();
            let better = match &best {
                None => true,
                Some((best_rank, best_exact, _, _)) => {
                    (&rank, exact) > (best_rank, *best_exact)
                }
            };
            if better {
                best = Some((rank, exact, entry, params));
            }
        }

        best.map(|(_, _, entry, params)| (entry, params))
    }

    /// resolve
    ///
    /// Matches a path and follows route-level redirects. Redirect chains are
    /// bounded by the table size; a table that passed `validate` never hits
    /// that bound.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        let requested = normalize_path(path);
        let mut current = requested.clone();

        for _ in 0..=self.entries.len() {
            let (entry, params) = self.match_path(&current)?;
            match &entry.redirect {
                Some(target) if normalize_path(target) != current => {
                    current = normalize_path(target);
                }
                _ => {
                    let redirected_from = (current != requested).then(|| requested.clone());
                    return Some(ResolvedRoute {
                        path: current,
                        entry,
                        params,
                        redirected_from,
                    });
                }
            }
        }

        tracing::warn!(path = %requested, "route redirects did not settle");
        None
    }

    /// validate
    ///
    /// Structural checks run once at startup: no destination requires both a
    /// session and a guest, and every route-level redirect lands on a real
    /// screen without looping.
    pub fn validate(&self) -> Result<(), RouteTableError> {
        for entry in &self.entries {
            if entry.meta.requires_auth && entry.meta.requires_guest {
                return Err(RouteTableError::ConflictingFlags {
                    path: entry.path.clone(),
                });
            }

            let Some(target) = &entry.redirect else {
                continue;
            };
            match self.match_path(target) {
                Some((found, _)) if !found.is_catch_all() => {}
                _ => {
                    return Err(RouteTableError::DanglingRedirect {
                        path: entry.path.clone(),
                        target: target.clone(),
                    });
                }
            }

            let mut seen = HashSet::new();
            let mut hop = entry;
            while let Some(next) = &hop.redirect {
                if !seen.insert(hop.path.clone()) {
                    return Err(RouteTableError::RedirectCycle {
                        path: entry.path.clone(),
                    });
                }
                match self.match_path(next) {
                    Some((found, _)) => hop = found,
                    None => break,
                }
            }
        }
        Ok(())
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.entries
            .iter()
            .map(|entry| RouteSummary {
                path: entry.path.clone(),
                name: entry.name.clone(),
                screen: entry.screen.clone(),
                redirect: entry.redirect.clone(),
                meta: entry.meta,
            })
            .collect()
    }
}

fn flatten(
    def: &RouteDef,
    parent_path: &str,
    parent_meta: RouteMetadata,
    layouts: &[String],
    out: &mut Vec<RouteEntry>,
) {
    let path = join_paths(parent_path, &def.path);
    let meta = def.meta.inherit(parent_meta);

    // A parent with an index child is only reachable through that child.
    let has_index_child = def.children.iter().any(|child| child.path.is_empty());
    if !has_index_child {
        out.push(RouteEntry {
            segments: split_segments(&path).into_iter().map(Segment::parse).collect(),
            path: path.clone(),
            name: def.name.clone(),
            screen: def.screen.clone(),
            layouts: layouts.to_vec(),
            redirect: def.redirect.clone(),
            meta,
        });
    }

    let mut child_layouts = layouts.to_vec();
    child_layouts.extend(def.screen.clone());
    for child in &def.children {
        flatten(child, &path, meta, &child_layouts, out);
    }
}

fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        normalize_path(child)
    } else if child.is_empty() {
        normalize_path(parent)
    } else {
        normalize_path(&format!("{}/{}", parent.trim_end_matches('/'), child))
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// normalize_path
///
/// Drops query and fragment, collapses repeated slashes, and removes the
/// trailing slash. The root stays `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let parts = split_segments(path);
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}
