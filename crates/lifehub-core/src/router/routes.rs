//! Route table and path matching.

/// One node of the route tree. Top-level paths are absolute, child paths
/// are relative to their parent; an empty child path is the parent's index.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            requires_auth: false,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Mark this branch, children included, as protected
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

/// A record on the chain that matched a path, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRecord {
    /// Absolute pattern of this record
    pub path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// What was asked for, query and hash included
    pub full_path: String,
    /// Normalized path used for matching
    pub path: String,
    pub matched: Vec<MatchedRecord>,
}

impl RouteTarget {
    /// True if any record along the matched chain is protected.
    pub fn requires_auth(&self) -> bool {
        self.matched.iter().any(|r| r.requires_auth)
    }

    /// Name of the innermost matched record
    pub fn name(&self) -> Option<&str> {
        self.matched.last().and_then(|r| r.name.as_deref())
    }

    /// Decoded value of a query parameter
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.full_path.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or(query);
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            if k != key {
                return None;
            }
            urlencoding::decode(&v.replace('+', " "))
                .ok()
                .map(|v| v.into_owned())
        })
    }
}

/// Where a redirect sends the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    /// Path with the query string percent-encoded
    pub fn to_url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        Self { routes }
    }

    /// The LifeHub application routes.
    pub fn lifehub() -> Self {
        Self::new(vec![
            RouteRecord::new("/").named("Home"),
            RouteRecord::new("/login").named("Login"),
            RouteRecord::new("/signup").named("Register"),
            RouteRecord::new("/dashboard").requires_auth().children(vec![
                RouteRecord::new("").named("Dashboard"),
                RouteRecord::new("tareas").named("Tareas"),
                RouteRecord::new("usuario").named("Usuario"),
                RouteRecord::new("usuario/configuracion").named("Configuracion"),
                RouteRecord::new("configuracion-areas").named("ConfiguracionAreas"),
            ]),
        ])
    }

    /// Match a full path such as `/dashboard/tareas?x=1` against the table.
    pub fn resolve(&self, full_path: &str) -> Option<RouteTarget> {
        let path = normalize(full_path);
        let segments = split_segments(&path);

        self.routes.iter().find_map(|record| {
            let mut chain = Vec::new();
            if match_record(record, "", &segments, &mut chain) {
                Some(RouteTarget {
                    full_path: full_path.to_string(),
                    path: path.clone(),
                    matched: chain,
                })
            } else {
                None
            }
        })
    }

    /// Absolute path of the record with this name
    pub fn path_of(&self, name: &str) -> Option<String> {
        fn search(records: &[RouteRecord], parent: &str, name: &str) -> Option<String> {
            records.iter().find_map(|record| {
                let pattern = join(parent, &record.path);
                if record.name.as_deref() == Some(name) {
                    return Some(pattern);
                }
                search(&record.children, &pattern, name)
            })
        }
        search(&self.routes, "", name)
    }
}

fn match_record(
    record: &RouteRecord,
    parent: &str,
    segments: &[&str],
    chain: &mut Vec<MatchedRecord>,
) -> bool {
    let pattern = join(parent, &record.path);
    chain.push(MatchedRecord {
        path: pattern.clone(),
        name: record.name.clone(),
        requires_auth: record.requires_auth,
    });

    let matched_child = record
        .children
        .iter()
        .any(|child| match_record(child, &pattern, segments, chain));

    if matched_child || segments_match(&split_segments(&pattern), segments) {
        return true;
    }
    chain.pop();
    false
}

fn segments_match(pattern: &[&str], segments: &[&str]) -> bool {
    pattern.len() == segments.len()
        && pattern
            .iter()
            .zip(segments)
            .all(|(p, s)| p.starts_with(':') || p == s)
}

/// Strip query and hash, force a leading `/` and drop trailing ones.
fn normalize(full_path: &str) -> String {
    let path = full_path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn join(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return child.to_string();
    }
    if child.is_empty() {
        return if parent.is_empty() { "/".to_string() } else { parent.to_string() };
    }
    format!("{}/{}", parent.trim_end_matches('/'), child)
}
