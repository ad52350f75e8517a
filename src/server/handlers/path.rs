use crate::server::authz::Level;
use crate::server::db::Transaction;
use crate::server::scope::{resolve_scope_chain, ResourceRef, ScopeChain, ScopeError};
use crate::types::resource::ResourceKind;

/// Address of an organization, department or team inside the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePath {
    Organization {
        org: String,
    },
    Department {
        org: String,
        dept: String,
    },
    /// `org` and `dept` are the ancestors spelled in the path. A bare
    /// `teams/{id}` leaves both empty and matches a team of any shape.
    Team {
        org: Option<String>,
        dept: Option<String>,
        team: String,
    },
}

impl ScopePath {
    /// Resolves the chain and checks it against the ancestors in the path. A
    /// scope that exists elsewhere in the hierarchy is not found here.
    pub fn resolve(&self, tx: &dyn Transaction) -> Result<ScopeChain, ScopeError> {
        match self {
            ScopePath::Organization { org } => {
                resolve_scope_chain(tx, &ResourceRef::Organization(org.clone()))
            }
            ScopePath::Department { org, dept } => {
                let chain = resolve_scope_chain(tx, &ResourceRef::Department(dept.clone()))?;
                if chain.organization_id() != Some(org.as_str()) {
                    return Err(not_found("department", dept));
                }
                Ok(chain)
            }
            ScopePath::Team { org, dept, team } => {
                let chain = resolve_scope_chain(tx, &ResourceRef::Team(team.clone()))?;
                if org.is_none() && dept.is_none() {
                    return Ok(chain);
                }
                if chain.organization_id() != org.as_deref()
                    || chain.department_id() != dept.as_deref()
                {
                    return Err(not_found("team", team));
                }
                Ok(chain)
            }
        }
    }

    /// Parses the longest scope prefix of `segs`, returning the rest.
    fn parse<'a, 'b>(segs: &'b [&'a str]) -> Option<(Self, &'b [&'a str])> {
        match segs {
            ["organizations", org, "departments", dept, "teams", team, rest @ ..] => Some((
                ScopePath::Team {
                    org: Some(org.to_string()),
                    dept: Some(dept.to_string()),
                    team: team.to_string(),
                },
                rest,
            )),
            ["organizations", org, "departments", dept, rest @ ..] => Some((
                ScopePath::Department {
                    org: org.to_string(),
                    dept: dept.to_string(),
                },
                rest,
            )),
            ["organizations", org, "teams", team, rest @ ..] => Some((
                ScopePath::Team {
                    org: Some(org.to_string()),
                    dept: None,
                    team: team.to_string(),
                },
                rest,
            )),
            ["organizations", org, rest @ ..] => Some((
                ScopePath::Organization {
                    org: org.to_string(),
                },
                rest,
            )),
            ["teams", team, rest @ ..] => Some((
                ScopePath::Team {
                    org: None,
                    dept: None,
                    team: team.to_string(),
                },
                rest,
            )),
            _ => None,
        }
    }
}

fn not_found(kind: &'static str, id: &str) -> ScopeError {
    ScopeError::NotFound {
        kind,
        id: id.to_string(),
    }
}

/// A parsed `/api/...` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiPath {
    Whoami,
    Users(Option<String>),
    ApiKeys(Option<String>),
    /// `organizations`
    Organizations,
    /// `teams`, the caller's teams and personal team creation
    Teams,
    /// `organizations/{o}/departments`
    Departments(ScopePath),
    /// `organizations/{o}/teams` or `organizations/{o}/departments/{d}/teams`
    ScopedTeams(ScopePath),
    Scope(ScopePath),
    Members(ScopePath, Option<String>),
    Resources(ResourceKind, Option<String>),
    Cani(Level, ScopePath),
}

impl ApiPath {
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return None;
        }
        let segs: Vec<&str> = path.split('/').collect();
        if segs.iter().any(|s| s.is_empty()) {
            return None;
        }

        match segs.as_slice() {
            ["whoami"] => return Some(ApiPath::Whoami),
            ["users"] => return Some(ApiPath::Users(None)),
            ["users", id] => return Some(ApiPath::Users(Some(id.to_string()))),
            ["apikeys"] => return Some(ApiPath::ApiKeys(None)),
            ["apikeys", id] => return Some(ApiPath::ApiKeys(Some(id.to_string()))),
            ["organizations"] => return Some(ApiPath::Organizations),
            ["teams"] => return Some(ApiPath::Teams),
            ["cani", level, rest @ ..] => {
                let level = Level::parse(level)?;
                return match ScopePath::parse(rest)? {
                    (scope, []) => Some(ApiPath::Cani(level, scope)),
                    _ => None,
                };
            }
            [collection, rest @ ..] if rest.len() <= 1 => {
                if let Some(kind) = ResourceKind::from_collection(collection) {
                    let id = rest.first().map(|id| id.to_string());
                    return Some(ApiPath::Resources(kind, id));
                }
            }
            _ => {}
        }

        let (scope, rest) = ScopePath::parse(&segs)?;
        let is_org = matches!(scope, ScopePath::Organization { .. });
        let is_dept = matches!(scope, ScopePath::Department { .. });
        match rest {
            [] => Some(ApiPath::Scope(scope)),
            ["members"] => Some(ApiPath::Members(scope, None)),
            ["members", user] => Some(ApiPath::Members(scope, Some(user.to_string()))),
            ["departments"] if is_org => Some(ApiPath::Departments(scope)),
            ["teams"] if is_org || is_dept => Some(ApiPath::ScopedTeams(scope)),
            _ => None,
        }
    }
}
