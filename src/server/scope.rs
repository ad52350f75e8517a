use std::fmt;

use anyhow::{bail, Result};
use thiserror::Error;

use crate::types::resource::{Owner, ResourceKind};

use super::db::Transaction;

/// One link in an ownership chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Organization(String),
    Department(String),
    Team(String),
    /// A resource owned directly by a user, outside the hierarchy.
    PersonalOwner(String),
}

impl Scope {
    pub fn kind(&self) -> &'static str {
        match self {
            Scope::Organization(_) => "organization",
            Scope::Department(_) => "department",
            Scope::Team(_) => "team",
            Scope::PersonalOwner(_) => "user",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Scope::Organization(id)
            | Scope::Department(id)
            | Scope::Team(id)
            | Scope::PersonalOwner(id) => id,
        }
    }

    fn specificity(&self) -> u8 {
        match self {
            Scope::PersonalOwner(_) | Scope::Team(_) => 0,
            Scope::Department(_) => 1,
            Scope::Organization(_) => 2,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind(), self.id())
    }
}

/// Ordered ancestor path of a resource, most specific scope first.
///
/// A chain is always well formed: it is non-empty, a personal owner only
/// ever appears alone, and each of team, department and organization appears
/// at most once in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl ScopeChain {
    pub fn new(scopes: Vec<Scope>) -> Result<Self> {
        Self::validate(&scopes)?;
        Ok(Self { scopes })
    }

    pub fn personal(user_id: impl Into<String>) -> Self {
        Self {
            scopes: vec![Scope::PersonalOwner(user_id.into())],
        }
    }

    pub fn organization(org_id: impl Into<String>) -> Self {
        Self {
            scopes: vec![Scope::Organization(org_id.into())],
        }
    }

    fn validate(scopes: &[Scope]) -> Result<()> {
        if scopes.is_empty() {
            bail!("scope chain is empty");
        }

        let personal = scopes
            .iter()
            .any(|s| matches!(s, Scope::PersonalOwner(_)));
        if personal && scopes.len() > 1 {
            bail!("personal owner must be the only scope in a chain");
        }

        for pair in scopes.windows(2) {
            if pair[0].specificity() >= pair[1].specificity() {
                bail!(
                    "scope chain is out of order or repeats a level: {} before {}",
                    pair[0],
                    pair[1]
                );
            }
        }

        Ok(())
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// The most specific scope, the one the chain was resolved for.
    pub fn target(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.scopes.iter().find_map(|s| match s {
            Scope::Organization(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn department_id(&self) -> Option<&str> {
        self.scopes.iter().find_map(|s| match s {
            Scope::Department(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn personal_owner(&self) -> Option<&str> {
        match self.scopes.as_slice() {
            [Scope::PersonalOwner(id)] => Some(id),
            _ => None,
        }
    }
}

/// Something whose ownership chain can be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Organization(String),
    Department(String),
    Team(String),
    Resource(ResourceKind, String),
    ApiKey(String),
    User(String),
}

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl ScopeError {
    fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Resolves the ownership chain of `target`. An unknown id is
/// [`ScopeError::NotFound`]; rows that break the hierarchy shape are
/// [`ScopeError::Invariant`].
pub fn resolve_scope_chain(
    tx: &dyn Transaction,
    target: &ResourceRef,
) -> Result<ScopeChain, ScopeError> {
    match target {
        ResourceRef::Organization(id) => {
            if tx.get_organization(id)?.is_none() {
                return Err(ScopeError::not_found("organization", id));
            }
            Ok(ScopeChain::organization(id.as_str()))
        }
        ResourceRef::Department(id) => department_chain(tx, id, "department"),
        ResourceRef::Team(id) => team_chain(tx, id),
        ResourceRef::Resource(kind, id) => {
            let resource = match tx.get_resource(*kind, id)? {
                Some(resource) => resource,
                None => return Err(ScopeError::not_found(kind.as_str(), id)),
            };
            owner_chain(tx, &resource.owner).map_err(|err| match err {
                ScopeError::NotFound { kind: owner, id: owner_id } => ScopeError::Invariant(
                    format!("{kind} '{id}' is owned by missing {owner} '{owner_id}'"),
                ),
                err => err,
            })
        }
        ResourceRef::ApiKey(id) => match tx.get_api_key(id)? {
            Some(key) => Ok(ScopeChain::personal(key.user_id)),
            None => Err(ScopeError::not_found("apikey", id)),
        },
        ResourceRef::User(id) => match tx.get_user(id)? {
            Some(user) => Ok(ScopeChain::personal(user.id)),
            None => Err(ScopeError::not_found("user", id)),
        },
    }
}

/// Chain of the declared owner of a scoped resource. Used both when reading a
/// resource and when checking creation against the owner.
pub fn owner_chain(tx: &dyn Transaction, owner: &Owner) -> Result<ScopeChain, ScopeError> {
    match owner {
        Owner::Team(id) => team_chain(tx, id),
        Owner::Department(id) => department_chain(tx, id, "department"),
        Owner::Organization(id) => {
            resolve_scope_chain(tx, &ResourceRef::Organization(id.clone()))
        }
        Owner::User(id) => resolve_scope_chain(tx, &ResourceRef::User(id.clone())),
    }
}

fn department_chain(
    tx: &dyn Transaction,
    id: &str,
    kind: &'static str,
) -> Result<ScopeChain, ScopeError> {
    let dept = match tx.get_department(id)? {
        Some(dept) => dept,
        None => return Err(ScopeError::not_found(kind, id)),
    };
    if tx.get_organization(&dept.organization_id)?.is_none() {
        return Err(ScopeError::Invariant(format!(
            "department '{id}' belongs to missing organization '{}'",
            dept.organization_id
        )));
    }
    build_chain(vec![
        Scope::Department(dept.id),
        Scope::Organization(dept.organization_id),
    ])
}

fn team_chain(tx: &dyn Transaction, id: &str) -> Result<ScopeChain, ScopeError> {
    let team = match tx.get_team(id)? {
        Some(team) => team,
        None => return Err(ScopeError::not_found("team", id)),
    };

    match (team.organization_id, team.department_id) {
        (None, None) => build_chain(vec![Scope::Team(team.id)]),
        (Some(org_id), None) => {
            if tx.get_organization(&org_id)?.is_none() {
                return Err(ScopeError::Invariant(format!(
                    "team '{id}' belongs to missing organization '{org_id}'"
                )));
            }
            build_chain(vec![Scope::Team(team.id), Scope::Organization(org_id)])
        }
        (Some(org_id), Some(dept_id)) => {
            let dept = match tx.get_department(&dept_id)? {
                Some(dept) => dept,
                None => {
                    return Err(ScopeError::Invariant(format!(
                        "team '{id}' belongs to missing department '{dept_id}'"
                    )))
                }
            };
            if dept.organization_id != org_id {
                return Err(ScopeError::Invariant(format!(
                    "team '{id}' declares organization '{org_id}' but its department '{dept_id}' belongs to '{}'",
                    dept.organization_id
                )));
            }
            build_chain(vec![
                Scope::Team(team.id),
                Scope::Department(dept_id),
                Scope::Organization(org_id),
            ])
        }
        (None, Some(dept_id)) => Err(ScopeError::Invariant(format!(
            "team '{id}' has department '{dept_id}' but no organization"
        ))),
    }
}

fn build_chain(scopes: Vec<Scope>) -> Result<ScopeChain, ScopeError> {
    ScopeChain::new(scopes).map_err(|err| ScopeError::Invariant(format!("{err:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: &str) -> Scope {
        Scope::Organization(id.to_string())
    }

    fn dept(id: &str) -> Scope {
        Scope::Department(id.to_string())
    }

    fn team(id: &str) -> Scope {
        Scope::Team(id.to_string())
    }

    #[test]
    fn test_chain_validate() {
        assert!(ScopeChain::new(vec![team("t"), dept("d"), org("o")]).is_ok());
        assert!(ScopeChain::new(vec![team("t"), org("o")]).is_ok());
        assert!(ScopeChain::new(vec![team("t")]).is_ok());
        assert!(ScopeChain::new(vec![dept("d"), org("o")]).is_ok());
        assert!(ScopeChain::new(vec![Scope::PersonalOwner(String::from("u"))]).is_ok());

        assert!(ScopeChain::new(vec![]).is_err());
        assert!(ScopeChain::new(vec![org("o"), team("t")]).is_err());
        assert!(ScopeChain::new(vec![team("t"), team("t2")]).is_err());
        assert!(ScopeChain::new(vec![dept("d"), dept("d2"), org("o")]).is_err());
        assert!(
            ScopeChain::new(vec![Scope::PersonalOwner(String::from("u")), org("o")]).is_err()
        );
    }

    #[test]
    fn test_chain_accessors() {
        let chain = ScopeChain::new(vec![team("t"), dept("d"), org("o")]).unwrap();
        assert_eq!(chain.target(), &team("t"));
        assert_eq!(chain.department_id(), Some("d"));
        assert_eq!(chain.organization_id(), Some("o"));
        assert_eq!(chain.personal_owner(), None);

        let chain = ScopeChain::personal("u");
        assert_eq!(chain.personal_owner(), Some("u"));
        assert_eq!(chain.organization_id(), None);
    }
}
