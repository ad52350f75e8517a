mod admin;
mod membership;
mod personal;
mod union;

#[cfg(test)]
mod memory;

pub mod chain;
pub mod factory;
pub mod guard;

use anyhow::Result;

use crate::types::org::Role;

use super::authn::AuthnUserInfo;
use super::scope::{Scope, ScopeChain};

/// Read access to the membership graph, the only state the engine consults.
pub trait MembershipGraph {
    fn role_at(&self, scope: &Scope, user_id: &str) -> Result<Option<Role>>;
}

pub trait Authorizer: Send + Sync {
    fn authorize_request<G>(&self, graph: &G, req: &AuthzRequest) -> Result<AuthzResponse>
    where
        G: MembershipGraph + ?Sized;
}

/// Permission level an action needs. MANAGE covers mutation and creating
/// sub-resources, VIEW covers reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    View,
    Manage,
}

impl Level {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Level::View),
            "manage" => Some(Level::Manage),
            _ => None,
        }
    }

    /// Whether `role` is enough for this level.
    pub fn granted_by(&self, role: Role) -> bool {
        match self {
            Level::View => true,
            Level::Manage => role == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone)]
pub struct AuthzRequest<'a> {
    pub user: &'a AuthnUserInfo,
    pub level: Level,
    pub chain: &'a ScopeChain,
}

/// Possible responses from an authorization check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthzResponse {
    /// Access is granted
    Ok,
    /// Defers decision to next authorizer in chain
    Continue,
    /// Access is denied
    Unauthorized,
}
