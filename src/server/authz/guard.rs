use anyhow::Result;

use crate::server::authn::AuthnUserInfo;
use crate::server::db::Transaction;
use crate::server::error::ApiError;
use crate::server::scope::{resolve_scope_chain, ResourceRef, ScopeChain};

use super::chain::ChainAuthorizer;
use super::{Decision, Level};

/// Binds one request's user and transaction to the decision engine, so a
/// controller reads as resolve, require, act.
pub struct Guard<'a> {
    pub tx: &'a dyn Transaction,
    pub user: &'a AuthnUserInfo,
    authz: &'a ChainAuthorizer,
}

impl<'a> Guard<'a> {
    pub fn new(
        tx: &'a dyn Transaction,
        authz: &'a ChainAuthorizer,
        user: &'a AuthnUserInfo,
    ) -> Self {
        Self { tx, user, authz }
    }

    /// Resolves the ownership chain; unknown targets fail with not found
    /// before any access check happens.
    pub fn resolve(&self, target: &ResourceRef) -> Result<ScopeChain> {
        Ok(resolve_scope_chain(self.tx, target)?)
    }

    pub fn allows(&self, level: Level, chain: &ScopeChain) -> Result<bool> {
        let decision = self.authz.authorize(self.tx, self.user, level, chain)?;
        Ok(decision == Decision::Allow)
    }

    pub fn require(&self, level: Level, chain: &ScopeChain) -> Result<()> {
        if self.allows(level, chain)? {
            return Ok(());
        }
        let action = match level {
            Level::View => "view",
            Level::Manage => "manage",
        };
        Err(ApiError::forbidden(format!(
            "cannot {action} {}",
            chain.target()
        )))
    }

    pub fn require_global_admin(&self) -> Result<()> {
        if self.user.rank.is_global_admin() {
            return Ok(());
        }
        Err(ApiError::forbidden("global admin required"))
    }
}
