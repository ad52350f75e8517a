use anyhow::Result;

use crate::server::authn::AuthnUserInfo;
use crate::server::scope::ScopeChain;

use super::union::UnionAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse, Decision, Level, MembershipGraph};

pub struct ChainAuthorizer {
    authorizers: Vec<UnionAuthorizer>,
}

impl ChainAuthorizer {
    pub fn new(authorizers: Vec<UnionAuthorizer>) -> Self {
        Self { authorizers }
    }

    /// Runs the whole chain and collapses the outcome into a decision. A chain
    /// that only ever continues denies.
    pub fn authorize<G>(
        &self,
        graph: &G,
        user: &AuthnUserInfo,
        level: Level,
        chain: &ScopeChain,
    ) -> Result<Decision>
    where
        G: MembershipGraph + ?Sized,
    {
        let req = AuthzRequest { user, level, chain };
        match self.authorize_request(graph, &req)? {
            AuthzResponse::Ok => Ok(Decision::Allow),
            AuthzResponse::Continue | AuthzResponse::Unauthorized => Ok(Decision::Deny),
        }
    }
}

impl Authorizer for ChainAuthorizer {
    fn authorize_request<G>(&self, graph: &G, req: &AuthzRequest) -> Result<AuthzResponse>
    where
        G: MembershipGraph + ?Sized,
    {
        for authorizer in self.authorizers.iter() {
            match authorizer.authorize_request(graph, req)? {
                AuthzResponse::Ok => return Ok(AuthzResponse::Ok),
                AuthzResponse::Continue => continue,
                AuthzResponse::Unauthorized => return Ok(AuthzResponse::Unauthorized),
            }
        }

        Ok(AuthzResponse::Continue)
    }
}
