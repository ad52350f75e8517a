use anyhow::Result;

use super::{Authorizer, AuthzRequest, AuthzResponse, MembershipGraph};

/// Grants when any scope in the chain gives the user a role strong enough for
/// the requested level. Roles flow down: an admin of an organization manages
/// every department and team under it without rows of their own there.
pub struct MembershipAuthorizer;

impl MembershipAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for MembershipAuthorizer {
    fn authorize_request<G>(&self, graph: &G, req: &AuthzRequest) -> Result<AuthzResponse>
    where
        G: MembershipGraph + ?Sized,
    {
        for scope in req.chain.scopes() {
            if let Some(role) = graph.role_at(scope, &req.user.id)? {
                if req.level.granted_by(role) {
                    return Ok(AuthzResponse::Ok);
                }
            }
        }

        Ok(AuthzResponse::Continue)
    }
}
