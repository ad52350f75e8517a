use anyhow::Result;

use super::{Authorizer, AuthzRequest, AuthzResponse, MembershipGraph};

/// Decides chains made of a single personal owner. Only the owner passes, and
/// there is no distinction between levels.
pub struct PersonalAuthorizer;

impl PersonalAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for PersonalAuthorizer {
    fn authorize_request<G>(&self, _graph: &G, req: &AuthzRequest) -> Result<AuthzResponse>
    where
        G: MembershipGraph + ?Sized,
    {
        match req.chain.personal_owner() {
            Some(owner) if owner == req.user.id => Ok(AuthzResponse::Ok),
            Some(_) => Ok(AuthzResponse::Unauthorized),
            None => Ok(AuthzResponse::Continue),
        }
    }
}
