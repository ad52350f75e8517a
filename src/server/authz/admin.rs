use anyhow::Result;

use super::{Authorizer, AuthzRequest, AuthzResponse, MembershipGraph};

/// Global admin ranks override every scoped check.
pub struct AdminAuthorizer;

impl AdminAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for AdminAuthorizer {
    fn authorize_request<G>(&self, _graph: &G, req: &AuthzRequest) -> Result<AuthzResponse>
    where
        G: MembershipGraph + ?Sized,
    {
        if req.user.rank.is_global_admin() {
            return Ok(AuthzResponse::Ok);
        }

        Ok(AuthzResponse::Continue)
    }
}
