use anyhow::Result;

use super::admin::AdminAuthorizer;
use super::membership::MembershipAuthorizer;
use super::personal::PersonalAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse, MembershipGraph};

pub enum UnionAuthorizer {
    Admin(AdminAuthorizer),
    Personal(PersonalAuthorizer),
    Membership(MembershipAuthorizer),
}

impl Authorizer for UnionAuthorizer {
    fn authorize_request<G>(&self, graph: &G, req: &AuthzRequest) -> Result<AuthzResponse>
    where
        G: MembershipGraph + ?Sized,
    {
        match self {
            UnionAuthorizer::Admin(a) => a.authorize_request(graph, req),
            UnionAuthorizer::Personal(p) => p.authorize_request(graph, req),
            UnionAuthorizer::Membership(m) => m.authorize_request(graph, req),
        }
    }
}
