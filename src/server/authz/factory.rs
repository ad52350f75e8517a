use super::admin::AdminAuthorizer;
use super::chain::ChainAuthorizer;
use super::membership::MembershipAuthorizer;
use super::personal::PersonalAuthorizer;
use super::union::UnionAuthorizer;

pub struct AuthzFactory;

impl AuthzFactory {
    pub fn new() -> Self {
        Self
    }

    /// The order matters: the global override first, then personal chains
    /// which end the evaluation either way, then the membership walk.
    pub fn build_authorizer(&self) -> ChainAuthorizer {
        let authorizers = vec![
            UnionAuthorizer::Admin(AdminAuthorizer::new()),
            UnionAuthorizer::Personal(PersonalAuthorizer::new()),
            UnionAuthorizer::Membership(MembershipAuthorizer::new()),
        ];
        ChainAuthorizer::new(authorizers)
    }
}
