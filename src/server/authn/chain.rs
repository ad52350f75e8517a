use actix_web::HttpRequest;
use anyhow::{Context, Result};
use log::debug;

use super::token::TokenValidator;
use super::union::UnionAuthenticator;
use super::{Authenticator, AuthnResponse, AuthnUserInfo};

/// Runs every credential source in order. A source that identifies the
/// caller hands the identity to the next one, which may only pass it on or
/// reject the request. The first rejection ends the chain.
pub struct ChainAuthenticator<T: TokenValidator> {
    authenticators: Vec<UnionAuthenticator<T>>,
}

impl<T: TokenValidator> ChainAuthenticator<T> {
    pub fn new(authenticators: Vec<UnionAuthenticator<T>>) -> Self {
        Self { authenticators }
    }
}

impl<T: TokenValidator + Sync + Send> Authenticator for ChainAuthenticator<T> {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        mut user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        for authenticator in self.authenticators.iter() {
            let name = authenticator.name();
            let resp = authenticator
                .authenticate_request(req, user.clone())
                .with_context(|| format!("{name} authenticator"))?;
            match resp {
                AuthnResponse::Ok(found) => {
                    match &user {
                        Some(prev) if prev.id == found.id => {}
                        _ => debug!("Request identified as '{}' by {name}", found.name),
                    }
                    user = Some(found);
                }
                AuthnResponse::Continue => {}
                AuthnResponse::Unauthenticated => {
                    debug!("Request rejected by {name} authenticator");
                    return Ok(AuthnResponse::Unauthenticated);
                }
            }
        }
        match user {
            Some(user) => Ok(AuthnResponse::Ok(user)),
            None => Ok(AuthnResponse::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use actix_web::test::TestRequest;

    use crate::server::authn::admin::AdminAuthenticator;
    use crate::server::authn::api_key::ApiKeyAuthenticator;
    use crate::server::authn::bearer_token::BearerTokenAuthenticator;
    use crate::server::authn::token::simple::SimpleToken;
    use crate::server::db::{ApiKeyRecord, Database, UserRecord};
    use crate::types::apikey::hash_secret;
    use crate::types::user::GlobalRank;

    use super::*;

    fn build_chain(allow_list: &[&str]) -> ChainAuthenticator<SimpleToken> {
        let db = Arc::new(Database::new_test());
        db.with_transaction(|tx| {
            for (id, rank) in [("alice", GlobalRank::Registered), ("root", GlobalRank::Admin)] {
                tx.create_user(&UserRecord {
                    id: id.to_string(),
                    name: id.to_string(),
                    rank,
                    hash: String::new(),
                    salt: String::new(),
                    create_time: 1,
                    update_time: 1,
                    last_active: 1,
                })?;
            }
            tx.create_api_key(&ApiKeyRecord {
                id: String::from("k1"),
                user_id: String::from("alice"),
                name: String::from("ci"),
                hash: hash_secret("s3cret"),
                create_time: 1,
            })?;
            Ok(())
        })
        .unwrap();

        let allow_list = allow_list.iter().map(|s| s.to_string()).collect::<HashSet<_>>();
        ChainAuthenticator::new(vec![
            UnionAuthenticator::BearerToken(BearerTokenAuthenticator::new(
                SimpleToken::new(),
                db.clone(),
            )),
            UnionAuthenticator::ApiKey(ApiKeyAuthenticator::new(db)),
            UnionAuthenticator::Admin(AdminAuthenticator::new(allow_list)),
        ])
    }

    fn run(chain: &ChainAuthenticator<SimpleToken>, req: TestRequest) -> AuthnResponse {
        chain.authenticate_request(&req.to_http_request(), None).unwrap()
    }

    fn user_of(resp: AuthnResponse) -> Option<String> {
        match resp {
            AuthnResponse::Ok(user) => Some(user.id),
            _ => None,
        }
    }

    #[test]
    fn test_chain_order() {
        let chain = build_chain(&["*"]);

        assert!(matches!(
            run(&chain, TestRequest::default()),
            AuthnResponse::Continue
        ));

        let req =
            TestRequest::default().insert_header(("Authorization", "Bearer simple-token-alice"));
        assert_eq!(user_of(run(&chain, req)), Some(String::from("alice")));

        // A bearer identity wins over an api key for someone else
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer simple-token-root"))
            .insert_header(("X-API-Key", "k1.s3cret"));
        assert_eq!(user_of(run(&chain, req)), Some(String::from("root")));

        // A bad bearer ends the chain even with a valid api key
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer other-token-alice"))
            .insert_header(("X-API-Key", "k1.s3cret"));
        assert!(matches!(run(&chain, req), AuthnResponse::Unauthenticated));

        let req = TestRequest::default().insert_header(("X-API-Key", "k1.s3cret"));
        assert_eq!(user_of(run(&chain, req)), Some(String::from("alice")));
    }

    #[test]
    fn test_chain_admin_restricted() {
        let chain = build_chain(&["10.0.0.1"]);

        let req = TestRequest::default()
            .peer_addr("10.0.0.9:4000".parse().unwrap())
            .insert_header(("Authorization", "Bearer simple-token-root"));
        assert!(matches!(run(&chain, req), AuthnResponse::Unauthenticated));

        let req = TestRequest::default()
            .peer_addr("10.0.0.1:4000".parse().unwrap())
            .insert_header(("Authorization", "Bearer simple-token-root"));
        assert_eq!(user_of(run(&chain, req)), Some(String::from("root")));

        let req = TestRequest::default()
            .peer_addr("10.0.0.9:4000".parse().unwrap())
            .insert_header(("Authorization", "Bearer simple-token-alice"));
        assert_eq!(user_of(run(&chain, req)), Some(String::from("alice")));
    }
}
