use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use crate::server::db::Database;

use super::admin::AdminAuthenticator;
use super::api_key::ApiKeyAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::chain::ChainAuthenticator;
use super::config::AuthnConfig;
use super::token::factory::TokenFactory;
use super::token::jwt::JwtTokenValidator;
use super::union::UnionAuthenticator;

/// Factory for building authentication chains based on configuration.
///
/// This factory creates a chain of authenticators in the following order:
/// 1. Bearer token authentication
/// 2. API key authentication
/// 3. Admin allow-list check
pub struct AuthnFactory;

impl AuthnFactory {
    /// Creates a new authentication factory.
    pub fn new() -> Self {
        Self
    }

    /// Builds an authentication chain based on the provided configuration.
    ///
    /// # Arguments
    /// * `cfg` - Authentication configuration
    /// * `token_factory` - Factory for creating token validators
    /// * `db` - Database for resolving token subjects and API keys
    pub fn build_authenticator(
        &self,
        cfg: &AuthnConfig,
        token_factory: &TokenFactory,
        db: Arc<Database>,
    ) -> Result<ChainAuthenticator<JwtTokenValidator>> {
        let mut authenticators = Vec::new();

        let jwt = token_factory.build_token_validator()?;
        let token_auth = BearerTokenAuthenticator::new(jwt, db.clone());
        authenticators.push(UnionAuthenticator::BearerToken(token_auth));

        let api_key_auth = ApiKeyAuthenticator::new(db);
        authenticators.push(UnionAuthenticator::ApiKey(api_key_auth));

        if cfg.admin_allow_list.is_empty() {
            warn!("Admin allow list is empty, global admins cannot authenticate");
        } else if cfg.admin_allow_list.contains("*") {
            warn!("Allow every IP to authenticate as admin (with '*' in admin_allow_list), this is dangerous");
        } else {
            info!("Global admins are limited to {:?}", cfg.admin_allow_list);
        }
        let admin_auth = AdminAuthenticator::new(cfg.admin_allow_list.clone());
        authenticators.push(UnionAuthenticator::Admin(admin_auth));

        Ok(ChainAuthenticator::new(authenticators))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use actix_web::test::TestRequest;

    use crate::config::CommonConfig;
    use crate::server::authn::token::jwt::JwtTokenGenerator;
    use crate::server::authn::token::TokenGenerator;
    use crate::server::authn::{Authenticator, AuthnResponse};
    use crate::server::db::{ApiKeyRecord, UserRecord};
    use crate::types::apikey::hash_secret;
    use crate::types::user::GlobalRank;

    use super::*;

    fn user(id: &str, rank: GlobalRank) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: format!("{id}-name"),
            rank,
            hash: String::new(),
            salt: String::new(),
            create_time: 1,
            update_time: 1,
            last_active: 1,
        }
    }

    fn setup() -> (Arc<Database>, TokenFactory) {
        let db = Arc::new(Database::new_test());
        db.with_transaction(|tx| {
            tx.create_user(&user("alice", GlobalRank::Registered))?;
            tx.create_user(&user("root", GlobalRank::Admin))?;
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
        (db, TokenFactory::generate(3600).unwrap())
    }

    fn authenticate(
        chain: &ChainAuthenticator<JwtTokenValidator>,
        req: TestRequest,
    ) -> Option<String> {
        let req = req.to_http_request();
        match chain.authenticate_request(&req, None).unwrap() {
            AuthnResponse::Ok(user) => Some(user.id),
            _ => None,
        }
    }

    fn bearer(generator: &JwtTokenGenerator, user: &str) -> (&'static str, String) {
        let token = generator.generate_token(user.to_string()).unwrap();
        ("Authorization", format!("Bearer {}", token.token))
    }

    #[test]
    fn test_credentials() {
        let (db, token_factory) = setup();
        let cfg = <AuthnConfig as CommonConfig>::default();
        let chain = AuthnFactory::new()
            .build_authenticator(&cfg, &token_factory, db)
            .unwrap();
        let generator = token_factory.build_token_generator().unwrap();

        assert_eq!(authenticate(&chain, TestRequest::default()), None);

        let req = TestRequest::default().insert_header(bearer(&generator, "alice"));
        assert_eq!(authenticate(&chain, req), Some(String::from("alice")));

        // Subject no longer exists
        let req = TestRequest::default().insert_header(bearer(&generator, "ghost"));
        assert_eq!(authenticate(&chain, req), None);

        let req = TestRequest::default().insert_header(("Authorization", "Bearer garbage"));
        assert_eq!(authenticate(&chain, req), None);

        let req = TestRequest::default().insert_header(("Authorization", "Basic abc"));
        assert_eq!(authenticate(&chain, req), None);

        let req = TestRequest::default().insert_header(("X-API-Key", "k1.s3cret"));
        assert_eq!(authenticate(&chain, req), Some(String::from("alice")));

        let req = TestRequest::default().insert_header(("X-API-Key", "k1.wrong"));
        assert_eq!(authenticate(&chain, req), None);

        let req = TestRequest::default().insert_header(("X-API-Key", "k9.s3cret"));
        assert_eq!(authenticate(&chain, req), None);

        let req = TestRequest::default().insert_header(("X-API-Key", "no-dot"));
        assert_eq!(authenticate(&chain, req), None);

        let req = TestRequest::default().insert_header(bearer(&generator, "root"));
        assert_eq!(authenticate(&chain, req), Some(String::from("root")));
    }

    #[test]
    fn test_admin_allow_list() {
        let (db, token_factory) = setup();
        let mut cfg = <AuthnConfig as CommonConfig>::default();
        cfg.admin_allow_list = [String::from("10.0.0.1")].into_iter().collect::<HashSet<_>>();
        let chain = AuthnFactory::new()
            .build_authenticator(&cfg, &token_factory, db)
            .unwrap();
        let generator = token_factory.build_token_generator().unwrap();

        let req = TestRequest::default()
            .peer_addr("10.0.0.1:5000".parse().unwrap())
            .insert_header(bearer(&generator, "root"));
        assert_eq!(authenticate(&chain, req), Some(String::from("root")));

        let req = TestRequest::default()
            .peer_addr("10.0.0.2:5000".parse().unwrap())
            .insert_header(bearer(&generator, "root"));
        assert_eq!(authenticate(&chain, req), None);

        // Only global admins are restricted
        let req = TestRequest::default()
            .peer_addr("10.0.0.2:5000".parse().unwrap())
            .insert_header(bearer(&generator, "alice"));
        assert_eq!(authenticate(&chain, req), Some(String::from("alice")));
    }
}
