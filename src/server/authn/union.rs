use actix_web::HttpRequest;
use anyhow::Result;

use super::admin::AdminAuthenticator;
use super::api_key::ApiKeyAuthenticator;
use super::bearer_token::BearerTokenAuthenticator;
use super::token::TokenValidator;
use super::{Authenticator, AuthnResponse, AuthnUserInfo};

/// One credential source of the chain. Dispatching through an enum keeps the
/// chain free of trait objects.
pub enum UnionAuthenticator<T: TokenValidator> {
    BearerToken(BearerTokenAuthenticator<T>),
    ApiKey(ApiKeyAuthenticator),
    Admin(AdminAuthenticator),
}

impl<T: TokenValidator> UnionAuthenticator<T> {
    pub fn name(&self) -> &'static str {
        match self {
            UnionAuthenticator::BearerToken(_) => "bearer",
            UnionAuthenticator::ApiKey(_) => "apikey",
            UnionAuthenticator::Admin(_) => "admin",
        }
    }
}

impl<T: TokenValidator + Sync + Send> Authenticator for UnionAuthenticator<T> {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        match self {
            UnionAuthenticator::BearerToken(auth) => auth.authenticate_request(req, user),
            UnionAuthenticator::ApiKey(auth) => auth.authenticate_request(req, user),
            UnionAuthenticator::Admin(auth) => auth.authenticate_request(req, user),
        }
    }
}
