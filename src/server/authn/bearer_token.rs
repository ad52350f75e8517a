use std::sync::Arc;

use actix_web::HttpRequest;
use anyhow::Result;
use log::debug;

use crate::server::db::Database;

use super::token::TokenValidator;
use super::{Authenticator, AuthnResponse, AuthnUserInfo};

/// Accepts `Authorization: Bearer <token>`. The token only carries the user
/// id; the user row is read again so rank changes apply at once.
pub struct BearerTokenAuthenticator<T: TokenValidator> {
    validator: T,
    db: Arc<Database>,
}

impl<T: TokenValidator> BearerTokenAuthenticator<T> {
    pub fn new(validator: T, db: Arc<Database>) -> Self {
        Self { validator, db }
    }
}

impl<T: TokenValidator + Sync + Send> Authenticator for BearerTokenAuthenticator<T> {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        let auth = match req.headers().get("Authorization") {
            Some(auth) => match auth.to_str() {
                Ok(auth) => auth.trim().to_string(),
                Err(_) => return Ok(AuthnResponse::Unauthenticated),
            },
            None => return Ok(continue_with(user)),
        };

        if auth.is_empty() {
            return Ok(continue_with(user));
        }

        let mut iter = auth.split_whitespace();
        match iter.next() {
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
            _ => return Ok(AuthnResponse::Unauthenticated),
        }

        let token = match iter.next() {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(AuthnResponse::Unauthenticated),
        };

        let user_id = match self.validator.validate_token(token) {
            Ok(user_id) => user_id,
            Err(e) => {
                debug!("Reject bearer token: {e:#}");
                return Ok(AuthnResponse::Unauthenticated);
            }
        };

        let record = self.db.with_transaction(|tx| tx.get_user(&user_id))?;
        match record {
            Some(record) => Ok(AuthnResponse::Ok(record.into())),
            None => {
                debug!("Reject bearer token: user '{user_id}' no longer exists");
                Ok(AuthnResponse::Unauthenticated)
            }
        }
    }
}

pub(super) fn continue_with(user: Option<AuthnUserInfo>) -> AuthnResponse {
    match user {
        Some(user) => AuthnResponse::Ok(user),
        None => AuthnResponse::Continue,
    }
}
