use std::sync::Arc;

use actix_web::HttpRequest;
use anyhow::Result;
use log::debug;

use crate::server::db::Database;
use crate::types::apikey::{split_key, verify_secret};

use super::bearer_token::continue_with;
use super::{Authenticator, AuthnResponse, AuthnUserInfo};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Accepts `X-API-Key: <id>.<secret>`, checked against the stored hash.
pub struct ApiKeyAuthenticator {
    db: Arc<Database>,
}

impl ApiKeyAuthenticator {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl Authenticator for ApiKeyAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        if user.is_some() {
            return Ok(continue_with(user));
        }

        let key = match req.headers().get(API_KEY_HEADER) {
            Some(key) => match key.to_str() {
                Ok(key) => key.trim().to_string(),
                Err(_) => return Ok(AuthnResponse::Unauthenticated),
            },
            None => return Ok(AuthnResponse::Continue),
        };

        let (id, secret) = match split_key(&key) {
            Some(parts) => parts,
            None => return Ok(AuthnResponse::Unauthenticated),
        };

        let user = self.db.with_transaction(|tx| {
            let key = match tx.get_api_key(id)? {
                Some(key) => key,
                None => return Ok(None),
            };
            if !verify_secret(secret, &key.hash) {
                return Ok(None);
            }
            tx.get_user(&key.user_id)
        })?;

        match user {
            Some(user) => Ok(AuthnResponse::Ok(user.into())),
            None => {
                debug!("Reject api key '{id}'");
                Ok(AuthnResponse::Unauthenticated)
            }
        }
    }
}
