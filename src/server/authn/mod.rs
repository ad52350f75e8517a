mod api_key;
mod bearer_token;
mod union;

pub mod admin;
pub mod chain;
pub mod config;
pub mod factory;
pub mod token;

use actix_web::HttpRequest;
use anyhow::Result;

use crate::types::user::GlobalRank;

use super::db::UserRecord;

/// Trait for request authenticators.
///
/// Implementors of this trait can authenticate HTTP requests and optionally
/// chain with other authenticators to provide multiple authentication methods.
pub trait Authenticator: Send + Sync {
    /// Attempts to authenticate a request.
    ///
    /// # Arguments
    ///
    /// * `req` - The HTTP request to authenticate
    /// * `user` - Optional user info from previous authentication attempts
    ///
    /// # Returns
    ///
    /// * `Ok(Response::Ok(user))` - Authentication successful with user info
    /// * `Ok(Response::Continue)` - Authentication skipped, try next authenticator
    /// * `Ok(Response::Unauthenticated)` - Authentication failed
    /// * `Err(_)` - Internal error during authentication
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse>;
}

/// Response from an authentication attempt.
#[derive(Debug)]
pub enum AuthnResponse {
    /// Authentication successful, contains authenticated user information
    Ok(AuthnUserInfo),
    /// Authentication skipped, should try next authenticator
    Continue,
    /// Authentication failed, should stop authentication chain
    Unauthenticated,
}

/// The resolved identity of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthnUserInfo {
    pub id: String,
    pub name: String,
    pub rank: GlobalRank,
}

impl From<UserRecord> for AuthnUserInfo {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            rank: record.rank,
        }
    }
}
