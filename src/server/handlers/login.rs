use std::collections::HashSet;
use std::sync::Arc;

use actix_web::HttpRequest;
use log::{error, info, warn};

use crate::server::authn::admin::{peer_host, AdminAuthenticator};
use crate::server::authn::token::jwt::JwtTokenGenerator;
use crate::server::authn::token::TokenGenerator;
use crate::server::db::Database;
use crate::server::response::{self, Response};
use crate::types::user::verify_password;

use super::Handler;

/// `POST /login/{name}` with the password as the body.
pub struct LoginHandler {
    admin_allow_list: HashSet<String>,
    token_generator: Arc<JwtTokenGenerator>,
    db: Arc<Database>,
}

impl LoginHandler {
    pub fn new(
        admin_allow_list: HashSet<String>,
        token_generator: Arc<JwtTokenGenerator>,
        db: Arc<Database>,
    ) -> Self {
        Self {
            admin_allow_list,
            token_generator,
            db,
        }
    }
}

impl Handler for LoginHandler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        let name = path.trim_end_matches('/');
        if name.is_empty() || name.contains('/') {
            return Response::bad_request("User name is required");
        }

        let password = match body {
            Some(body) => match String::from_utf8(body) {
                Ok(password) => password,
                Err(_) => return Response::bad_request("Invalid password"),
            },
            None => return Response::bad_request("Password is required"),
        };
        if password.is_empty() {
            return Response::bad_request("Password is required");
        }

        let record = match self.db.with_transaction(|tx| tx.get_user_by_name(name)) {
            Ok(Some(record)) => record,
            Ok(None) => return Response::unauthenticated("User not found"),
            Err(e) => {
                error!("Failed to get user record for login: {e:#}");
                return Response::error(response::DATABASE_ERROR);
            }
        };

        if record.hash.is_empty() {
            return Response::unauthenticated("Guest accounts cannot log in with a password");
        }
        if !verify_password(&password, &record.salt, &record.hash) {
            return Response::unauthenticated("Invalid password");
        }

        if record.rank.is_global_admin() {
            let conn_info = req.connection_info();
            let client_ip = conn_info.peer_addr().map(peer_host);
            if !AdminAuthenticator::is_allowed(&self.admin_allow_list, client_ip) {
                warn!("Admin login request for '{name}': password correct, but rejected by client IP {client_ip:?}, the password may have been leaked");
                return Response::unauthenticated("ClientIP blocked");
            }
            info!("Admin '{name}' login succeeded, from {client_ip:?}");
        }

        match self.token_generator.generate_token(record.id) {
            Ok(token) => Response::json(token),
            Err(e) => {
                error!("Failed to generate token: {e:#}");
                Response::error(response::TOKEN_ERROR)
            }
        }
    }
}
