use std::sync::Arc;

use actix_web::HttpRequest;
use log::{error, info};

use crate::server::authn::token::jwt::JwtTokenGenerator;
use crate::server::authn::token::TokenGenerator;
use crate::server::db::{Database, UserRecord};
use crate::server::error::ApiError;
use crate::server::response::{self, Response};
use crate::time::current_timestamp;
use crate::types::user::{generate_password_hash, validate_user_name, GlobalRank, RegisterRequest};

use super::Handler;

/// `POST /register`. Without a password the account is a guest, which can
/// only use the token returned here.
pub struct RegisterHandler {
    allow_registration: bool,
    allow_guests: bool,
    token_generator: Arc<JwtTokenGenerator>,
    db: Arc<Database>,
}

impl RegisterHandler {
    pub fn new(
        allow_registration: bool,
        allow_guests: bool,
        token_generator: Arc<JwtTokenGenerator>,
        db: Arc<Database>,
    ) -> Self {
        Self {
            allow_registration,
            allow_guests,
            token_generator,
            db,
        }
    }

    fn build_record(&self, req: RegisterRequest) -> Result<UserRecord, Response> {
        if let Err(e) = validate_user_name(&req.name) {
            return Err(Response::bad_request(format!("{e:#}")));
        }

        let (rank, hash, salt) = match req.password {
            Some(password) if !password.is_empty() => {
                let (hash, salt) = generate_password_hash(&password);
                (GlobalRank::Registered, hash, salt)
            }
            _ if self.allow_guests => (GlobalRank::Guest, String::new(), String::new()),
            _ => return Err(Response::bad_request("Password is required")),
        };

        let now = current_timestamp();
        Ok(UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: req.name,
            rank,
            hash,
            salt,
            create_time: now,
            update_time: now,
            last_active: now,
        })
    }
}

impl Handler for RegisterHandler {
    fn handle(&self, _path: &str, _req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        if !self.allow_registration {
            return Response::forbidden("Registration is disabled");
        }

        let req: RegisterRequest = match body.as_deref().map(serde_json::from_slice::<RegisterRequest>) {
            Some(Ok(req)) => req,
            Some(Err(e)) => return Response::bad_request(format!("invalid request body: {e}")),
            None => return Response::bad_request("request body is required"),
        };

        let record = match self.build_record(req) {
            Ok(record) => record,
            Err(resp) => return resp,
        };

        let result = self.db.with_transaction(|tx| {
            if tx.get_user_by_name(&record.name)?.is_some() {
                return Err(ApiError::bad_request(format!(
                    "user name '{}' is already taken",
                    record.name
                )));
            }
            tx.create_user(&record)
        });
        if let Err(e) = result {
            return Response::from_error(e);
        }
        info!("Register user '{}' as {}", record.name, record.rank);

        match self.token_generator.generate_token(record.id) {
            Ok(token) => Response::json(token),
            Err(e) => {
                error!("Failed to generate token: {e:#}");
                Response::error(response::TOKEN_ERROR)
            }
        }
    }
}
