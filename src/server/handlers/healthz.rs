use std::sync::Arc;

use actix_web::HttpRequest;
use chrono::Local;
use log::error;

use crate::server::db::Database;
use crate::server::response::{self, Response};
use crate::types::healthz::HealthzResponse;

use super::Handler;

/// Liveness of the server and its database. Needs no credential.
pub struct HealthzHandler {
    db: Arc<Database>,
}

impl HealthzHandler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl Handler for HealthzHandler {
    fn handle(&self, _path: &str, req: HttpRequest, _body: Option<Vec<u8>>) -> Response {
        let users = match self.db.with_transaction(|tx| tx.count_users()) {
            Ok(users) => users,
            Err(e) => {
                error!("Health check database query failed: {e:#}");
                return Response::error(response::DATABASE_ERROR);
            }
        };

        let now = Local::now();
        Response::json(HealthzResponse {
            now: now.timestamp() as u64,
            time_zone: now.offset().to_string(),
            client_ip: req.connection_info().peer_addr().map(String::from),
            version: env!("HUDDLE_VERSION").to_string(),
            users,
        })
    }
}
