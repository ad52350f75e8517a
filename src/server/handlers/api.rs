use std::sync::Arc;

use actix_web::HttpRequest;
use log::{error, warn};

use crate::server::authn::chain::ChainAuthenticator;
use crate::server::authn::token::jwt::JwtTokenValidator;
use crate::server::authn::{Authenticator, AuthnResponse, AuthnUserInfo};
use crate::server::authz::chain::ChainAuthorizer;
use crate::server::db::Database;
use crate::server::response::{self, Response};
use crate::time::current_timestamp;

use super::path::ApiPath;
use super::resources::dispatch::Dispatcher;
use super::resources::{Method, ResourceRequest};
use super::Handler;

pub struct ApiHandler {
    authn: ChainAuthenticator<JwtTokenValidator>,
    db: Arc<Database>,

    dispatcher: Dispatcher,
}

impl ApiHandler {
    pub fn new(
        authn: ChainAuthenticator<JwtTokenValidator>,
        authz: ChainAuthorizer,
        db: Arc<Database>,
    ) -> Self {
        Self {
            authn,
            db: db.clone(),
            dispatcher: Dispatcher::new(db, authz),
        }
    }

    /// Failing to record activity never fails the request.
    fn touch(&self, user: &AuthnUserInfo) {
        let now = current_timestamp();
        let result = self
            .db
            .with_transaction(|tx| tx.update_user_last_active(&user.id, now));
        if let Err(e) = result {
            warn!("Update last active time for '{}' failed: {e:#}", user.id);
        }
    }
}

impl Handler for ApiHandler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        let authn_resp = match self.authn.authenticate_request(&req, None) {
            Ok(resp) => resp,
            Err(e) => {
                error!("Authentication failed: {e:#}");
                return Response::error(response::AUTHN_ERROR);
            }
        };
        let user = match authn_resp {
            AuthnResponse::Ok(user) => user,
            _ => return Response::unauthenticated("Missing or invalid credential"),
        };

        self.touch(&user);

        let method = match Method::parse(req.method().as_str()) {
            Some(method) => method,
            None => return Response::method_not_allowed(),
        };

        let api_path = match ApiPath::parse(path) {
            Some(api_path) => api_path,
            None => return Response::not_found(format!("no resource at '{path}'")),
        };

        let rsc_req = ResourceRequest::new(method, body);
        self.dispatcher.dispatch(api_path, rsc_req, &user)
    }
}
