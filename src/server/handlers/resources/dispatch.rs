use std::sync::Arc;

use anyhow::Result;

use crate::server::authn::AuthnUserInfo;
use crate::server::authz::chain::ChainAuthorizer;
use crate::server::authz::guard::Guard;
use crate::server::db::Database;
use crate::server::error::ApiError;
use crate::server::handlers::path::{ApiPath, ScopePath};
use crate::server::response::Response;
use crate::types::user::{CaniResponse, WhoamiResponse};

use super::{
    apikeys, departments, members, organizations, scoped, teams, users, Method, ResourceRequest,
};

/// Routes a parsed path to its controller. Every request runs in one
/// transaction; a controller error, including a denial, rolls it back.
pub struct Dispatcher {
    db: Arc<Database>,
    authz: ChainAuthorizer,
}

impl Dispatcher {
    pub fn new(db: Arc<Database>, authz: ChainAuthorizer) -> Self {
        Self { db, authz }
    }

    pub fn dispatch(&self, path: ApiPath, req: ResourceRequest, user: &AuthnUserInfo) -> Response {
        let result = self.db.with_transaction(|tx| {
            let guard = Guard::new(tx, &self.authz, user);
            Self::route(&guard, path, &req)
        });
        match result {
            Ok(resp) => resp,
            Err(e) => Response::from_error(e),
        }
    }

    fn route(guard: &Guard, path: ApiPath, req: &ResourceRequest) -> Result<Response> {
        match path {
            ApiPath::Whoami => Self::whoami(guard, req),
            ApiPath::Cani(level, scope) => {
                if req.method != Method::Get {
                    return Err(ApiError::method_not_allowed());
                }
                let chain = scope.resolve(guard.tx)?;
                let allow = guard.allows(level, &chain)?;
                Ok(Response::json(CaniResponse { allow }))
            }
            ApiPath::Users(None) => users::collection(guard, req),
            ApiPath::Users(Some(id)) => users::item(guard, &id, req),
            ApiPath::ApiKeys(None) => apikeys::collection(guard, req),
            ApiPath::ApiKeys(Some(id)) => apikeys::item(guard, &id, req),
            ApiPath::Organizations => organizations::collection(guard, req),
            ApiPath::Teams => teams::personal_collection(guard, req),
            ApiPath::Departments(scope) => departments::collection(guard, &scope, req),
            ApiPath::ScopedTeams(scope) => teams::scoped_collection(guard, &scope, req),
            ApiPath::Scope(scope) => {
                let chain = scope.resolve(guard.tx)?;
                match scope {
                    ScopePath::Organization { .. } => organizations::item(guard, &chain, req),
                    ScopePath::Department { .. } => departments::item(guard, &chain, req),
                    ScopePath::Team { .. } => teams::item(guard, &chain, req),
                }
            }
            ApiPath::Members(scope, None) => members::collection(guard, &scope, req),
            ApiPath::Members(scope, Some(user_id)) => members::item(guard, &scope, &user_id, req),
            ApiPath::Resources(kind, None) => scoped::collection(guard, kind, req),
            ApiPath::Resources(kind, Some(id)) => scoped::item(guard, kind, &id, req),
        }
    }

    fn whoami(guard: &Guard, req: &ResourceRequest) -> Result<Response> {
        if req.method != Method::Get {
            return Err(ApiError::method_not_allowed());
        }
        Ok(Response::json(WhoamiResponse {
            id: guard.user.id.clone(),
            name: guard.user.name.clone(),
            rank: guard.user.rank,
        }))
    }
}
