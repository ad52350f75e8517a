use anyhow::Result;
use log::info;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::error::ApiError;
use crate::server::response::Response;
use crate::server::scope::ResourceRef;
use crate::time::current_timestamp;
use crate::types::user::{PatchUserRequest, User};

use super::{Method, ResourceRequest};

pub fn collection(guard: &Guard, req: &ResourceRequest) -> Result<Response> {
    match req.method {
        Method::Get => {
            guard.require_global_admin()?;
            let users: Vec<User> = guard
                .tx
                .list_users()?
                .into_iter()
                .map(User::from)
                .collect();
            Ok(Response::list(users))
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

/// A user is a personal resource of itself. Changing a rank is reserved for
/// global admins and leaves memberships alone.
pub fn item(guard: &Guard, id: &str, req: &ResourceRequest) -> Result<Response> {
    let chain = guard.resolve(&ResourceRef::User(id.to_string()))?;
    match req.method {
        Method::Get => {
            guard.require(Level::View, &chain)?;
            Ok(Response::json(get(guard, id)?))
        }
        Method::Patch => {
            guard.require_global_admin()?;
            let body: PatchUserRequest = req.json()?;
            guard
                .tx
                .update_user_rank(id, body.rank, current_timestamp())?;
            info!(
                "Change rank of user '{id}' to {} by '{}'",
                body.rank, guard.user.id
            );
            Ok(Response::json(get(guard, id)?))
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

fn get(guard: &Guard, id: &str) -> Result<User> {
    match guard.tx.get_user(id)? {
        Some(record) => Ok(record.into()),
        None => Err(ApiError::not_found(format!("user '{id}' not found"))),
    }
}
