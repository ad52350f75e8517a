use anyhow::Result;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::error::ApiError;
use crate::server::handlers::path::ScopePath;
use crate::server::membership;
use crate::server::response::Response;
use crate::types::org::{PatchMemberRequest, PutMemberRequest};

use super::{Method, ResourceRequest};

/// `.../members` under any organization, department or team path. Writes
/// are authorized before the body is decoded.
pub fn collection(guard: &Guard, scope: &ScopePath, req: &ResourceRequest) -> Result<Response> {
    let chain = scope.resolve(guard.tx)?;
    match req.method {
        Method::Get => {
            let members = membership::list_members(guard, &chain)?;
            Ok(Response::list(members))
        }
        Method::Put => {
            guard.require(Level::Manage, &chain)?;
            let body: PutMemberRequest = req.json()?;
            membership::add_membership(guard, &chain, &body.user_id, body.role)?;
            Ok(Response::ok())
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

pub fn item(
    guard: &Guard,
    scope: &ScopePath,
    user_id: &str,
    req: &ResourceRequest,
) -> Result<Response> {
    let chain = scope.resolve(guard.tx)?;
    match req.method {
        Method::Patch => {
            guard.require(Level::Manage, &chain)?;
            let body: PatchMemberRequest = req.json()?;
            membership::change_role(guard, &chain, user_id, body.role)?;
            Ok(Response::ok())
        }
        Method::Delete => {
            membership::remove_membership(guard, &chain, user_id)?;
            Ok(Response::ok())
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}
