use anyhow::Result;
use log::info;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::error::ApiError;
use crate::server::response::Response;
use crate::server::scope::{owner_chain, ResourceRef};
use crate::time::current_timestamp;
use crate::types::resource::{
    PatchResourceRequest, PutResourceRequest, ResourceKind, ScopedResource,
};

use super::{new_id, validate_name, Method, ResourceRequest};

/// `{projects,battles,retros,storyboards}`. Listing returns what the caller
/// can view; creation needs MANAGE on the declared owner.
pub fn collection(guard: &Guard, kind: ResourceKind, req: &ResourceRequest) -> Result<Response> {
    match req.method {
        Method::Get => {
            let mut visible = Vec::new();
            for resource in guard.tx.list_resources(kind)? {
                let chain = guard.resolve(&ResourceRef::Resource(kind, resource.id.clone()))?;
                if guard.allows(Level::View, &chain)? {
                    visible.push(resource);
                }
            }
            Ok(Response::list(visible))
        }
        Method::Put => {
            let body: PutResourceRequest = req.json()?;
            let chain = owner_chain(guard.tx, &body.owner)?;
            guard.require(Level::Manage, &chain)?;
            validate_name(&body.name)?;

            let now = current_timestamp();
            let resource = ScopedResource {
                id: new_id(),
                kind,
                name: body.name,
                owner: body.owner,
                create_time: now,
                update_time: now,
            };
            guard.tx.create_resource(&resource)?;
            info!(
                "Create {kind} '{}' owned by {} by '{}'",
                resource.id,
                chain.target(),
                guard.user.id
            );
            Ok(Response::json(resource))
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

pub fn item(
    guard: &Guard,
    kind: ResourceKind,
    id: &str,
    req: &ResourceRequest,
) -> Result<Response> {
    let chain = guard.resolve(&ResourceRef::Resource(kind, id.to_string()))?;
    match req.method {
        Method::Get => {
            guard.require(Level::View, &chain)?;
            Ok(Response::json(get(guard, kind, id)?))
        }
        Method::Patch => {
            guard.require(Level::Manage, &chain)?;
            let body: PatchResourceRequest = req.json()?;
            validate_name(&body.name)?;
            guard
                .tx
                .update_resource_name(kind, id, &body.name, current_timestamp())?;
            Ok(Response::json(get(guard, kind, id)?))
        }
        Method::Delete => {
            guard.require(Level::Manage, &chain)?;
            guard.tx.delete_resource(kind, id)?;
            info!("Delete {kind} '{id}' by '{}'", guard.user.id);
            Ok(Response::ok())
        }
        Method::Put => Err(ApiError::method_not_allowed()),
    }
}

fn get(guard: &Guard, kind: ResourceKind, id: &str) -> Result<ScopedResource> {
    guard
        .tx
        .get_resource(kind, id)?
        .ok_or_else(|| ApiError::not_found(format!("{kind} '{id}' not found")))
}
