use anyhow::Result;
use log::info;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::error::ApiError;
use crate::server::response::Response;
use crate::server::scope::{Scope, ScopeChain};
use crate::time::current_timestamp;
use crate::types::org::{NameRequest, Organization, Role};

use super::{new_id, validate_name, Method, ResourceRequest};

/// `organizations`: global admins list every organization, everyone else
/// the ones they belong to. Any authenticated user may create one and
/// becomes its admin.
pub fn collection(guard: &Guard, req: &ResourceRequest) -> Result<Response> {
    match req.method {
        Method::Get => {
            let member = if guard.user.rank.is_global_admin() {
                None
            } else {
                Some(guard.user.id.as_str())
            };
            let orgs = guard.tx.list_organizations(member)?;
            Ok(Response::list(orgs))
        }
        Method::Put => {
            let body: NameRequest = req.json()?;
            validate_name(&body.name)?;

            let now = current_timestamp();
            let org = Organization {
                id: new_id(),
                name: body.name,
                create_time: now,
                update_time: now,
            };
            guard.tx.create_organization(&org)?;
            let scope = Scope::Organization(org.id.clone());
            guard.tx.add_member(&scope, &guard.user.id, Role::Admin)?;

            info!("Create organization '{}' by '{}'", org.id, guard.user.id);
            Ok(Response::json(org))
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

pub fn item(guard: &Guard, chain: &ScopeChain, req: &ResourceRequest) -> Result<Response> {
    let id = chain.target().id();
    match req.method {
        Method::Get => {
            guard.require(Level::View, chain)?;
            Ok(Response::json(get(guard, id)?))
        }
        Method::Patch => {
            guard.require(Level::Manage, chain)?;
            let body: NameRequest = req.json()?;
            validate_name(&body.name)?;
            guard
                .tx
                .update_organization_name(id, &body.name, current_timestamp())?;
            Ok(Response::json(get(guard, id)?))
        }
        Method::Delete => {
            guard.require(Level::Manage, chain)?;
            guard.tx.delete_organization(id)?;
            info!("Delete organization '{id}' by '{}'", guard.user.id);
            Ok(Response::ok())
        }
        Method::Put => Err(ApiError::method_not_allowed()),
    }
}

fn get(guard: &Guard, id: &str) -> Result<Organization> {
    guard
        .tx
        .get_organization(id)?
        .ok_or_else(|| ApiError::not_found(format!("organization '{id}' not found")))
}
