use anyhow::Result;
use log::info;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::error::ApiError;
use crate::server::handlers::path::ScopePath;
use crate::server::response::Response;
use crate::server::scope::ScopeChain;
use crate::time::current_timestamp;
use crate::types::org::{Department, NameRequest};

use super::{new_id, validate_name, Method, ResourceRequest};

/// `organizations/{o}/departments`. Creating a department needs MANAGE on
/// the organization and adds no membership for the creator.
pub fn collection(guard: &Guard, org: &ScopePath, req: &ResourceRequest) -> Result<Response> {
    let chain = org.resolve(guard.tx)?;
    let org_id = chain.target().id();
    match req.method {
        Method::Get => {
            guard.require(Level::View, &chain)?;
            let depts = guard.tx.list_departments(org_id)?;
            Ok(Response::list(depts))
        }
        Method::Put => {
            guard.require(Level::Manage, &chain)?;
            let body: NameRequest = req.json()?;
            validate_name(&body.name)?;

            let now = current_timestamp();
            let dept = Department {
                id: new_id(),
                organization_id: org_id.to_string(),
                name: body.name,
                create_time: now,
                update_time: now,
            };
            guard.tx.create_department(&dept)?;
            info!(
                "Create department '{}' in organization '{org_id}' by '{}'",
                dept.id, guard.user.id
            );
            Ok(Response::json(dept))
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
                .update_department_name(id, &body.name, current_timestamp())?;
            Ok(Response::json(get(guard, id)?))
        }
        Method::Delete => {
            guard.require(Level::Manage, chain)?;
            guard.tx.delete_department(id)?;
            info!("Delete department '{id}' by '{}'", guard.user.id);
            Ok(Response::ok())
        }
        Method::Put => Err(ApiError::method_not_allowed()),
    }
}

fn get(guard: &Guard, id: &str) -> Result<Department> {
    guard
        .tx
        .get_department(id)?
        .ok_or_else(|| ApiError::not_found(format!("department '{id}' not found")))
}
