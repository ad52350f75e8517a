use anyhow::Result;
use log::info;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::error::ApiError;
use crate::server::handlers::path::ScopePath;
use crate::server::response::Response;
use crate::server::scope::{Scope, ScopeChain};
use crate::time::current_timestamp;
use crate::types::org::{NameRequest, Role, Team};

use super::{new_id, validate_name, Method, ResourceRequest};

/// `teams`: lists the teams the caller belongs to, and creates personal
/// teams with the creator as admin.
pub fn personal_collection(guard: &Guard, req: &ResourceRequest) -> Result<Response> {
    match req.method {
        Method::Get => {
            let teams = guard.tx.list_user_teams(&guard.user.id)?;
            Ok(Response::list(teams))
        }
        Method::Put => {
            let body: NameRequest = req.json()?;
            validate_name(&body.name)?;

            let team = new_team(body.name, None, None);
            guard.tx.create_team(&team)?;
            let scope = Scope::Team(team.id.clone());
            guard.tx.add_member(&scope, &guard.user.id, Role::Admin)?;

            info!("Create personal team '{}' by '{}'", team.id, guard.user.id);
            Ok(Response::json(team))
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

/// `organizations/{o}/teams` and `organizations/{o}/departments/{d}/teams`.
/// The organization listing only holds teams directly under it.
pub fn scoped_collection(
    guard: &Guard,
    parent: &ScopePath,
    req: &ResourceRequest,
) -> Result<Response> {
    let chain = parent.resolve(guard.tx)?;
    let org_id = chain.organization_id().map(String::from);
    let dept_id = chain.department_id().map(String::from);
    match req.method {
        Method::Get => {
            guard.require(Level::View, &chain)?;
            let teams = match (&dept_id, &org_id) {
                (Some(dept_id), _) => guard.tx.list_department_teams(dept_id)?,
                (None, Some(org_id)) => guard.tx.list_organization_teams(org_id)?,
                (None, None) => Vec::new(),
            };
            Ok(Response::list(teams))
        }
        Method::Put => {
            guard.require(Level::Manage, &chain)?;
            let body: NameRequest = req.json()?;
            validate_name(&body.name)?;

            let team = new_team(body.name, org_id, dept_id);
            guard.tx.create_team(&team)?;
            info!(
                "Create team '{}' under {} by '{}'",
                team.id,
                chain.target(),
                guard.user.id
            );
            Ok(Response::json(team))
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
            guard.tx.update_team_name(id, &body.name, current_timestamp())?;
            Ok(Response::json(get(guard, id)?))
        }
        Method::Delete => {
            guard.require(Level::Manage, chain)?;
            guard.tx.delete_team(id)?;
            info!("Delete team '{id}' by '{}'", guard.user.id);
            Ok(Response::ok())
        }
        Method::Put => Err(ApiError::method_not_allowed()),
    }
}

fn new_team(name: String, organization_id: Option<String>, department_id: Option<String>) -> Team {
    let now = current_timestamp();
    Team {
        id: new_id(),
        name,
        organization_id,
        department_id,
        create_time: now,
        update_time: now,
    }
}

fn get(guard: &Guard, id: &str) -> Result<Team> {
    guard
        .tx
        .get_team(id)?
        .ok_or_else(|| ApiError::not_found(format!("team '{id}' not found")))
}
