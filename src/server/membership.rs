use anyhow::Result;
use log::info;

use crate::types::org::{Member, Role};

use super::authz::guard::Guard;
use super::authz::Level;
use super::error::ApiError;
use super::scope::{Scope, ScopeChain};

/// Members of the chain target, visible to anyone who can view it.
pub fn list_members(guard: &Guard, chain: &ScopeChain) -> Result<Vec<Member>> {
    let scope = member_scope(chain)?;
    guard.require(Level::View, chain)?;
    guard.tx.list_members(scope)
}

/// Adds `user_id` to the chain target. Needs MANAGE there, and the user must
/// already belong to the parent scope.
pub fn add_membership(guard: &Guard, chain: &ScopeChain, user_id: &str, role: Role) -> Result<()> {
    let scope = member_scope(chain)?;
    guard.require(Level::Manage, chain)?;

    if guard.tx.get_user(user_id)?.is_none() {
        return Err(ApiError::bad_request(format!("user '{user_id}' does not exist")));
    }
    if guard.tx.get_member_role(scope, user_id)?.is_some() {
        return Err(ApiError::bad_request(format!(
            "user '{user_id}' is already a member of {scope}"
        )));
    }

    if let Some(parent) = prerequisite(chain) {
        if guard.tx.get_member_role(&parent, user_id)?.is_none() {
            return Err(ApiError::bad_request(format!(
                "user '{user_id}' must be a member of {parent} first"
            )));
        }
    }

    guard.tx.add_member(scope, user_id, role)?;
    info!("Add '{user_id}' to {scope} as {role}, by '{}'", guard.user.id);
    Ok(())
}

/// Removing a user from an organization or department also removes their
/// memberships everywhere below it.
pub fn remove_membership(guard: &Guard, chain: &ScopeChain, user_id: &str) -> Result<()> {
    let scope = member_scope(chain)?;
    guard.require(Level::Manage, chain)?;

    if guard.tx.get_member_role(scope, user_id)?.is_none() {
        return Err(ApiError::not_found(format!(
            "user '{user_id}' is not a member of {scope}"
        )));
    }

    guard.tx.delete_member(scope, user_id)?;
    match scope {
        Scope::Organization(id) => guard.tx.delete_organization_descendant_members(id, user_id)?,
        Scope::Department(id) => guard.tx.delete_department_descendant_members(id, user_id)?,
        Scope::Team(_) | Scope::PersonalOwner(_) => {}
    }
    info!("Remove '{user_id}' from {scope}, by '{}'", guard.user.id);
    Ok(())
}

/// Needs MANAGE at the chain target. The user must already be a member.
pub fn change_role(guard: &Guard, chain: &ScopeChain, user_id: &str, role: Role) -> Result<()> {
    let scope = member_scope(chain)?;
    guard.require(Level::Manage, chain)?;

    if guard.tx.get_member_role(scope, user_id)?.is_none() {
        return Err(ApiError::not_found(format!(
            "user '{user_id}' is not a member of {scope}"
        )));
    }

    guard.tx.update_member_role(scope, user_id, role)?;
    info!("Change role of '{user_id}' at {scope} to {role}, by '{}'", guard.user.id);
    Ok(())
}

fn member_scope(chain: &ScopeChain) -> Result<&Scope> {
    match chain.target() {
        Scope::PersonalOwner(_) => Err(ApiError::bad_request(
            "personal resources have no members",
        )),
        scope => Ok(scope),
    }
}

/// The scope a user must already belong to before joining the target: the
/// organization for a department, the direct parent for a team.
fn prerequisite(chain: &ScopeChain) -> Option<Scope> {
    match chain.target() {
        Scope::Department(_) => chain
            .organization_id()
            .map(|id| Scope::Organization(id.to_string())),
        Scope::Team(_) => match (chain.department_id(), chain.organization_id()) {
            (Some(dept), _) => Some(Scope::Department(dept.to_string())),
            (None, Some(org)) => Some(Scope::Organization(org.to_string())),
            (None, None) => None,
        },
        Scope::Organization(_) | Scope::PersonalOwner(_) => None,
    }
}
