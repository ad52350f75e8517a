mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod factory;

use std::cell::RefCell;
use std::sync::Mutex;

use anyhow::{bail, Result};
use sqlite::{Sqlite, SqliteTransaction};

use crate::types::apikey::ApiKey;
use crate::types::org::{Department, Member, Organization, Role, Team};
use crate::types::resource::{ResourceKind, ScopedResource};
use crate::types::user::{GlobalRank, User};

use super::authz::MembershipGraph;
use super::scope::Scope;

/// Database connection trait that can create transactions
pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    /// Creates a new transaction from the connection
    fn transaction(&'a mut self) -> Result<T>;
}

/// All persistence operations. Lookups by id return `Ok(None)` for unknown ids.
pub trait Transaction {
    // User operations
    fn create_user(&self, user: &UserRecord) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<UserRecord>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<UserRecord>>;
    fn list_users(&self) -> Result<Vec<UserRecord>>;
    fn count_users(&self) -> Result<u64>;
    fn update_user_rank(&self, id: &str, rank: GlobalRank, now: u64) -> Result<()>;
    fn update_user_password(&self, id: &str, hash: &str, salt: &str, now: u64) -> Result<()>;
    fn update_user_last_active(&self, id: &str, now: u64) -> Result<()>;

    // API key operations
    fn create_api_key(&self, key: &ApiKeyRecord) -> Result<()>;
    fn get_api_key(&self, id: &str) -> Result<Option<ApiKeyRecord>>;
    fn list_api_keys(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>>;
    fn delete_api_key(&self, id: &str) -> Result<()>;

    // Organization operations
    fn create_organization(&self, org: &Organization) -> Result<()>;
    fn get_organization(&self, id: &str) -> Result<Option<Organization>>;
    /// Lists every organization, or only those `user_id` is a member of.
    fn list_organizations(&self, user_id: Option<&str>) -> Result<Vec<Organization>>;
    fn update_organization_name(&self, id: &str, name: &str, now: u64) -> Result<()>;
    /// Deletes the organization with all its departments, teams, memberships
    /// and owned resources.
    fn delete_organization(&self, id: &str) -> Result<()>;

    // Department operations
    fn create_department(&self, dept: &Department) -> Result<()>;
    fn get_department(&self, id: &str) -> Result<Option<Department>>;
    fn list_departments(&self, org_id: &str) -> Result<Vec<Department>>;
    fn update_department_name(&self, id: &str, name: &str, now: u64) -> Result<()>;
    /// Deletes the department with all its teams, memberships and owned resources.
    fn delete_department(&self, id: &str) -> Result<()>;

    // Team operations
    fn create_team(&self, team: &Team) -> Result<()>;
    fn get_team(&self, id: &str) -> Result<Option<Team>>;
    /// Teams directly under an organization, without a department.
    fn list_organization_teams(&self, org_id: &str) -> Result<Vec<Team>>;
    fn list_department_teams(&self, dept_id: &str) -> Result<Vec<Team>>;
    /// Teams `user_id` holds a team membership in.
    fn list_user_teams(&self, user_id: &str) -> Result<Vec<Team>>;
    fn update_team_name(&self, id: &str, name: &str, now: u64) -> Result<()>;
    fn delete_team(&self, id: &str) -> Result<()>;

    // Membership operations
    fn get_member_role(&self, scope: &Scope, user_id: &str) -> Result<Option<Role>>;
    fn list_members(&self, scope: &Scope) -> Result<Vec<Member>>;
    fn add_member(&self, scope: &Scope, user_id: &str, role: Role) -> Result<()>;
    fn update_member_role(&self, scope: &Scope, user_id: &str, role: Role) -> Result<()>;
    fn delete_member(&self, scope: &Scope, user_id: &str) -> Result<()>;
    /// Removes the user's memberships in every department and team of the organization.
    fn delete_organization_descendant_members(&self, org_id: &str, user_id: &str)
        -> Result<()>;
    /// Removes the user's memberships in every team of the department.
    fn delete_department_descendant_members(&self, dept_id: &str, user_id: &str) -> Result<()>;

    // Scoped resource operations
    fn create_resource(&self, resource: &ScopedResource) -> Result<()>;
    fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Option<ScopedResource>>;
    fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ScopedResource>>;
    fn update_resource_name(&self, kind: ResourceKind, id: &str, name: &str, now: u64)
        -> Result<()>;
    fn delete_resource(&self, kind: ResourceKind, id: &str) -> Result<()>;

    /// Commits the transaction
    fn commit(self) -> Result<()>;
    /// Rolls back the transaction
    fn rollback(self) -> Result<()>;
}

impl MembershipGraph for dyn Transaction + '_ {
    fn role_at(&self, scope: &Scope, user_id: &str) -> Result<Option<Role>> {
        if let Scope::PersonalOwner(_) = scope {
            return Ok(None);
        }
        self.get_member_role(scope, user_id)
    }
}

/// Record structure for user information
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub rank: GlobalRank,
    /// Password hash, empty for guests
    pub hash: String,
    pub salt: String,
    pub create_time: u64,
    pub update_time: u64,
    pub last_active: u64,
}

/// Record structure for API keys, only the hash of the secret is stored
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub hash: String,
    pub create_time: u64,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            rank: record.rank,
            create_time: record.create_time,
            update_time: record.update_time,
            last_active: record.last_active,
        }
    }
}

impl From<ApiKeyRecord> for ApiKey {
    fn from(record: ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            create_time: record.create_time,
        }
    }
}

pub struct Database {
    conn: Mutex<RefCell<UnionConnection>>,
}

pub enum UnionConnection {
    Sqlite(Sqlite),
}

enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(RefCell::new(conn)),
        }
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let conn = Sqlite::memory().unwrap();
        Self::new(UnionConnection::Sqlite(conn))
    }

    /// Runs `f` inside one transaction. The transaction is committed when `f`
    /// returns `Ok` and rolled back when it returns `Err`.
    ///
    /// # Example
    /// ```ignore
    /// db.with_transaction(|tx| {
    ///     tx.create_organization(&org)?;
    ///     tx.add_member(&Scope::Organization(org.id.clone()), &user.id, Role::Admin)?;
    ///     Ok(())
    /// })?;
    /// ```
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock database: {e:#}"),
        };
        let mut conn = conn.borrow_mut();
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(sqlite) => sqlite.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

macro_rules! delegate {
    ($self:ident, $tx:ident => $call:expr) => {
        match $self {
            UnionTransaction::Sqlite($tx) => $call,
        }
    };
}

impl Transaction for UnionTransaction<'_> {
    fn create_user(&self, user: &UserRecord) -> Result<()> {
        delegate!(self, tx => tx.create_user(user))
    }

    fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        delegate!(self, tx => tx.get_user(id))
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<UserRecord>> {
        delegate!(self, tx => tx.get_user_by_name(name))
    }

    fn list_users(&self) -> Result<Vec<UserRecord>> {
        delegate!(self, tx => tx.list_users())
    }

    fn count_users(&self) -> Result<u64> {
        delegate!(self, tx => tx.count_users())
    }

    fn update_user_rank(&self, id: &str, rank: GlobalRank, now: u64) -> Result<()> {
        delegate!(self, tx => tx.update_user_rank(id, rank, now))
    }

    fn update_user_password(&self, id: &str, hash: &str, salt: &str, now: u64) -> Result<()> {
        delegate!(self, tx => tx.update_user_password(id, hash, salt, now))
    }

    fn update_user_last_active(&self, id: &str, now: u64) -> Result<()> {
        delegate!(self, tx => tx.update_user_last_active(id, now))
    }

    fn create_api_key(&self, key: &ApiKeyRecord) -> Result<()> {
        delegate!(self, tx => tx.create_api_key(key))
    }

    fn get_api_key(&self, id: &str) -> Result<Option<ApiKeyRecord>> {
        delegate!(self, tx => tx.get_api_key(id))
    }

    fn list_api_keys(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>> {
        delegate!(self, tx => tx.list_api_keys(user_id))
    }

    fn delete_api_key(&self, id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_api_key(id))
    }

    fn create_organization(&self, org: &Organization) -> Result<()> {
        delegate!(self, tx => tx.create_organization(org))
    }

    fn get_organization(&self, id: &str) -> Result<Option<Organization>> {
        delegate!(self, tx => tx.get_organization(id))
    }

    fn list_organizations(&self, user_id: Option<&str>) -> Result<Vec<Organization>> {
        delegate!(self, tx => tx.list_organizations(user_id))
    }

    fn update_organization_name(&self, id: &str, name: &str, now: u64) -> Result<()> {
        delegate!(self, tx => tx.update_organization_name(id, name, now))
    }

    fn delete_organization(&self, id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_organization(id))
    }

    fn create_department(&self, dept: &Department) -> Result<()> {
        delegate!(self, tx => tx.create_department(dept))
    }

    fn get_department(&self, id: &str) -> Result<Option<Department>> {
        delegate!(self, tx => tx.get_department(id))
    }

    fn list_departments(&self, org_id: &str) -> Result<Vec<Department>> {
        delegate!(self, tx => tx.list_departments(org_id))
    }

    fn update_department_name(&self, id: &str, name: &str, now: u64) -> Result<()> {
        delegate!(self, tx => tx.update_department_name(id, name, now))
    }

    fn delete_department(&self, id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_department(id))
    }

    fn create_team(&self, team: &Team) -> Result<()> {
        delegate!(self, tx => tx.create_team(team))
    }

    fn get_team(&self, id: &str) -> Result<Option<Team>> {
        delegate!(self, tx => tx.get_team(id))
    }

    fn list_organization_teams(&self, org_id: &str) -> Result<Vec<Team>> {
        delegate!(self, tx => tx.list_organization_teams(org_id))
    }

    fn list_department_teams(&self, dept_id: &str) -> Result<Vec<Team>> {
        delegate!(self, tx => tx.list_department_teams(dept_id))
    }

    fn list_user_teams(&self, user_id: &str) -> Result<Vec<Team>> {
        delegate!(self, tx => tx.list_user_teams(user_id))
    }

    fn update_team_name(&self, id: &str, name: &str, now: u64) -> Result<()> {
        delegate!(self, tx => tx.update_team_name(id, name, now))
    }

    fn delete_team(&self, id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_team(id))
    }

    fn get_member_role(&self, scope: &Scope, user_id: &str) -> Result<Option<Role>> {
        delegate!(self, tx => tx.get_member_role(scope, user_id))
    }

    fn list_members(&self, scope: &Scope) -> Result<Vec<Member>> {
        delegate!(self, tx => tx.list_members(scope))
    }

    fn add_member(&self, scope: &Scope, user_id: &str, role: Role) -> Result<()> {
        delegate!(self, tx => tx.add_member(scope, user_id, role))
    }

    fn update_member_role(&self, scope: &Scope, user_id: &str, role: Role) -> Result<()> {
        delegate!(self, tx => tx.update_member_role(scope, user_id, role))
    }

    fn delete_member(&self, scope: &Scope, user_id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_member(scope, user_id))
    }

    fn delete_organization_descendant_members(
        &self,
        org_id: &str,
        user_id: &str,
    ) -> Result<()> {
        delegate!(self, tx => tx.delete_organization_descendant_members(org_id, user_id))
    }

    fn delete_department_descendant_members(&self, dept_id: &str, user_id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_department_descendant_members(dept_id, user_id))
    }

    fn create_resource(&self, resource: &ScopedResource) -> Result<()> {
        delegate!(self, tx => tx.create_resource(resource))
    }

    fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Option<ScopedResource>> {
        delegate!(self, tx => tx.get_resource(kind, id))
    }

    fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ScopedResource>> {
        delegate!(self, tx => tx.list_resources(kind))
    }

    fn update_resource_name(
        &self,
        kind: ResourceKind,
        id: &str,
        name: &str,
        now: u64,
    ) -> Result<()> {
        delegate!(self, tx => tx.update_resource_name(kind, id, name, now))
    }

    fn delete_resource(&self, kind: ResourceKind, id: &str) -> Result<()> {
        delegate!(self, tx => tx.delete_resource(kind, id))
    }

    fn commit(self) -> Result<()> {
        delegate!(self, tx => tx.commit())
    }

    fn rollback(self) -> Result<()> {
        delegate!(self, tx => tx.rollback())
    }
}
