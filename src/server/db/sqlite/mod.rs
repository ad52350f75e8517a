mod apikey;
mod department;
mod member;
mod organization;
mod resource;
mod team;
mod user;

pub mod config;

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use crate::server::scope::Scope;
use crate::types::org::{Department, Member, Organization, Role, Team};
use crate::types::resource::{ResourceKind, ScopedResource};
use crate::types::user::GlobalRank;

use super::{ApiKeyRecord, Connection, Transaction, UserRecord};

/// SQLite-based database implementation, perfect for single-node deployments.
/// Supports both file-based and in-memory database types.
pub struct Sqlite {
    conn: RawConnection,
}

/// SQLite transaction for executing database operations
pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl Sqlite {
    /// Opens a SQLite database file. Creates one if it doesn't exist.
    /// Also initializes all required database tables.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates a new in-memory database. Content is lost when the program exits.
    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    fn init_tables(db: &RawConnection) -> Result<()> {
        user::create_table(db)?;
        apikey::create_table(db)?;
        organization::create_table(db)?;
        department::create_table(db)?;
        team::create_table(db)?;
        member::create_tables(db)?;
        resource::create_table(db)?;
        Ok(())
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for Sqlite {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_user(&self, user: &UserRecord) -> Result<()> {
        user::create(&self.tx, user)
    }

    fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        user::get(&self.tx, "id", id)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<UserRecord>> {
        user::get(&self.tx, "name", name)
    }

    fn list_users(&self) -> Result<Vec<UserRecord>> {
        user::list(&self.tx)
    }

    fn count_users(&self) -> Result<u64> {
        user::count(&self.tx)
    }

    fn update_user_rank(&self, id: &str, rank: GlobalRank, now: u64) -> Result<()> {
        user::update_rank(&self.tx, id, rank, now)
    }

    fn update_user_password(&self, id: &str, hash: &str, salt: &str, now: u64) -> Result<()> {
        user::update_password(&self.tx, id, hash, salt, now)
    }

    fn update_user_last_active(&self, id: &str, now: u64) -> Result<()> {
        user::update_last_active(&self.tx, id, now)
    }

    fn create_api_key(&self, key: &ApiKeyRecord) -> Result<()> {
        apikey::create(&self.tx, key)
    }

    fn get_api_key(&self, id: &str) -> Result<Option<ApiKeyRecord>> {
        apikey::get(&self.tx, id)
    }

    fn list_api_keys(&self, user_id: &str) -> Result<Vec<ApiKeyRecord>> {
        apikey::list(&self.tx, user_id)
    }

    fn delete_api_key(&self, id: &str) -> Result<()> {
        apikey::delete(&self.tx, id)
    }

    fn create_organization(&self, org: &Organization) -> Result<()> {
        organization::create(&self.tx, org)
    }

    fn get_organization(&self, id: &str) -> Result<Option<Organization>> {
        organization::get(&self.tx, id)
    }

    fn list_organizations(&self, user_id: Option<&str>) -> Result<Vec<Organization>> {
        organization::list(&self.tx, user_id)
    }

    fn update_organization_name(&self, id: &str, name: &str, now: u64) -> Result<()> {
        organization::update_name(&self.tx, id, name, now)
    }

    fn delete_organization(&self, id: &str) -> Result<()> {
        organization::delete(&self.tx, id)
    }

    fn create_department(&self, dept: &Department) -> Result<()> {
        department::create(&self.tx, dept)
    }

    fn get_department(&self, id: &str) -> Result<Option<Department>> {
        department::get(&self.tx, id)
    }

    fn list_departments(&self, org_id: &str) -> Result<Vec<Department>> {
        department::list(&self.tx, org_id)
    }

    fn update_department_name(&self, id: &str, name: &str, now: u64) -> Result<()> {
        department::update_name(&self.tx, id, name, now)
    }

    fn delete_department(&self, id: &str) -> Result<()> {
        department::delete(&self.tx, id)
    }

    fn create_team(&self, team: &Team) -> Result<()> {
        team::create(&self.tx, team)
    }

    fn get_team(&self, id: &str) -> Result<Option<Team>> {
        team::get(&self.tx, id)
    }

    fn list_organization_teams(&self, org_id: &str) -> Result<Vec<Team>> {
        team::list_by_organization(&self.tx, org_id)
    }

    fn list_department_teams(&self, dept_id: &str) -> Result<Vec<Team>> {
        team::list_by_department(&self.tx, dept_id)
    }

    fn list_user_teams(&self, user_id: &str) -> Result<Vec<Team>> {
        team::list_by_member(&self.tx, user_id)
    }

    fn update_team_name(&self, id: &str, name: &str, now: u64) -> Result<()> {
        team::update_name(&self.tx, id, name, now)
    }

    fn delete_team(&self, id: &str) -> Result<()> {
        team::delete(&self.tx, id)
    }

    fn get_member_role(&self, scope: &Scope, user_id: &str) -> Result<Option<Role>> {
        member::get_role(&self.tx, scope, user_id)
    }

    fn list_members(&self, scope: &Scope) -> Result<Vec<Member>> {
        member::list(&self.tx, scope)
    }

    fn add_member(&self, scope: &Scope, user_id: &str, role: Role) -> Result<()> {
        member::add(&self.tx, scope, user_id, role)
    }

    fn update_member_role(&self, scope: &Scope, user_id: &str, role: Role) -> Result<()> {
        member::update_role(&self.tx, scope, user_id, role)
    }

    fn delete_member(&self, scope: &Scope, user_id: &str) -> Result<()> {
        member::delete(&self.tx, scope, user_id)
    }

    fn delete_organization_descendant_members(
        &self,
        org_id: &str,
        user_id: &str,
    ) -> Result<()> {
        member::delete_organization_descendants(&self.tx, org_id, user_id)
    }

    fn delete_department_descendant_members(&self, dept_id: &str, user_id: &str) -> Result<()> {
        member::delete_department_descendants(&self.tx, dept_id, user_id)
    }

    fn create_resource(&self, resource: &ScopedResource) -> Result<()> {
        resource::create(&self.tx, resource)
    }

    fn get_resource(&self, kind: ResourceKind, id: &str) -> Result<Option<ScopedResource>> {
        resource::get(&self.tx, kind, id)
    }

    fn list_resources(&self, kind: ResourceKind) -> Result<Vec<ScopedResource>> {
        resource::list(&self.tx, kind)
    }

    fn update_resource_name(
        &self,
        kind: ResourceKind,
        id: &str,
        name: &str,
        now: u64,
    ) -> Result<()> {
        resource::update_name(&self.tx, kind, id, name, now)
    }

    fn delete_resource(&self, kind: ResourceKind, id: &str) -> Result<()> {
        resource::delete(&self.tx, kind, id)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
