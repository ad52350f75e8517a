use anyhow::{bail, Result};
use log::debug;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql, Transaction};

use crate::server::scope::Scope;
use crate::types::org::{Member, Role};

const CREATE_TABLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS organization_member (
    organization_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    PRIMARY KEY (organization_id, user_id)
);

CREATE TABLE IF NOT EXISTS department_member (
    department_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    PRIMARY KEY (department_id, user_id)
);

CREATE TABLE IF NOT EXISTS team_member (
    team_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    PRIMARY KEY (team_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_organization_member_user ON organization_member(user_id);
CREATE INDEX IF NOT EXISTS idx_department_member_user ON department_member(user_id);
CREATE INDEX IF NOT EXISTS idx_team_member_user ON team_member(user_id);
"#;

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES_SQL)?;
    Ok(())
}

/// Membership table and its scope column.
fn table(scope: &Scope) -> Result<(&'static str, &'static str)> {
    Ok(match scope {
        Scope::Organization(_) => ("organization_member", "organization_id"),
        Scope::Department(_) => ("department_member", "department_id"),
        Scope::Team(_) => ("team_member", "team_id"),
        Scope::PersonalOwner(_) => bail!("personal owner scope has no memberships"),
    })
}

pub fn get_role(tx: &Transaction, scope: &Scope, user_id: &str) -> Result<Option<Role>> {
    let (table, column) = table(scope)?;
    let sql = format!("SELECT role FROM {table} WHERE {column} = ? AND user_id = ?");
    debug!("Database get_member_role: {sql}, {scope}, {user_id}");
    let mut stmt = tx.prepare(&sql)?;
    let role = stmt
        .query_row(params![scope.id(), user_id], |row| row.get(0))
        .optional()?;
    Ok(role)
}

pub fn list(tx: &Transaction, scope: &Scope) -> Result<Vec<Member>> {
    let (table, column) = table(scope)?;
    let sql = format!(
        "SELECT m.user_id, u.name, m.role FROM {table} m JOIN user u ON u.id = m.user_id WHERE m.{column} = ? ORDER BY u.name"
    );
    debug!("Database list_members: {sql}, {scope}");
    let mut stmt = tx.prepare(&sql)?;
    let members = stmt
        .query_map(params![scope.id()], |row| {
            Ok(Member {
                user_id: row.get(0)?,
                name: row.get(1)?,
                role: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

pub fn add(tx: &Transaction, scope: &Scope, user_id: &str, role: Role) -> Result<()> {
    let (table, column) = table(scope)?;
    let sql = format!("INSERT INTO {table} ({column}, user_id, role) VALUES (?, ?, ?)");
    debug!("Database add_member: {sql}, {scope}, {user_id}, {role}");
    tx.execute(&sql, params![scope.id(), user_id, role])?;
    Ok(())
}

pub fn update_role(tx: &Transaction, scope: &Scope, user_id: &str, role: Role) -> Result<()> {
    let (table, column) = table(scope)?;
    let sql = format!("UPDATE {table} SET role = ? WHERE {column} = ? AND user_id = ?");
    debug!("Database update_member_role: {sql}, {role}, {scope}, {user_id}");
    tx.execute(&sql, params![role, scope.id(), user_id])?;
    Ok(())
}

pub fn delete(tx: &Transaction, scope: &Scope, user_id: &str) -> Result<()> {
    let (table, column) = table(scope)?;
    let sql = format!("DELETE FROM {table} WHERE {column} = ? AND user_id = ?");
    debug!("Database delete_member: {sql}, {scope}, {user_id}");
    tx.execute(&sql, params![scope.id(), user_id])?;
    Ok(())
}

pub fn delete_organization_descendants(tx: &Transaction, org_id: &str, user_id: &str) -> Result<()> {
    let sqls = [
        "DELETE FROM department_member WHERE user_id = ?1 AND department_id IN (SELECT id FROM department WHERE organization_id = ?2)",
        "DELETE FROM team_member WHERE user_id = ?1 AND team_id IN (SELECT id FROM team WHERE organization_id = ?2)",
    ];
    for sql in sqls {
        debug!("Database delete_organization_descendant_members: {sql}, {user_id}, {org_id}");
        tx.execute(sql, params![user_id, org_id])?;
    }
    Ok(())
}

pub fn delete_department_descendants(tx: &Transaction, dept_id: &str, user_id: &str) -> Result<()> {
    let sql = "DELETE FROM team_member WHERE user_id = ?1 AND team_id IN (SELECT id FROM team WHERE department_id = ?2)";
    debug!("Database delete_department_descendant_members: {sql}, {user_id}, {dept_id}");
    tx.execute(sql, params![user_id, dept_id])?;
    Ok(())
}
