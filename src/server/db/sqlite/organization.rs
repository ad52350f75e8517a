use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::types::org::Organization;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS organization (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL
);
"#;

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, org: &Organization) -> Result<()> {
    let sql = "INSERT INTO organization (id, name, create_time, update_time) VALUES (?, ?, ?, ?)";
    debug!("Database create_organization: {sql}, {org:?}");
    tx.execute(
        sql,
        params![org.id, org.name, org.create_time, org.update_time],
    )?;
    Ok(())
}

pub fn get(tx: &Transaction, id: &str) -> Result<Option<Organization>> {
    let sql = "SELECT id, name, create_time, update_time FROM organization WHERE id = ?";
    debug!("Database get_organization: {sql}, {id}");
    let mut stmt = tx.prepare(sql)?;
    let org = stmt.query_row(params![id], parse_row).optional()?;
    Ok(org)
}

pub fn list(tx: &Transaction, user_id: Option<&str>) -> Result<Vec<Organization>> {
    let orgs = match user_id {
        Some(user_id) => {
            let sql = r#"
            SELECT o.id, o.name, o.create_time, o.update_time
            FROM organization o
            JOIN organization_member m ON m.organization_id = o.id
            WHERE m.user_id = ?
            ORDER BY o.create_time, o.id
            "#;
            debug!("Database list_organizations: {sql}, {user_id}");
            let mut stmt = tx.prepare(sql)?;
            let orgs = stmt
                .query_map(params![user_id], parse_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            orgs
        }
        None => {
            let sql = "SELECT id, name, create_time, update_time FROM organization ORDER BY create_time, id";
            debug!("Database list_organizations: {sql}");
            let mut stmt = tx.prepare(sql)?;
            let orgs = stmt
                .query_map([], parse_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            orgs
        }
    };
    Ok(orgs)
}

pub fn update_name(tx: &Transaction, id: &str, name: &str, now: u64) -> Result<()> {
    let sql = "UPDATE organization SET name = ?, update_time = ? WHERE id = ?";
    debug!("Database update_organization_name: {sql}, {name}, {now}, {id}");
    tx.execute(sql, params![name, now, id])?;
    Ok(())
}

/// Every team of the organization carries its `organization_id`, including
/// department teams, so the team subqueries cover both shapes.
const DELETE_SQLS: [&str; 7] = [
    "DELETE FROM team_member WHERE team_id IN (SELECT id FROM team WHERE organization_id = ?1)",
    "DELETE FROM department_member WHERE department_id IN (SELECT id FROM department WHERE organization_id = ?1)",
    "DELETE FROM organization_member WHERE organization_id = ?1",
    r#"DELETE FROM scoped_resource WHERE organization_id = ?1
        OR department_id IN (SELECT id FROM department WHERE organization_id = ?1)
        OR team_id IN (SELECT id FROM team WHERE organization_id = ?1)"#,
    "DELETE FROM team WHERE organization_id = ?1",
    "DELETE FROM department WHERE organization_id = ?1",
    "DELETE FROM organization WHERE id = ?1",
];

pub fn delete(tx: &Transaction, id: &str) -> Result<()> {
    for sql in DELETE_SQLS {
        debug!("Database delete_organization: {sql}, {id}");
        tx.execute(sql, params![id])?;
    }
    Ok(())
}

fn parse_row(row: &Row) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        create_time: row.get(2)?,
        update_time: row.get(3)?,
    })
}
