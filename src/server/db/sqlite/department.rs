use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::types::org::Department;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS department (
    id TEXT PRIMARY KEY NOT NULL,
    organization_id TEXT NOT NULL,
    name TEXT NOT NULL,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_department_organization ON department(organization_id);
"#;

const SELECT_FIELDS: &str =
    "SELECT id, organization_id, name, create_time, update_time FROM department";

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, dept: &Department) -> Result<()> {
    let sql = r#"
    INSERT INTO department (id, organization_id, name, create_time, update_time)
    VALUES (?, ?, ?, ?, ?)
    "#;
    debug!("Database create_department: {sql}, {dept:?}");
    tx.execute(
        sql,
        params![
            dept.id,
            dept.organization_id,
            dept.name,
            dept.create_time,
            dept.update_time
        ],
    )?;
    Ok(())
}

pub fn get(tx: &Transaction, id: &str) -> Result<Option<Department>> {
    let sql = format!("{SELECT_FIELDS} WHERE id = ?");
    debug!("Database get_department: {sql}, {id}");
    let mut stmt = tx.prepare(&sql)?;
    let dept = stmt.query_row(params![id], parse_row).optional()?;
    Ok(dept)
}

pub fn list(tx: &Transaction, org_id: &str) -> Result<Vec<Department>> {
    let sql = format!("{SELECT_FIELDS} WHERE organization_id = ? ORDER BY create_time, id");
    debug!("Database list_departments: {sql}, {org_id}");
    let mut stmt = tx.prepare(&sql)?;
    let depts = stmt
        .query_map(params![org_id], parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(depts)
}

pub fn update_name(tx: &Transaction, id: &str, name: &str, now: u64) -> Result<()> {
    let sql = "UPDATE department SET name = ?, update_time = ? WHERE id = ?";
    debug!("Database update_department_name: {sql}, {name}, {now}, {id}");
    tx.execute(sql, params![name, now, id])?;
    Ok(())
}

const DELETE_SQLS: [&str; 5] = [
    "DELETE FROM team_member WHERE team_id IN (SELECT id FROM team WHERE department_id = ?1)",
    "DELETE FROM department_member WHERE department_id = ?1",
    r#"DELETE FROM scoped_resource WHERE department_id = ?1
        OR team_id IN (SELECT id FROM team WHERE department_id = ?1)"#,
    "DELETE FROM team WHERE department_id = ?1",
    "DELETE FROM department WHERE id = ?1",
];

pub fn delete(tx: &Transaction, id: &str) -> Result<()> {
    for sql in DELETE_SQLS {
        debug!("Database delete_department: {sql}, {id}");
        tx.execute(sql, params![id])?;
    }
    Ok(())
}

fn parse_row(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        create_time: row.get(3)?,
        update_time: row.get(4)?,
    })
}
