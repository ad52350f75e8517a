use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::types::org::Team;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS team (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    organization_id TEXT,
    department_id TEXT,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_team_organization ON team(organization_id);
CREATE INDEX IF NOT EXISTS idx_team_department ON team(department_id);
"#;

const SELECT_FIELDS: &str =
    "SELECT t.id, t.name, t.organization_id, t.department_id, t.create_time, t.update_time FROM team t";

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, team: &Team) -> Result<()> {
    let sql = r#"
    INSERT INTO team (id, name, organization_id, department_id, create_time, update_time)
    VALUES (?, ?, ?, ?, ?, ?)
    "#;
    debug!("Database create_team: {sql}, {team:?}");
    tx.execute(
        sql,
        params![
            team.id,
            team.name,
            team.organization_id,
            team.department_id,
            team.create_time,
            team.update_time
        ],
    )?;
    Ok(())
}

pub fn get(tx: &Transaction, id: &str) -> Result<Option<Team>> {
    let sql = format!("{SELECT_FIELDS} WHERE t.id = ?");
    debug!("Database get_team: {sql}, {id}");
    let mut stmt = tx.prepare(&sql)?;
    let team = stmt.query_row(params![id], parse_row).optional()?;
    Ok(team)
}

pub fn list_by_organization(tx: &Transaction, org_id: &str) -> Result<Vec<Team>> {
    let sql = format!(
        "{SELECT_FIELDS} WHERE t.organization_id = ? AND t.department_id IS NULL ORDER BY t.create_time, t.id"
    );
    query_list(tx, "list_organization_teams", &sql, org_id)
}

pub fn list_by_department(tx: &Transaction, dept_id: &str) -> Result<Vec<Team>> {
    let sql = format!("{SELECT_FIELDS} WHERE t.department_id = ? ORDER BY t.create_time, t.id");
    query_list(tx, "list_department_teams", &sql, dept_id)
}

pub fn list_by_member(tx: &Transaction, user_id: &str) -> Result<Vec<Team>> {
    let sql = format!(
        "{SELECT_FIELDS} JOIN team_member m ON m.team_id = t.id WHERE m.user_id = ? ORDER BY t.create_time, t.id"
    );
    query_list(tx, "list_user_teams", &sql, user_id)
}

fn query_list(tx: &Transaction, op: &str, sql: &str, param: &str) -> Result<Vec<Team>> {
    debug!("Database {op}: {sql}, {param}");
    let mut stmt = tx.prepare(sql)?;
    let teams = stmt
        .query_map(params![param], parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(teams)
}

pub fn update_name(tx: &Transaction, id: &str, name: &str, now: u64) -> Result<()> {
    let sql = "UPDATE team SET name = ?, update_time = ? WHERE id = ?";
    debug!("Database update_team_name: {sql}, {name}, {now}, {id}");
    tx.execute(sql, params![name, now, id])?;
    Ok(())
}

const DELETE_SQLS: [&str; 3] = [
    "DELETE FROM team_member WHERE team_id = ?1",
    "DELETE FROM scoped_resource WHERE team_id = ?1",
    "DELETE FROM team WHERE id = ?1",
];

pub fn delete(tx: &Transaction, id: &str) -> Result<()> {
    for sql in DELETE_SQLS {
        debug!("Database delete_team: {sql}, {id}");
        tx.execute(sql, params![id])?;
    }
    Ok(())
}

fn parse_row(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        organization_id: row.get(2)?,
        department_id: row.get(3)?,
        create_time: row.get(4)?,
        update_time: row.get(5)?,
    })
}
