use anyhow::Result;
use log::debug;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::types::resource::{Owner, ResourceKind, ScopedResource};

/// Owner columns are mutually exclusive, the CHECK keeps a second writer from
/// breaking that.
const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS scoped_resource (
    id TEXT PRIMARY KEY NOT NULL,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    team_id TEXT,
    department_id TEXT,
    organization_id TEXT,
    user_id TEXT,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL,
    CHECK (
        (team_id IS NOT NULL) + (department_id IS NOT NULL) +
        (organization_id IS NOT NULL) + (user_id IS NOT NULL) = 1
    )
);

CREATE INDEX IF NOT EXISTS idx_scoped_resource_kind ON scoped_resource(kind);
CREATE INDEX IF NOT EXISTS idx_scoped_resource_team ON scoped_resource(team_id);
CREATE INDEX IF NOT EXISTS idx_scoped_resource_department ON scoped_resource(department_id);
CREATE INDEX IF NOT EXISTS idx_scoped_resource_organization ON scoped_resource(organization_id);
"#;

const SELECT_FIELDS: &str = r#"SELECT id, kind, name, team_id, department_id, organization_id,
    user_id, create_time, update_time FROM scoped_resource"#;

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, resource: &ScopedResource) -> Result<()> {
    let sql = r#"
    INSERT INTO scoped_resource (id, kind, name, team_id, department_id, organization_id,
        user_id, create_time, update_time)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;
    debug!("Database create_resource: {sql}, {resource:?}");
    let owner = &resource.owner;
    tx.execute(
        sql,
        params![
            resource.id,
            resource.kind.as_str(),
            resource.name,
            owner.team_id(),
            owner.department_id(),
            owner.organization_id(),
            owner.user_id(),
            resource.create_time,
            resource.update_time,
        ],
    )?;
    Ok(())
}

pub fn get(tx: &Transaction, kind: ResourceKind, id: &str) -> Result<Option<ScopedResource>> {
    let sql = format!("{SELECT_FIELDS} WHERE kind = ? AND id = ?");
    debug!("Database get_resource: {sql}, {kind}, {id}");
    let mut stmt = tx.prepare(&sql)?;
    let resource = stmt
        .query_row(params![kind.as_str(), id], parse_row)
        .optional()?;
    Ok(resource)
}

pub fn list(tx: &Transaction, kind: ResourceKind) -> Result<Vec<ScopedResource>> {
    let sql = format!("{SELECT_FIELDS} WHERE kind = ? ORDER BY create_time, id");
    debug!("Database list_resources: {sql}, {kind}");
    let mut stmt = tx.prepare(&sql)?;
    let resources = stmt
        .query_map(params![kind.as_str()], parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(resources)
}

pub fn update_name(
    tx: &Transaction,
    kind: ResourceKind,
    id: &str,
    name: &str,
    now: u64,
) -> Result<()> {
    let sql = "UPDATE scoped_resource SET name = ?, update_time = ? WHERE kind = ? AND id = ?";
    debug!("Database update_resource_name: {sql}, {name}, {now}, {kind}, {id}");
    tx.execute(sql, params![name, now, kind.as_str(), id])?;
    Ok(())
}

pub fn delete(tx: &Transaction, kind: ResourceKind, id: &str) -> Result<()> {
    let sql = "DELETE FROM scoped_resource WHERE kind = ? AND id = ?";
    debug!("Database delete_resource: {sql}, {kind}, {id}");
    tx.execute(sql, params![kind.as_str(), id])?;
    Ok(())
}

fn parse_row(row: &Row) -> rusqlite::Result<ScopedResource> {
    let kind: String = row.get(1)?;
    let kind = ResourceKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown resource kind '{kind}'").into(),
        )
    })?;

    let owner = Owner::from_columns(row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Text,
                "resource must have exactly one owner".into(),
            )
        })?;

    Ok(ScopedResource {
        id: row.get(0)?,
        kind,
        name: row.get(2)?,
        owner,
        create_time: row.get(7)?,
        update_time: row.get(8)?,
    })
}
