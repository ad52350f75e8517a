use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::server::db::ApiKeyRecord;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS api_key (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    hash TEXT NOT NULL,
    create_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_api_key_user ON api_key(user_id);
"#;

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, key: &ApiKeyRecord) -> Result<()> {
    let sql = "INSERT INTO api_key (id, user_id, name, hash, create_time) VALUES (?, ?, ?, ?, ?)";
    debug!("Database create_api_key: {sql}, {}, {}", key.id, key.user_id);
    tx.execute(
        sql,
        params![key.id, key.user_id, key.name, key.hash, key.create_time],
    )?;
    Ok(())
}

pub fn get(tx: &Transaction, id: &str) -> Result<Option<ApiKeyRecord>> {
    let sql = "SELECT id, user_id, name, hash, create_time FROM api_key WHERE id = ?";
    debug!("Database get_api_key: {sql}, {id}");
    let mut stmt = tx.prepare(sql)?;
    let key = stmt.query_row(params![id], parse_row).optional()?;
    Ok(key)
}

pub fn list(tx: &Transaction, user_id: &str) -> Result<Vec<ApiKeyRecord>> {
    let sql = "SELECT id, user_id, name, hash, create_time FROM api_key WHERE user_id = ? ORDER BY create_time, id";
    debug!("Database list_api_keys: {sql}, {user_id}");
    let mut stmt = tx.prepare(sql)?;
    let keys = stmt
        .query_map(params![user_id], parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(keys)
}

pub fn delete(tx: &Transaction, id: &str) -> Result<()> {
    let sql = "DELETE FROM api_key WHERE id = ?";
    debug!("Database delete_api_key: {sql}, {id}");
    tx.execute(sql, params![id])?;
    Ok(())
}

fn parse_row(row: &Row) -> rusqlite::Result<ApiKeyRecord> {
    Ok(ApiKeyRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        hash: row.get(3)?,
        create_time: row.get(4)?,
    })
}
