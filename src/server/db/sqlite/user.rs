use anyhow::{bail, Result};
use log::debug;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, Transaction};

use crate::server::db::UserRecord;
use crate::types::user::GlobalRank;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    rank TEXT NOT NULL,
    hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL,
    last_active INTEGER NOT NULL
);
"#;

const SELECT_FIELDS: &str =
    "SELECT id, name, rank, hash, salt, create_time, update_time, last_active FROM user";

impl ToSql for GlobalRank {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GlobalRank {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, user: &UserRecord) -> Result<()> {
    let sql = r#"
    INSERT INTO user (id, name, rank, hash, salt, create_time, update_time, last_active)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    "#;
    debug!("Database create_user: {sql}, {}, {}, {}", user.id, user.name, user.rank);
    tx.execute(
        sql,
        params![
            user.id,
            user.name,
            user.rank,
            user.hash,
            user.salt,
            user.create_time,
            user.update_time,
            user.last_active,
        ],
    )?;
    Ok(())
}

/// Looks up a user by a unique column, `id` or `name`.
pub fn get(tx: &Transaction, field: &str, value: &str) -> Result<Option<UserRecord>> {
    let sql = match field {
        "id" => format!("{SELECT_FIELDS} WHERE id = ?"),
        "name" => format!("{SELECT_FIELDS} WHERE name = ?"),
        _ => bail!("unsupported user lookup field '{field}'"),
    };
    debug!("Database get_user: {sql}, {value}");

    let mut stmt = tx.prepare(&sql)?;
    let user = stmt.query_row(params![value], parse_row).optional()?;
    Ok(user)
}

pub fn list(tx: &Transaction) -> Result<Vec<UserRecord>> {
    let sql = format!("{SELECT_FIELDS} ORDER BY create_time, name");
    debug!("Database list_users: {sql}");

    let mut stmt = tx.prepare(&sql)?;
    let users = stmt
        .query_map([], parse_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

pub fn count(tx: &Transaction) -> Result<u64> {
    let sql = "SELECT COUNT(*) FROM user";
    debug!("Database count_users: {sql}");
    let count = tx.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

pub fn update_rank(tx: &Transaction, id: &str, rank: GlobalRank, now: u64) -> Result<()> {
    let sql = "UPDATE user SET rank = ?, update_time = ? WHERE id = ?";
    debug!("Database update_user_rank: {sql}, {rank}, {now}, {id}");
    tx.execute(sql, params![rank, now, id])?;
    Ok(())
}

pub fn update_password(tx: &Transaction, id: &str, hash: &str, salt: &str, now: u64) -> Result<()> {
    let sql = "UPDATE user SET hash = ?, salt = ?, update_time = ? WHERE id = ?";
    debug!("Database update_user_password: {sql}, {id}");
    tx.execute(sql, params![hash, salt, now, id])?;
    Ok(())
}

pub fn update_last_active(tx: &Transaction, id: &str, now: u64) -> Result<()> {
    let sql = "UPDATE user SET last_active = ? WHERE id = ?";
    debug!("Database update_user_last_active: {sql}, {now}, {id}");
    tx.execute(sql, params![now, id])?;
    Ok(())
}

fn parse_row(row: &Row) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        rank: row.get(2)?,
        hash: row.get(3)?,
        salt: row.get(4)?,
        create_time: row.get(5)?,
        update_time: row.get(6)?,
        last_active: row.get(7)?,
    })
}
