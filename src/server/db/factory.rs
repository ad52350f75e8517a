use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use super::config::{DbConfig, DbType};
use super::sqlite::config::SqliteConfig;
use super::sqlite::Sqlite;
use super::{Database, UnionConnection};

pub struct DbFactory;

impl DbFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_db(&self, cfg: &DbConfig) -> Result<Arc<Database>> {
        let conn = match cfg.name {
            DbType::Sqlite => UnionConnection::Sqlite(Self::open_sqlite(&cfg.sqlite)?),
        };

        Ok(Arc::new(Database::new(conn)))
    }

    fn open_sqlite(cfg: &SqliteConfig) -> Result<Sqlite> {
        if cfg.memory {
            warn!("Using in-memory sqlite database, every organization and membership is lost when the server stops");
            return Sqlite::memory().context("open in-memory sqlite");
        }

        info!("Using sqlite database: {}", cfg.path);
        Sqlite::open(cfg.path.as_ref()).with_context(|| format!("open sqlite file {}", cfg.path))
    }
}
