use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

use super::sqlite::config::SqliteConfig;

/// The `[db]` table of `server.toml`. Organizations, memberships and every
/// scoped resource live in the selected backend.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DbConfig {
    #[serde(default = "DbConfig::default_name")]
    pub name: DbType,

    #[serde(default = "SqliteConfig::default")]
    pub sqlite: SqliteConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl CommonConfig for DbConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            sqlite: SqliteConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        match self.name {
            DbType::Sqlite => self.sqlite.complete(ps).context("sqlite")?,
        }
        Ok(())
    }
}

impl DbConfig {
    fn default_name() -> DbType {
        DbType::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;

    #[test]
    fn test_parse() {
        let cfg: DbConfig = toml::from_str("[sqlite]\nmemory = true\n").unwrap();
        assert_eq!(cfg.name, DbType::Sqlite);
        assert!(cfg.sqlite.memory);

        let cfg: DbConfig = toml::from_str("").unwrap();
        assert!(!cfg.sqlite.memory);
        assert!(cfg.sqlite.path.is_empty());

        assert!(toml::from_str::<DbConfig>("name = \"postgres\"").is_err());
    }

    #[test]
    fn test_complete_memory() {
        let base = env::temp_dir().join(format!("huddle-dbcfg-{}", uuid::Uuid::new_v4()));
        let ps = PathSet::new(Some(base.join("config")), Some(base.join("data"))).unwrap();

        let mut cfg = DbConfig::default();
        cfg.sqlite.memory = true;
        cfg.complete(&ps).unwrap();
        // An in-memory database never touches the data directory
        assert!(cfg.sqlite.path.is_empty());

        fs::remove_dir_all(base).unwrap();
    }
}
