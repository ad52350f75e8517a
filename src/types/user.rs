use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Account-wide privilege level, independent of any membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRank {
    Guest,
    Registered,
    Admin,
    AdminElevated,
}

impl GlobalRank {
    /// Both admin ranks bypass every scoped check.
    pub fn is_global_admin(&self) -> bool {
        matches!(self, GlobalRank::Admin | GlobalRank::AdminElevated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRank::Guest => "GUEST",
            GlobalRank::Registered => "REGISTERED",
            GlobalRank::Admin => "ADMIN",
            GlobalRank::AdminElevated => "ADMIN_ELEVATED",
        }
    }
}

impl FromStr for GlobalRank {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "GUEST" => GlobalRank::Guest,
            "REGISTERED" => GlobalRank::Registered,
            "ADMIN" => GlobalRank::Admin,
            "ADMIN_ELEVATED" => GlobalRank::AdminElevated,
            _ => bail!("unknown global rank '{s}'"),
        })
    }
}

impl fmt::Display for GlobalRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub rank: GlobalRank,
    pub create_time: u64,
    pub update_time: u64,
    pub last_active: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,

    /// Registering without a password creates a guest account.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchUserRequest {
    pub rank: GlobalRank,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoamiResponse {
    pub id: String,
    pub name: String,
    pub rank: GlobalRank,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaniResponse {
    pub allow: bool,
}

pub const MAX_NAME_LENGTH: usize = 64;

pub fn validate_user_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("name cannot be empty");
    }
    if name.len() > MAX_NAME_LENGTH {
        bail!("name is too long, max length is {MAX_NAME_LENGTH}");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        bail!("name can only contain letters, digits, '_', '-' and '.'");
    }
    Ok(())
}

pub fn generate_password_hash(password: &str) -> (String, String) {
    let salt = generate_salt(SALT_LENGTH);
    let hash = get_password_hash(password, &salt);
    (hash, salt)
}

pub fn get_password_hash(password: &str, salt: &str) -> String {
    let combined = format!("{password}{salt}");
    let hash = Sha256::digest(combined.as_bytes());
    format!("{:x}", hash)
}

pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    get_password_hash(password, salt)
        .as_bytes()
        .ct_eq(hash.as_bytes())
        .into()
}

const SALT_LENGTH: usize = 30;

pub fn generate_salt(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
