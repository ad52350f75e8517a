use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};
use crate::types::user::validate_user_name;

use super::token::config::TokenConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthnConfig {
    /// Name of the global admin account bootstrapped at startup.
    #[serde(default = "AuthnConfig::default_admin_name")]
    pub admin_name: String,

    /// Password of the bootstrapped admin. Empty disables the bootstrap.
    #[serde(default = "AuthnConfig::default_admin_password")]
    pub admin_password: String,

    /// Client addresses global admins may connect from. `*` allows any.
    #[serde(default = "AuthnConfig::default_admin_allow_list")]
    pub admin_allow_list: HashSet<String>,

    #[serde(default = "AuthnConfig::default_allow_registration")]
    pub allow_registration: bool,

    /// Whether registering without a password creates a guest account.
    #[serde(default = "AuthnConfig::default_allow_guests")]
    pub allow_guests: bool,

    #[serde(default = "TokenConfig::default")]
    pub token: TokenConfig,
}

impl CommonConfig for AuthnConfig {
    fn default() -> Self {
        Self {
            admin_name: Self::default_admin_name(),
            admin_password: Self::default_admin_password(),
            admin_allow_list: Self::default_admin_allow_list(),
            allow_registration: Self::default_allow_registration(),
            allow_guests: Self::default_allow_guests(),
            token: TokenConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.admin_name = expandenv("admin_name", &self.admin_name)?;
        validate_user_name(&self.admin_name).context("admin_name")?;

        self.admin_password = expandenv("admin_password", &self.admin_password)?;

        if self.admin_allow_list.iter().any(|addr| addr.trim().is_empty()) {
            bail!("admin_allow_list cannot contain empty address");
        }

        self.token.complete(ps).context("token")?;
        Ok(())
    }
}

impl AuthnConfig {
    pub fn default_admin_name() -> String {
        String::from("admin")
    }

    pub fn default_admin_password() -> String {
        String::from("admin")
    }

    pub fn default_admin_allow_list() -> HashSet<String> {
        vec![String::from("*")].into_iter().collect()
    }

    pub fn default_allow_registration() -> bool {
        true
    }

    pub fn default_allow_guests() -> bool {
        true
    }
}
