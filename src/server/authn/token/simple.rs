use anyhow::{bail, Result};

use super::{TokenGenerator, TokenResponse, TokenValidator};

#[derive(Debug, Clone)]
pub struct SimpleToken;

impl SimpleToken {
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for SimpleToken {
    fn generate_token(&self, user_id: String) -> Result<TokenResponse> {
        if user_id.is_empty() {
            bail!("empty user id");
        }
        Ok(TokenResponse {
            user_id: user_id.clone(),
            token: format!("simple-token-{user_id}"),
            expire_in: 0,
        })
    }
}

impl TokenValidator for SimpleToken {
    fn validate_token(&self, token: &str) -> Result<String> {
        match token.strip_prefix("simple-token-") {
            Some(user_id) if !user_id.is_empty() => Ok(user_id.to_string()),
            _ => bail!("invalid simple token"),
        }
    }
}
