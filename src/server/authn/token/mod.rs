pub mod config;
pub mod factory;
pub mod jwt;

#[cfg(test)]
pub mod simple;

use anyhow::Result;

use crate::types::token::TokenResponse;

/// Issues session tokens whose subject is a user id.
pub trait TokenGenerator {
    fn generate_token(&self, user_id: String) -> Result<TokenResponse>;
}

/// Validates a session token and returns its subject.
pub trait TokenValidator {
    fn validate_token(&self, token: &str) -> Result<String>;
}
