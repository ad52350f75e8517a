mod apikeys;
mod departments;
mod members;
mod organizations;
mod scoped;
mod teams;
mod users;

pub mod dispatch;

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::server::error::ApiError;
use crate::types::org::validate_entity_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(Method::Get),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

pub struct ResourceRequest {
    pub method: Method,
    body: Option<Vec<u8>>,
}

impl ResourceRequest {
    pub fn new(method: Method, body: Option<Vec<u8>>) -> Self {
        Self { method, body }
    }

    /// Decodes the JSON body. A missing or malformed body is a bad request.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = match self.body {
            Some(ref body) if !body.is_empty() => body,
            _ => return Err(ApiError::bad_request("request body is required")),
        };
        serde_json::from_slice(body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
    }
}

fn validate_name(name: &str) -> Result<()> {
    validate_entity_name(name).map_err(|e| ApiError::bad_request(format!("{e:#}")))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
