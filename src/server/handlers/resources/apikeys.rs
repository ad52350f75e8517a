use anyhow::Result;
use log::info;

use crate::server::authz::guard::Guard;
use crate::server::authz::Level;
use crate::server::db::ApiKeyRecord;
use crate::server::error::ApiError;
use crate::server::response::Response;
use crate::server::scope::ResourceRef;
use crate::time::current_timestamp;
use crate::types::apikey::{generate_secret, hash_secret, ApiKey, ApiKeyCreated, PutApiKeyRequest};

use super::{new_id, validate_name, Method, ResourceRequest};

pub fn collection(guard: &Guard, req: &ResourceRequest) -> Result<Response> {
    match req.method {
        Method::Get => {
            let keys: Vec<ApiKey> = guard
                .tx
                .list_api_keys(&guard.user.id)?
                .into_iter()
                .map(ApiKey::from)
                .collect();
            Ok(Response::list(keys))
        }
        Method::Put => {
            let body: PutApiKeyRequest = req.json()?;
            validate_name(&body.name)?;

            let secret = generate_secret();
            let record = ApiKeyRecord {
                id: new_id(),
                user_id: guard.user.id.clone(),
                name: body.name,
                hash: hash_secret(&secret),
                create_time: current_timestamp(),
            };
            guard.tx.create_api_key(&record)?;
            info!("Create api key '{}' for '{}'", record.id, guard.user.id);

            let key = format!("{}.{secret}", record.id);
            Ok(Response::json(ApiKeyCreated {
                id: record.id,
                name: record.name,
                key,
            }))
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}

pub fn item(guard: &Guard, id: &str, req: &ResourceRequest) -> Result<Response> {
    let chain = guard.resolve(&ResourceRef::ApiKey(id.to_string()))?;
    match req.method {
        Method::Get => {
            guard.require(Level::View, &chain)?;
            match guard.tx.get_api_key(id)? {
                Some(record) => Ok(Response::json(ApiKey::from(record))),
                None => Err(ApiError::not_found(format!("apikey '{id}' not found"))),
            }
        }
        Method::Delete => {
            guard.require(Level::Manage, &chain)?;
            guard.tx.delete_api_key(id)?;
            info!("Delete api key '{id}' by '{}'", guard.user.id);
            Ok(Response::ok())
        }
        _ => Err(ApiError::method_not_allowed()),
    }
}
