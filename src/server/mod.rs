mod authn;
mod authz;
mod db;
mod error;
mod handlers;
mod membership;
mod response;
mod scope;

pub mod config;
pub mod factory;
pub mod restful;
