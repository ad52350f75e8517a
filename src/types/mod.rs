pub mod apikey;
pub mod healthz;
pub mod org;
pub mod resource;
pub mod response;
pub mod token;
pub mod user;
