pub mod api;
pub mod healthz;
pub mod login;
pub mod path;
pub mod register;
pub mod resources;

use actix_web::HttpRequest;

use super::response::Response;

pub trait Handler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response;
}
