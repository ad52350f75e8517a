use log::error;
use thiserror::Error;

use super::response::{self, Response};
use super::scope::ScopeError;

/// Failures a controller reports to the client. Raised inside a transaction
/// as an `anyhow` error so the transaction rolls back, and turned into a
/// response at the handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> anyhow::Error {
        Self::BadRequest(message.into()).into()
    }

    pub fn forbidden(message: impl Into<String>) -> anyhow::Error {
        Self::Forbidden(message.into()).into()
    }

    pub fn not_found(message: impl Into<String>) -> anyhow::Error {
        Self::NotFound(message.into()).into()
    }

    pub fn method_not_allowed() -> anyhow::Error {
        Self::MethodNotAllowed.into()
    }

    pub fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => Response::bad_request(msg),
            ApiError::Forbidden(msg) => Response::forbidden(&msg),
            ApiError::NotFound(msg) => Response::not_found(msg),
            ApiError::MethodNotAllowed => Response::method_not_allowed(),
        }
    }
}

impl Response {
    /// Maps an error escaping a controller. Anything that is not a client
    /// error is logged and hidden behind a fixed message.
    pub fn from_error(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ApiError>() {
            Ok(api_err) => return api_err.into_response(),
            Err(err) => err,
        };

        match err.downcast::<ScopeError>() {
            Ok(ScopeError::NotFound { kind, id }) => {
                Response::not_found(format!("{kind} '{id}' not found"))
            }
            Ok(ScopeError::Invariant(msg)) => {
                error!("Hierarchy invariant violated: {msg}");
                Response::error(response::INVARIANT_ERROR)
            }
            Ok(ScopeError::Database(err)) => {
                error!("Database operation failed: {err:#}");
                Response::error(response::DATABASE_ERROR)
            }
            Err(err) => {
                error!("Database operation failed: {err:#}");
                Response::error(response::DATABASE_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::HttpResponse;
    use anyhow::Context;

    use super::*;

    fn status(resp: Response) -> StatusCode {
        let resp: HttpResponse = resp.into();
        resp.status()
    }

    #[test]
    fn test_from_error() {
        let cases: Vec<(anyhow::Error, StatusCode)> = vec![
            (ApiError::bad_request("bad"), StatusCode::BAD_REQUEST),
            (ApiError::forbidden("no"), StatusCode::FORBIDDEN),
            (ApiError::not_found("gone"), StatusCode::NOT_FOUND),
            (ApiError::method_not_allowed(), StatusCode::METHOD_NOT_ALLOWED),
            (
                ScopeError::NotFound {
                    kind: "team",
                    id: String::from("t"),
                }
                .into(),
                StatusCode::NOT_FOUND,
            ),
            (
                ScopeError::Invariant(String::from("broken")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                anyhow::anyhow!("disk full"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expect) in cases {
            assert_eq!(status(Response::from_error(err)), expect);
        }
    }

    #[test]
    fn test_from_error_with_context() {
        let err: anyhow::Error = ApiError::NotFound(String::from("gone")).into();
        let err = err.context("while loading");
        assert_eq!(status(Response::from_error(err)), StatusCode::NOT_FOUND);

        let result: anyhow::Result<()> = Err(anyhow::anyhow!("io")).context("save");
        let err = result.unwrap_err();
        assert_eq!(
            status(Response::from_error(err)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
