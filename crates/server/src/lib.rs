use api_types::ErrorResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Identity};

pub use server::{ServerState, app, cors_layer, run_with_listener};

mod docs;
mod movements;
mod paging;
mod reports;
mod server;
mod users;

pub mod types {
    pub mod movement {
        pub use api_types::movement::{MovementKind, MovementNew, MovementUpdate, MovementView};
    }

    pub mod user {
        pub use api_types::user::{UserUpdate, UserView};
    }

    pub mod report {
        pub use api_types::report::{Balance, ChartPoint, Report};
    }

    pub use api_types::{Listing, Page, PageQuery, Role};
}

pub enum ServerError {
    Engine(EngineError),
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Password(_) | EngineError::Blocking(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidAmount(_)
        | EngineError::InvalidConcept(_)
        | EngineError::InvalidKind(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidPage(_)
        | EngineError::InvalidRole(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidEmail(_)
        | EngineError::InvalidPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Password(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            "internal server error".to_string()
        }
        EngineError::Blocking(join_err) => {
            tracing::error!("blocking task error: {join_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parses an `{id}` path segment. An id that cannot exist is reported as not
/// found.
pub(crate) fn path_id(raw: &str, what: &str) -> Result<uuid::Uuid, ServerError> {
    uuid::Uuid::parse_str(raw)
        .map_err(|_| EngineError::KeyNotFound(format!("{what} not exists")).into())
}

/// Rejects callers that are not administrators.
pub(crate) fn require_admin(identity: &Identity) -> Result<(), ServerError> {
    if !identity.role.is_admin() {
        tracing::debug!(user_id = %identity.user_id, "administrator role required");
        return Err(EngineError::Forbidden("administrator role required".to_string()).into());
    }
    Ok(())
}
