use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::sync::Arc;

use crate::{docs, movements, reports, users};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the caller from HTTP Basic credentials (`email:password`).
///
/// The verified [`engine::Identity`] is stored in the request extensions;
/// handlers never look at the raw credentials or the stored role again.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let identity = match state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
    {
        Ok(identity) => identity,
        Err(EngineError::Unauthorized(_)) => {
            tracing::debug!("rejected credentials for {}", auth_header.username());
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(err) => {
            tracing::error!("authentication failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// CORS policy allowing the web frontend at `frontend_url` to call the API
/// with credentials.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]))
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/movements", get(movements::list).post(movements::create))
        .route(
            "/movements/{id}",
            get(movements::get)
                .patch(movements::update)
                .delete(movements::delete),
        )
        .route("/reports", get(reports::get_report))
        .route("/reports/chart.csv", get(reports::chart_csv))
        .route("/users", get(users::list))
        .route(
            "/users/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/me", get(users::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/docs", get(docs::docs))
        .with_state(state)
}

/// Builds the complete application: routes, authentication, CORS and request
/// tracing.
pub fn app(engine: Engine, frontend_url: &str) -> Result<Router, header::InvalidHeaderValue> {
    let state = ServerState {
        engine: Arc::new(engine),
    };
    Ok(router(state)
        .layer(cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http()))
}

pub async fn run_with_listener(
    engine: Engine,
    frontend_url: &str,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    let app = app(engine, frontend_url).map_err(std::io::Error::other)?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await
}
