//! Movements API endpoints

use api_types::{
    ErrorResponse, Listing, PageQuery,
    movement::{MovementKind as ApiKind, MovementNew, MovementUpdate, MovementView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::Identity;

use crate::{ServerError, paging, path_id, require_admin, server::ServerState};

fn map_kind(kind: engine::MovementKind) -> ApiKind {
    match kind {
        engine::MovementKind::Income => ApiKind::Income,
        engine::MovementKind::Expense => ApiKind::Expense,
    }
}

fn engine_kind(kind: ApiKind) -> engine::MovementKind {
    match kind {
        ApiKind::Income => engine::MovementKind::Income,
        ApiKind::Expense => engine::MovementKind::Expense,
    }
}

fn view(movement: engine::Movement) -> MovementView {
    MovementView {
        id: movement.id,
        concept: movement.concept,
        amount_minor: movement.amount_minor,
        kind: map_kind(movement.kind),
        date: movement.date,
        user_id: movement.user_id,
        user_name: movement.user_name,
    }
}

#[utoipa::path(
    get,
    path = "/movements",
    tag = "movements",
    params(PageQuery),
    responses(
        (status = 200, description = "Every movement, or one page when `page` is given", body = Listing<MovementView>),
        (status = 401, description = "Missing or invalid credentials"),
    )
)]
pub async fn list(
    Extension(_identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<MovementView>>, ServerError> {
    let engine = &state.engine;

    let listing = match paging::requested_page(&query) {
        None => {
            let movements = engine.list_movements().await?;
            Listing::All(movements.into_iter().map(view).collect())
        }
        Some((page, page_size)) => {
            let result = engine.list_movements_page(page, page_size).await?;
            let items = result.items.into_iter().map(view).collect();
            Listing::Page(paging::envelope(items, result.total, page, page_size))
        }
    };

    Ok(Json(listing))
}

#[utoipa::path(
    get,
    path = "/movements/{id}",
    tag = "movements",
    params(("id" = String, Path, description = "Movement id")),
    responses(
        (status = 200, body = MovementView),
        (status = 404, body = ErrorResponse),
    )
)]
pub async fn get(
    Extension(_identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<MovementView>, ServerError> {
    let id = path_id(&id, "movement")?;
    let movement = state.engine.movement(id).await?;
    Ok(Json(view(movement)))
}

/// Only administrators record movements; the caller becomes the owner.
#[utoipa::path(
    post,
    path = "/movements",
    tag = "movements",
    request_body = MovementNew,
    responses(
        (status = 201, body = MovementView),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse),
        (status = 422, body = ErrorResponse),
    )
)]
pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<MovementNew>,
) -> Result<(StatusCode, Json<MovementView>), ServerError> {
    require_admin(&identity)?;

    let movement = state
        .engine
        .create_movement(
            engine::MovementNew {
                concept: payload.concept,
                amount_minor: payload.amount_minor,
                kind: engine_kind(payload.kind),
                date: payload.date.with_timezone(&Utc),
            },
            &identity,
        )
        .await?;
    tracing::info!(movement_id = %movement.id, user_id = %identity.user_id, "movement created");

    Ok((StatusCode::CREATED, Json(view(movement))))
}

#[utoipa::path(
    patch,
    path = "/movements/{id}",
    tag = "movements",
    params(("id" = String, Path, description = "Movement id")),
    request_body = MovementUpdate,
    responses(
        (status = 200, body = MovementView),
        (status = 403, description = "Caller is neither the owner nor an administrator", body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 422, body = ErrorResponse),
    )
)]
pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MovementUpdate>,
) -> Result<Json<MovementView>, ServerError> {
    let id = path_id(&id, "movement")?;
    let patch = engine::MovementPatch {
        concept: payload.concept,
        amount_minor: payload.amount_minor,
        kind: payload.kind.map(engine_kind),
        date: payload.date.map(|date| date.with_timezone(&Utc)),
    };

    let movement = state.engine.update_movement(id, patch, &identity).await?;
    tracing::info!(movement_id = %id, user_id = %identity.user_id, "movement updated");

    Ok(Json(view(movement)))
}

#[utoipa::path(
    delete,
    path = "/movements/{id}",
    tag = "movements",
    params(("id" = String, Path, description = "Movement id")),
    responses(
        (status = 204, description = "Movement deleted"),
        (status = 403, description = "Caller is neither the owner nor an administrator", body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    )
)]
pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = path_id(&id, "movement")?;
    state.engine.delete_movement(id, &identity).await?;
    tracing::info!(movement_id = %id, user_id = %identity.user_id, "movement deleted");

    Ok(StatusCode::NO_CONTENT)
}
