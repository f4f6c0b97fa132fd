//! User administration and the caller's own record.

use api_types::{
    ErrorResponse, Listing, PageQuery, Role as ApiRole,
    user::{UserUpdate, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Identity, Role};

use crate::{ServerError, paging, path_id, require_admin, server::ServerState};

fn map_role(role: Role) -> ApiRole {
    match role {
        Role::Admin => ApiRole::Admin,
        Role::User => ApiRole::User,
    }
}

fn engine_role(role: ApiRole) -> Role {
    match role {
        ApiRole::Admin => Role::Admin,
        ApiRole::User => Role::User,
    }
}

fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        role: map_role(user.role),
        phone: user.phone,
        created_at: user.created_at,
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(PageQuery),
    responses(
        (status = 200, description = "Every user, or one page when `page` is given", body = Listing<UserView>),
        (status = 403, body = ErrorResponse),
    )
)]
pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<UserView>>, ServerError> {
    require_admin(&identity)?;
    let engine = &state.engine;

    let listing = match paging::requested_page(&query) {
        None => Listing::All(engine.list_users().await?.into_iter().map(view).collect()),
        Some((page, page_size)) => {
            let result = engine.list_users_page(page, page_size).await?;
            let items = result.items.into_iter().map(view).collect();
            Listing::Page(paging::envelope(items, result.total, page, page_size))
        }
    };

    Ok(Json(listing))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, body = UserView),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    )
)]
pub async fn get(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    require_admin(&identity)?;
    let id = path_id(&id, "user")?;
    Ok(Json(view(state.engine.user(id).await?)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, body = UserView),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 422, description = "Blank name", body = ErrorResponse),
    )
)]
pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    require_admin(&identity)?;
    let id = path_id(&id, "user")?;
    let patch = engine::UserPatch {
        name: payload.name,
        role: payload.role.map(engine_role),
        phone: payload.phone,
    };

    let user = state.engine.update_user(id, patch).await?;
    tracing::info!(user_id = %id, by = %identity.user_id, "user updated");

    Ok(Json(view(user)))
}

/// Deletes the user and every movement it owns.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User and its movements deleted"),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    )
)]
pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    require_admin(&identity)?;
    let id = path_id(&id, "user")?;
    state.engine.delete_user(id).await?;
    tracing::info!(user_id = %id, by = %identity.user_id, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "users",
    responses((status = 200, description = "The authenticated caller", body = UserView))
)]
pub async fn me(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let id = path_id(&identity.user_id, "user")?;
    Ok(Json(view(state.engine.user(id).await?)))
}
