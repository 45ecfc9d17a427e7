use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::extract::{AdminUser, AuthUser};
use crate::models::user::{SetRoleRequest, UpdateProfileRequest};
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::pagination::{PageParams, Paginated};
use crate::utils::response::success;
use crate::AppState;

pub async fn me(AuthUser(user): AuthUser) -> Result<Response, AppError> {
    Ok(success(user, "Profile retrieved"))
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(mut req): Json<UpdateProfileRequest>,
) -> Result<Response, AppError> {
    if let Some(name) = &req.display_name {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Display name cannot be empty".to_string(),
            ));
        }
    }
    if let Some(currency) = &req.preferred_currency {
        let currency = currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::ValidationError(
                "Currency must be a three-letter ISO code".to_string(),
            ));
        }
        req.preferred_currency = Some(currency.to_ascii_uppercase());
    }

    let user = repository::users::update_profile(&state.pool, user.id, &req).await?;

    Ok(success(user, "Profile updated"))
}

pub async fn admin_list(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<PageParams>,
) -> Result<Response, AppError> {
    let page = params.resolve();
    let (users, total) = repository::users::list(&state.pool, page).await?;

    Ok(success(Paginated::new(users, page, total), "Users retrieved"))
}

pub async fn set_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Response, AppError> {
    // an admin cannot demote themselves, someone else has to
    if id == admin.id {
        return Err(AppError::Conflict(
            "You cannot change your own role".to_string(),
        ));
    }

    let user = repository::users::set_role(&state.pool, id, req.role).await?;

    Ok(success(user, "Role updated"))
}
