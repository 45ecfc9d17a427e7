use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::extract::{AdminUser, AuthUser};
use crate::models::blog::{CreateCommentRequest, CreatePostRequest, UpdatePostRequest};
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let posts = repository::blog::list_published(&state.pool).await?;

    Ok(success(posts, "Posts retrieved"))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let post = repository::blog::get_by_slug(&state.pool, &slug).await?;

    Ok(success(post, "Post retrieved"))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<Response, AppError> {
    if req.title.trim().is_empty() || req.body.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Title and body are required".to_string(),
        ));
    }

    let post = repository::blog::create(&state.pool, admin.id, &req).await?;

    Ok(created(post, "Post created"))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Response, AppError> {
    let post = repository::blog::update(&state.pool, id, &req).await?;

    Ok(success(post, "Post updated"))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    repository::blog::delete(&state.pool, id).await?;

    Ok(empty_success("Post deleted"))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let post = repository::blog::get_by_slug(&state.pool, &slug).await?;
    let comments = repository::blog::list_comments(&state.pool, post.id).await?;

    Ok(success(comments, "Comments retrieved"))
}

pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Response, AppError> {
    if req.body.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Comment text is required".to_string(),
        ));
    }

    let post = repository::blog::get_by_slug(&state.pool, &slug).await?;
    let comment = repository::blog::create_comment(&state.pool, post.id, user.id, &req).await?;

    Ok(created(comment, "Comment published"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    repository::blog::delete_comment(&state.pool, id).await?;

    Ok(empty_success("Comment deleted"))
}
