use sqlx::PgPool;
use uuid::Uuid;

use crate::models::enums::UserRole;
use crate::models::user::{UpdateProfileRequest, User};
use crate::utils::error::AppError;
use crate::utils::pagination::ResolvedPage;

/// Look up the caller's profile, provisioning it on first sight. Identity
/// comes from the external auth provider, so the id doubles as the provider
/// linkage.
pub async fn get_or_create(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    display_name: &str,
) -> Result<User, AppError> {
    sqlx::query(
        "INSERT INTO users (id, display_name, email, auth_provider_id)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(display_name)
    .bind(email)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    get(pool, id).await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User was not found".to_string()))
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateProfileRequest,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET display_name = COALESCE($2, display_name),
             preferred_currency = COALESCE($3, preferred_currency),
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.display_name.as_deref())
    .bind(req.preferred_currency.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User was not found".to_string()))
}

pub async fn list(pool: &PgPool, page: ResolvedPage) -> Result<(Vec<User>, i64), AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok((users, total))
}

pub async fn set_role(pool: &PgPool, id: Uuid, role: UserRole) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(role)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User was not found".to_string()))
}
