use sqlx::PgPool;
use uuid::Uuid;

use crate::models::contact::{ContactMessage, ContactRequest};
use crate::utils::error::AppError;

pub async fn insert(pool: &PgPool, req: &ContactRequest) -> Result<ContactMessage, AppError> {
    let message = sqlx::query_as::<_, ContactMessage>(
        "INSERT INTO contact_messages (id, name, email, message)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.message)
    .fetch_one(pool)
    .await?;

    Ok(message)
}
