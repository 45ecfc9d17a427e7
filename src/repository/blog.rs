use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::blog::{
    BlogComment, BlogPost, CreateCommentRequest, CreatePostRequest, UpdatePostRequest,
};
use crate::utils::error::AppError;
use crate::utils::slug::slugify;

use super::is_unique_violation;

pub async fn list_published(pool: &PgPool) -> Result<Vec<BlogPost>, AppError> {
    let posts = sqlx::query_as::<_, BlogPost>(
        "SELECT * FROM blog_posts WHERE published_at IS NOT NULL ORDER BY published_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<BlogPost, AppError> {
    sqlx::query_as::<_, BlogPost>(
        "SELECT * FROM blog_posts WHERE slug = $1 AND published_at IS NOT NULL",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Post was not found".to_string()))
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<BlogPost, AppError> {
    sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post was not found".to_string()))
}

pub async fn create(
    pool: &PgPool,
    author_id: Uuid,
    req: &CreatePostRequest,
) -> Result<BlogPost, AppError> {
    let published_at = if req.publish.unwrap_or(false) {
        Some(Utc::now())
    } else {
        None
    };

    let result = sqlx::query_as::<_, BlogPost>(
        "INSERT INTO blog_posts (id, author_id, title, slug, body, cover_image_url, published_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(author_id)
    .bind(&req.title)
    .bind(slugify(&req.title))
    .bind(&req.body)
    .bind(req.cover_image_url.as_deref())
    .bind(published_at)
    .fetch_one(pool)
    .await;

    match result {
        Ok(post) => Ok(post),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "A post with the same title already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn update(pool: &PgPool, id: Uuid, req: &UpdatePostRequest) -> Result<BlogPost, AppError> {
    let current = get(pool, id).await?;

    // publish=true stamps now once; publish=false unpublishes
    let published_at = match req.publish {
        Some(true) => current.published_at.or_else(|| Some(Utc::now())),
        Some(false) => None,
        None => current.published_at,
    };

    let post = sqlx::query_as::<_, BlogPost>(
        "UPDATE blog_posts
         SET title = COALESCE($2, title),
             body = COALESCE($3, body),
             cover_image_url = COALESCE($4, cover_image_url),
             published_at = $5,
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.title.as_deref())
    .bind(req.body.as_deref())
    .bind(req.cover_image_url.as_deref())
    .bind(published_at)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("Post was not found".to_string()));
    }

    Ok(())
}

pub async fn list_comments(pool: &PgPool, post_id: Uuid) -> Result<Vec<BlogComment>, AppError> {
    let comments = sqlx::query_as::<_, BlogComment>(
        "SELECT * FROM blog_comments WHERE post_id = $1 ORDER BY created_at ASC",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    author_id: Uuid,
    req: &CreateCommentRequest,
) -> Result<BlogComment, AppError> {
    // comments only attach to published posts
    let post = get(pool, post_id).await?;
    if post.published_at.is_none() {
        return Err(AppError::NotFound("Post was not found".to_string()));
    }

    let comment = sqlx::query_as::<_, BlogComment>(
        "INSERT INTO blog_comments (id, post_id, author_id, body)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(author_id)
    .bind(&req.body)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

pub async fn delete_comment(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM blog_comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("Comment was not found".to_string()));
    }

    Ok(())
}
