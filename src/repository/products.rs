use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::product::{
    CreateCategoryRequest, CreateProductRequest, CreateReviewRequest, CreateVariantRequest,
    Product, ProductCategory, ProductFilter, ProductReview, ProductVariant, ProductWithVariants,
    UpdateProductRequest,
};
use crate::utils::error::AppError;
use crate::utils::pagination::ResolvedPage;
use crate::utils::slug::slugify;

use super::is_unique_violation;

pub async fn list(
    pool: &PgPool,
    filter: &ProductFilter,
    page: ResolvedPage,
) -> Result<(Vec<Product>, i64), AppError> {
    let mut list_query =
        QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE active");
    push_filters(&mut list_query, filter);
    list_query
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let products = list_query
        .build_query_as::<Product>()
        .fetch_all(pool)
        .await?;

    let mut count_query =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE active");
    push_filters(&mut count_query, filter);

    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    Ok((products, total))
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(category) = filter.category {
        query.push(" AND category_id = ").push_bind(category);
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", search.trim());
        query.push(" AND name ILIKE ").push_bind(pattern);
    }
}

pub async fn get_with_variants(pool: &PgPool, id: Uuid) -> Result<ProductWithVariants, AppError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product was not found".to_string()))?;

    let variants = sqlx::query_as::<_, ProductVariant>(
        "SELECT * FROM product_variants WHERE product_id = $1 ORDER BY name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(ProductWithVariants { product, variants })
}

pub async fn create(pool: &PgPool, req: &CreateProductRequest) -> Result<Product, AppError> {
    let result = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, category_id, name, slug, description, price, currency, image_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(req.category_id)
    .bind(&req.name)
    .bind(slugify(&req.name))
    .bind(req.description.as_deref())
    .bind(req.price)
    .bind(&req.currency)
    .bind(req.image_url.as_deref())
    .fetch_one(pool)
    .await;

    match result {
        Ok(product) => Ok(product),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "A product with the same name already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateProductRequest,
) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>(
        "UPDATE products
         SET category_id = COALESCE($2, category_id),
             name = COALESCE($3, name),
             description = COALESCE($4, description),
             price = COALESCE($5, price),
             currency = COALESCE($6, currency),
             image_url = COALESCE($7, image_url),
             active = COALESCE($8, active),
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.category_id)
    .bind(req.name.as_deref())
    .bind(req.description.as_deref())
    .bind(req.price)
    .bind(req.currency.as_deref())
    .bind(req.image_url.as_deref())
    .bind(req.active)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Product was not found".to_string()))
}

/// Products stay addressable from old orders, so deletion only deactivates.
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let done = sqlx::query("UPDATE products SET active = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("Product was not found".to_string()));
    }

    Ok(())
}

pub async fn create_variant(
    pool: &PgPool,
    product_id: Uuid,
    req: &CreateVariantRequest,
) -> Result<ProductVariant, AppError> {
    get_with_variants(pool, product_id).await?;

    let result = sqlx::query_as::<_, ProductVariant>(
        "INSERT INTO product_variants (id, product_id, name, sku, price_override, stock)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(&req.name)
    .bind(&req.sku)
    .bind(req.price_override)
    .bind(req.stock)
    .fetch_one(pool)
    .await;

    match result {
        Ok(variant) => Ok(variant),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "SKU '{}' is already in use",
            req.sku
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_categories(pool: &PgPool) -> Result<Vec<ProductCategory>, AppError> {
    let categories =
        sqlx::query_as::<_, ProductCategory>("SELECT * FROM product_categories ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(categories)
}

pub async fn create_category(
    pool: &PgPool,
    req: &CreateCategoryRequest,
) -> Result<ProductCategory, AppError> {
    let result = sqlx::query_as::<_, ProductCategory>(
        "INSERT INTO product_categories (id, name, slug, parent_id, image_url)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(slugify(&req.name))
    .bind(req.parent_id)
    .bind(req.image_url.as_deref())
    .fetch_one(pool)
    .await;

    match result {
        Ok(category) => Ok(category),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "A category with the same name already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// A category with children or products underneath it cannot be removed.
pub async fn delete_category(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let in_use: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM product_categories WHERE parent_id = $1)
              + (SELECT COUNT(*) FROM products WHERE category_id = $1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    if in_use > 0 {
        return Err(AppError::Conflict(
            "The category still has products or subcategories".to_string(),
        ));
    }

    let done = sqlx::query("DELETE FROM product_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("Category was not found".to_string()));
    }

    Ok(())
}

pub async fn list_reviews(pool: &PgPool, product_id: Uuid) -> Result<Vec<ProductReview>, AppError> {
    let reviews = sqlx::query_as::<_, ProductReview>(
        "SELECT * FROM product_reviews WHERE product_id = $1 ORDER BY created_at DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

pub async fn create_review(
    pool: &PgPool,
    product_id: Uuid,
    author_id: Uuid,
    req: &CreateReviewRequest,
) -> Result<ProductReview, AppError> {
    get_with_variants(pool, product_id).await?;

    let result = sqlx::query_as::<_, ProductReview>(
        "INSERT INTO product_reviews (id, product_id, author_id, rating, body)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(author_id)
    .bind(req.rating)
    .bind(&req.body)
    .fetch_one(pool)
    .await;

    match result {
        Ok(review) => Ok(review),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "You have already reviewed this product".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_review(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let done = sqlx::query("DELETE FROM product_reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("Review was not found".to_string()));
    }

    Ok(())
}
