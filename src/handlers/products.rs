use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::catalog::build_category_tree;
use crate::extract::{AdminUser, AuthUser};
use crate::models::product::{
    CreateCategoryRequest, CreateProductRequest, CreateReviewRequest, CreateVariantRequest,
    ProductFilter, UpdateProductRequest,
};
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::pagination::Paginated;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Response, AppError> {
    let page = filter.page_params().resolve();
    let (products, total) = repository::products::list(&state.pool, &filter, page).await?;

    Ok(success(
        Paginated::new(products, page, total),
        "Products retrieved",
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let product = repository::products::get_with_variants(&state.pool, id).await?;

    Ok(success(product, "Product retrieved"))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<Response, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required".to_string()));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Price cannot be negative".to_string(),
        ));
    }

    let product = repository::products::create(&state.pool, &req).await?;

    Ok(created(product, "Product created"))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Response, AppError> {
    if let Some(price) = req.price {
        if price < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
    }

    let product = repository::products::update(&state.pool, id, &req).await?;

    Ok(success(product, "Product updated"))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    repository::products::deactivate(&state.pool, id).await?;

    Ok(empty_success("Product deactivated"))
}

pub async fn create_variant(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(product_id): Path<Uuid>,
    Json(req): Json<CreateVariantRequest>,
) -> Result<Response, AppError> {
    if req.sku.trim().is_empty() {
        return Err(AppError::ValidationError("SKU is required".to_string()));
    }
    if req.stock < 0 {
        return Err(AppError::ValidationError(
            "Stock cannot be negative".to_string(),
        ));
    }

    let variant = repository::products::create_variant(&state.pool, product_id, &req).await?;

    Ok(created(variant, "Variant created"))
}

pub async fn categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = repository::products::list_categories(&state.pool).await?;

    Ok(success(
        build_category_tree(categories),
        "Categories retrieved",
    ))
}

pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Response, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required".to_string()));
    }
    if let Some(parent_id) = req.parent_id {
        // surfaces a 404 before the FK would
        let all = repository::products::list_categories(&state.pool).await?;
        if !all.iter().any(|c| c.id == parent_id) {
            return Err(AppError::NotFound(
                "Parent category was not found".to_string(),
            ));
        }
    }

    let category = repository::products::create_category(&state.pool, &req).await?;

    Ok(created(category, "Category created"))
}

pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    repository::products::delete_category(&state.pool, id).await?;

    Ok(empty_success("Category deleted"))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let reviews = repository::products::list_reviews(&state.pool, product_id).await?;

    Ok(success(reviews, "Reviews retrieved"))
}

pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(product_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Response, AppError> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::ValidationError(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Review text is required".to_string(),
        ));
    }

    let review =
        repository::products::create_review(&state.pool, product_id, user.id, &req).await?;

    Ok(created(review, "Review published"))
}

pub async fn delete_review(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    repository::products::delete_review(&state.pool, id).await?;

    Ok(empty_success("Review deleted"))
}
