use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::download::download_blocker;
use crate::extract::{AdminUser, AuthUser};
use crate::models::transaction::{
    AdminTransactionFilter, CourtesyRequest, CreatePurchaseRequest, NominationRequest,
    ReviewRequest, TicketPdfRequest, TicketTransaction,
};
use crate::models::user::User;
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::pagination::Paginated;
use crate::utils::response::{created, success};
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreatePurchaseRequest>,
) -> Result<Response, AppError> {
    let details = repository::transactions::create_purchase(&state.pool, &user, &req).await?;

    Ok(created(details, "Purchase created and awaiting review"))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let details = repository::transactions::get_details(&state.pool, id).await?;
    require_owner_or_admin(&details.transaction, &user)?;

    Ok(success(details, "Transaction retrieved"))
}

pub async fn my_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, AppError> {
    let transactions = repository::transactions::list_for_buyer(&state.pool, user.id).await?;

    Ok(success(transactions, "Transactions retrieved"))
}

pub async fn admin_list(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(filter): Query<AdminTransactionFilter>,
) -> Result<Response, AppError> {
    let page = filter.page_params().resolve();
    let (transactions, total) =
        repository::transactions::admin_list(&state.pool, &filter, page).await?;

    Ok(success(
        Paginated::new(transactions, page, total),
        "Transactions retrieved",
    ))
}

pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Response, AppError> {
    let note = body.as_ref().and_then(|Json(req)| req.note.as_deref());
    let details = repository::transactions::approve(
        &state.pool,
        id,
        &admin,
        note,
        state.settings.ticket_download_delay_days,
    )
    .await?;

    Ok(success(details, "Transaction approved"))
}

pub async fn reject(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Response, AppError> {
    let note = body.as_ref().and_then(|Json(req)| req.note.as_deref());
    let details = repository::transactions::reject(&state.pool, id, &admin, note).await?;

    Ok(success(details, "Transaction rejected"))
}

pub async fn courtesy(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CourtesyRequest>,
) -> Result<Response, AppError> {
    let details = repository::transactions::create_courtesy(&state.pool, &admin, &req).await?;

    Ok(created(details, "Courtesy tickets issued"))
}

pub async fn nominate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, ticket_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<NominationRequest>,
) -> Result<Response, AppError> {
    if req.attendee_name.trim().is_empty() || req.attendee_document.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Attendee name and document are required".to_string(),
        ));
    }

    let transaction = repository::transactions::get(&state.pool, id).await?;
    require_owner_or_admin(&transaction, &user)?;

    let item = repository::transactions::nominate(&state.pool, id, ticket_id, &req).await?;

    Ok(success(item, "Ticket nominated"))
}

pub async fn set_pdf(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<TicketPdfRequest>,
) -> Result<Response, AppError> {
    if !state.settings.is_storage_url(&req.pdf_url) {
        return Err(AppError::ValidationError(
            "The PDF URL must point at the ticket storage bucket".to_string(),
        ));
    }

    let item = repository::transactions::set_item_pdf(&state.pool, ticket_id, &req.pdf_url).await?;

    Ok(success(item, "Ticket PDF recorded"))
}

pub async fn download(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, ticket_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let (transaction, item) = repository::transactions::get_item(&state.pool, id, ticket_id).await?;
    require_owner_or_admin(&transaction, &user)?;

    if let Some(blocker) = download_blocker(
        transaction.status,
        transaction.courtesy,
        transaction.download_available_at,
        item.status,
        item.pdf_url.as_deref(),
        Utc::now(),
    ) {
        return Err(AppError::Conflict(format!(
            "The ticket cannot be downloaded: {blocker}"
        )));
    }

    Ok(success(
        json!({ "pdf_url": item.pdf_url }),
        "Ticket ready for download",
    ))
}

fn require_owner_or_admin(transaction: &TicketTransaction, user: &User) -> Result<(), AppError> {
    if transaction.buyer_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "This purchase belongs to another user".to_string(),
        ));
    }
    Ok(())
}
