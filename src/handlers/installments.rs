use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::extract::{AdminUser, AuthUser};
use crate::models::installment::{ProofRequest, RejectInstallmentRequest};
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::AppState;

pub async fn list_for_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let transaction = repository::transactions::get(&state.pool, id).await?;
    if transaction.buyer_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "This purchase belongs to another user".to_string(),
        ));
    }

    let installments = repository::installments::list_for_transaction(&state.pool, id).await?;

    Ok(success(installments, "Installments retrieved"))
}

pub async fn attach_proof(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ProofRequest>,
) -> Result<Response, AppError> {
    if !state.settings.is_storage_url(&req.proof_url) {
        return Err(AppError::ValidationError(
            "The proof URL must point at the payment storage bucket".to_string(),
        ));
    }

    let installment = repository::installments::get(&state.pool, id).await?;
    let transaction =
        repository::transactions::get(&state.pool, installment.transaction_id).await?;
    if transaction.buyer_id != user.id {
        return Err(AppError::Forbidden(
            "This installment belongs to another user".to_string(),
        ));
    }

    let installment = repository::installments::attach_proof(&state.pool, id, &req.proof_url).await?;

    Ok(success(installment, "Payment proof submitted"))
}

pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let installment = repository::installments::approve(&state.pool, id, admin.id).await?;

    Ok(success(installment, "Installment marked as paid"))
}

pub async fn reject(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectInstallmentRequest>>,
) -> Result<Response, AppError> {
    let note = body.as_ref().and_then(|Json(req)| req.note.as_deref());
    let installment = repository::installments::reject(&state.pool, id, note).await?;

    Ok(success(installment, "Payment proof rejected"))
}

pub async fn sweep_overdue(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, AppError> {
    let swept = repository::installments::sweep_overdue(&state.pool).await?;

    Ok(success(
        json!({ "swept": swept }),
        "Overdue installments updated",
    ))
}
