use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::models::enums::{InstallmentStatus, PaymentType, TransactionStatus};
use crate::models::installment::PaymentInstallment;
use crate::utils::error::AppError;

pub async fn list_for_transaction(
    pool: &PgPool,
    transaction_id: Uuid,
) -> Result<Vec<PaymentInstallment>, AppError> {
    let installments = sqlx::query_as::<_, PaymentInstallment>(
        "SELECT * FROM payment_installments WHERE transaction_id = $1 ORDER BY seq",
    )
    .bind(transaction_id)
    .fetch_all(pool)
    .await?;

    Ok(installments)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<PaymentInstallment, AppError> {
    sqlx::query_as::<_, PaymentInstallment>("SELECT * FROM payment_installments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Installment was not found".to_string()))
}

/// The buyer attaches a proof-of-payment URL. Only open installments
/// (pending or overdue) accept proofs.
pub async fn attach_proof(
    pool: &PgPool,
    id: Uuid,
    proof_url: &str,
) -> Result<PaymentInstallment, AppError> {
    let mut tx = pool.begin().await?;

    let installment = lock(&mut tx, id).await?;
    if !installment.status.is_open() {
        return Err(AppError::Conflict(format!(
            "A {} installment does not accept payment proofs",
            installment.status
        )));
    }

    let installment = sqlx::query_as::<_, PaymentInstallment>(
        "UPDATE payment_installments
         SET proof_url = $2, review_note = NULL, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(proof_url)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(installment)
}

/// Admin confirms the money arrived. Settling the last open installment of an
/// approved installment-plan purchase opens the ticket download window
/// immediately instead of waiting for the final due date.
pub async fn approve(
    pool: &PgPool,
    id: Uuid,
    admin_id: Uuid,
) -> Result<PaymentInstallment, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let installment = lock(&mut tx, id).await?;
    if !installment.status.is_open() {
        return Err(AppError::Conflict(format!(
            "A {} installment cannot be approved",
            installment.status
        )));
    }

    let installment = sqlx::query_as::<_, PaymentInstallment>(
        "UPDATE payment_installments
         SET status = $2, approved_by = $3, approved_at = $4, updated_at = $4
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(InstallmentStatus::Paid)
    .bind(admin_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let open_left: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM payment_installments
         WHERE transaction_id = $1 AND status IN ($2, $3)",
    )
    .bind(installment.transaction_id)
    .bind(InstallmentStatus::Pending)
    .bind(InstallmentStatus::Overdue)
    .fetch_one(&mut *tx)
    .await?;

    if open_left == 0 {
        sqlx::query(
            "UPDATE ticket_transactions
             SET download_available_at = $2, updated_at = $2
             WHERE id = $1 AND status = $3 AND payment_type = $4",
        )
        .bind(installment.transaction_id)
        .bind(now)
        .bind(TransactionStatus::Approved)
        .bind(PaymentType::Installments)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(installment)
}

/// Admin turns a proof down: the installment goes back to pending with the
/// proof cleared and the reason recorded.
pub async fn reject(
    pool: &PgPool,
    id: Uuid,
    note: Option<&str>,
) -> Result<PaymentInstallment, AppError> {
    let mut tx = pool.begin().await?;

    let installment = lock(&mut tx, id).await?;
    if !installment.status.is_open() {
        return Err(AppError::Conflict(format!(
            "A {} installment cannot be rejected",
            installment.status
        )));
    }

    let installment = sqlx::query_as::<_, PaymentInstallment>(
        "UPDATE payment_installments
         SET proof_url = NULL, status = $2, review_note = $3, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(InstallmentStatus::Pending)
    .bind(note)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(installment)
}

/// Flip every pending installment whose due date has passed to overdue.
/// Returns how many rows were swept.
pub async fn sweep_overdue(pool: &PgPool) -> Result<u64, AppError> {
    let done = sqlx::query(
        "UPDATE payment_installments
         SET status = $1, updated_at = now()
         WHERE status = $2 AND due_date < CURRENT_DATE",
    )
    .bind(InstallmentStatus::Overdue)
    .bind(InstallmentStatus::Pending)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}

async fn lock(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<PaymentInstallment, AppError> {
    sqlx::query_as::<_, PaymentInstallment>(
        "SELECT * FROM payment_installments WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Installment was not found".to_string()))
}
