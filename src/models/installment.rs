use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::enums::InstallmentStatus;

/// One scheduled partial payment of an installment-plan purchase.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentInstallment {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub seq: i32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub proof_url: Option<String>,
    pub review_note: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ProofRequest {
    pub proof_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectInstallmentRequest {
    pub note: Option<String>,
}
