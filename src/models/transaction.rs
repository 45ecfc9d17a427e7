use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::enums::{PaymentMethod, PaymentType, TicketStatus, TransactionStatus};
use super::installment::PaymentInstallment;

/// One ticket purchase: the header row the items and installments hang off.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketTransaction {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub event_id: Uuid,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_type: PaymentType,
    pub status: TransactionStatus,
    pub courtesy: bool,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub download_available_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One physical ticket within a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub zone_id: Uuid,
    pub price: Decimal,
    pub status: TicketStatus,
    pub attendee_name: Option<String>,
    pub attendee_document: Option<String>,
    pub nominated_at: Option<DateTime<Utc>>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: TicketTransaction,
    pub items: Vec<TicketItem>,
    pub installments: Vec<PaymentInstallment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseLine {
    pub zone_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallmentPlanRequest {
    pub count: u32,
    pub first_due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub event_id: Uuid,
    pub items: Vec<PurchaseLine>,
    pub payment_method: PaymentMethod,
    pub payment_type: PaymentType,
    /// Required when `payment_type` is `installments`, ignored otherwise.
    pub installment_plan: Option<InstallmentPlanRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CourtesyRequest {
    pub buyer_id: Uuid,
    pub event_id: Uuid,
    pub items: Vec<PurchaseLine>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NominationRequest {
    pub attendee_name: String,
    pub attendee_document: String,
}

#[derive(Debug, Deserialize)]
pub struct TicketPdfRequest {
    pub pdf_url: String,
}

/// Filters for the admin transaction table. `search` matches buyer email or
/// display name.
#[derive(Debug, Deserialize)]
pub struct AdminTransactionFilter {
    pub status: Option<TransactionStatus>,
    pub payment_type: Option<PaymentType>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl AdminTransactionFilter {
    pub fn page_params(&self) -> crate::utils::pagination::PageParams {
        crate::utils::pagination::PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
