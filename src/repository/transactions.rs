use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::installments::build_plan;
use crate::models::enums::{
    InstallmentStatus, PaymentMethod, PaymentType, TicketStatus, TransactionStatus,
};
use crate::models::event::{Event, TicketZone};
use crate::models::installment::PaymentInstallment;
use crate::models::transaction::{
    AdminTransactionFilter, CourtesyRequest, CreatePurchaseRequest, NominationRequest,
    PurchaseLine, TicketItem, TicketTransaction, TransactionDetails,
};
use crate::models::user::User;
use crate::utils::error::AppError;
use crate::utils::pagination::ResolvedPage;

/// Cap per zone per purchase, mirroring the box-office limit.
pub const MAX_TICKETS_PER_LINE: u32 = 10;

struct ReservedLine {
    zone_id: Uuid,
    price: Decimal,
    quantity: u32,
}

/// Create a pending purchase: transaction header, one ticket item per seat
/// and, for deferred payments, the installment schedule. Runs in one SQL
/// transaction; zone availability is drawn down under `FOR UPDATE` so
/// concurrent buyers cannot oversell a zone.
pub async fn create_purchase(
    pool: &PgPool,
    buyer: &User,
    req: &CreatePurchaseRequest,
) -> Result<TransactionDetails, AppError> {
    validate_lines(&req.items)?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND published")
        .bind(req.event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Event was not found".to_string()))?;

    if event.starts_at <= now {
        return Err(AppError::Conflict(
            "Ticket sales for this event have closed".to_string(),
        ));
    }

    let mut total = Decimal::ZERO;
    let mut reserved = Vec::with_capacity(req.items.len());

    for line in &req.items {
        let zone = lock_zone(&mut tx, line.zone_id, event.id).await?;
        reserve_seats(&mut tx, &zone, line.quantity).await?;

        total += zone.price * Decimal::from(line.quantity);
        reserved.push(ReservedLine {
            zone_id: zone.id,
            price: zone.price,
            quantity: line.quantity,
        });
    }

    let planned = match req.payment_type {
        PaymentType::Installments => {
            let plan_req = req.installment_plan.as_ref().ok_or_else(|| {
                AppError::ValidationError(
                    "An installment purchase needs an installment plan".to_string(),
                )
            })?;
            build_plan(total, plan_req.count, plan_req.first_due_date, now.date_naive())?
        }
        PaymentType::Full => Vec::new(),
    };

    let transaction = sqlx::query_as::<_, TicketTransaction>(
        "INSERT INTO ticket_transactions
             (id, buyer_id, event_id, total_amount, currency,
              payment_method, payment_type, status, courtesy)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(buyer.id)
    .bind(event.id)
    .bind(total)
    .bind(&buyer.preferred_currency)
    .bind(req.payment_method)
    .bind(req.payment_type)
    .bind(TransactionStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::new();
    for line in &reserved {
        for _ in 0..line.quantity {
            items.push(
                insert_item(
                    &mut tx,
                    transaction.id,
                    line.zone_id,
                    line.price,
                    TicketStatus::Pending,
                )
                .await?,
            );
        }
    }

    let mut installments = Vec::with_capacity(planned.len());
    for plan in &planned {
        let installment = sqlx::query_as::<_, PaymentInstallment>(
            "INSERT INTO payment_installments (id, transaction_id, seq, amount, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(transaction.id)
        .bind(plan.seq)
        .bind(plan.amount)
        .bind(plan.due_date)
        .fetch_one(&mut *tx)
        .await?;
        installments.push(installment);
    }

    tx.commit().await?;

    Ok(TransactionDetails {
        transaction,
        items,
        installments,
    })
}

/// Admin hands out complimentary tickets: a zero-amount transaction that is
/// approved on the spot, with its tickets immediately downloadable once their
/// PDFs are issued.
pub async fn create_courtesy(
    pool: &PgPool,
    admin: &User,
    req: &CourtesyRequest,
) -> Result<TransactionDetails, AppError> {
    validate_lines(&req.items)?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let buyer = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(req.buyer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipient user was not found".to_string()))?;

    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(req.event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Event was not found".to_string()))?;

    if event.starts_at <= now {
        return Err(AppError::Conflict(
            "The event has already started".to_string(),
        ));
    }

    let mut reserved = Vec::with_capacity(req.items.len());
    for line in &req.items {
        let zone = lock_zone(&mut tx, line.zone_id, event.id).await?;
        reserve_seats(&mut tx, &zone, line.quantity).await?;
        reserved.push(ReservedLine {
            zone_id: zone.id,
            price: Decimal::ZERO,
            quantity: line.quantity,
        });
    }

    let transaction = sqlx::query_as::<_, TicketTransaction>(
        "INSERT INTO ticket_transactions
             (id, buyer_id, event_id, total_amount, currency,
              payment_method, payment_type, status, courtesy,
              reviewed_by, reviewed_at, review_note, download_available_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $10, $11, $10)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(buyer.id)
    .bind(event.id)
    .bind(Decimal::ZERO)
    .bind(&buyer.preferred_currency)
    .bind(PaymentMethod::Cash)
    .bind(PaymentType::Full)
    .bind(TransactionStatus::Approved)
    .bind(admin.id)
    .bind(now)
    .bind(req.note.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::new();
    for line in &reserved {
        for _ in 0..line.quantity {
            items.push(
                insert_item(
                    &mut tx,
                    transaction.id,
                    line.zone_id,
                    line.price,
                    TicketStatus::Approved,
                )
                .await?,
            );
        }
    }

    tx.commit().await?;

    Ok(TransactionDetails {
        transaction,
        items,
        installments: Vec::new(),
    })
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<TicketTransaction, AppError> {
    sqlx::query_as::<_, TicketTransaction>("SELECT * FROM ticket_transactions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction was not found".to_string()))
}

pub async fn get_details(pool: &PgPool, id: Uuid) -> Result<TransactionDetails, AppError> {
    let transaction = get(pool, id).await?;

    let items = sqlx::query_as::<_, TicketItem>(
        "SELECT * FROM ticket_items WHERE transaction_id = $1 ORDER BY created_at, id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let installments = sqlx::query_as::<_, PaymentInstallment>(
        "SELECT * FROM payment_installments WHERE transaction_id = $1 ORDER BY seq",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(TransactionDetails {
        transaction,
        items,
        installments,
    })
}

pub async fn list_for_buyer(
    pool: &PgPool,
    buyer_id: Uuid,
) -> Result<Vec<TicketTransaction>, AppError> {
    let transactions = sqlx::query_as::<_, TicketTransaction>(
        "SELECT * FROM ticket_transactions WHERE buyer_id = $1 ORDER BY created_at DESC",
    )
    .bind(buyer_id)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// Paginated admin table with status / payment-type / buyer search filters.
pub async fn admin_list(
    pool: &PgPool,
    filter: &AdminTransactionFilter,
    page: ResolvedPage,
) -> Result<(Vec<TicketTransaction>, i64), AppError> {
    let mut list_query = QueryBuilder::<Postgres>::new(
        "SELECT t.* FROM ticket_transactions t JOIN users u ON u.id = t.buyer_id WHERE TRUE",
    );
    push_filters(&mut list_query, filter);
    list_query
        .push(" ORDER BY t.created_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let transactions = list_query
        .build_query_as::<TicketTransaction>()
        .fetch_all(pool)
        .await?;

    let mut count_query = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM ticket_transactions t JOIN users u ON u.id = t.buyer_id WHERE TRUE",
    );
    push_filters(&mut count_query, filter);

    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    Ok((transactions, total))
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &AdminTransactionFilter) {
    if let Some(status) = filter.status {
        query.push(" AND t.status = ").push_bind(status);
    }
    if let Some(payment_type) = filter.payment_type {
        query.push(" AND t.payment_type = ").push_bind(payment_type);
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" AND (u.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.display_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Approve a pending purchase. Every pending ticket item follows the
/// transaction, and the download window opens depending on how the purchase
/// is paid: immediately after the delay for full payments, at the final due
/// date for installment plans.
pub async fn approve(
    pool: &PgPool,
    id: Uuid,
    admin: &User,
    note: Option<&str>,
    download_delay_days: i64,
) -> Result<TransactionDetails, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let transaction = lock_transaction(&mut tx, id).await?;
    require_pending(&transaction)?;

    let download_available_at = if transaction.courtesy {
        now
    } else {
        match transaction.payment_type {
            PaymentType::Full => now + Duration::days(download_delay_days),
            PaymentType::Installments => {
                let last_due: Option<NaiveDate> = sqlx::query_scalar(
                    "SELECT MAX(due_date) FROM payment_installments WHERE transaction_id = $1",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                last_due
                    .map(|d| d.and_time(NaiveTime::MIN).and_utc())
                    .unwrap_or(now)
            }
        }
    };

    sqlx::query(
        "UPDATE ticket_transactions
         SET status = $2, reviewed_by = $3, reviewed_at = $4,
             review_note = $5, download_available_at = $6, updated_at = $4
         WHERE id = $1",
    )
    .bind(id)
    .bind(TransactionStatus::Approved)
    .bind(admin.id)
    .bind(now)
    .bind(note)
    .bind(download_available_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE ticket_items SET status = $2, updated_at = now()
         WHERE transaction_id = $1 AND status = $3",
    )
    .bind(id)
    .bind(TicketStatus::Approved)
    .bind(TicketStatus::Pending)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_details(pool, id).await
}

/// Reject a pending purchase: the transaction, every non-used ticket item and
/// every open installment are closed in one SQL transaction, and the seats go
/// back on sale.
pub async fn reject(
    pool: &PgPool,
    id: Uuid,
    admin: &User,
    note: Option<&str>,
) -> Result<TransactionDetails, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let transaction = lock_transaction(&mut tx, id).await?;
    require_pending(&transaction)?;

    sqlx::query(
        "UPDATE ticket_transactions
         SET status = $2, reviewed_by = $3, reviewed_at = $4,
             review_note = $5, updated_at = $4
         WHERE id = $1",
    )
    .bind(id)
    .bind(TransactionStatus::Rejected)
    .bind(admin.id)
    .bind(now)
    .bind(note)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE ticket_items SET status = $2, updated_at = now()
         WHERE transaction_id = $1 AND status <> $3",
    )
    .bind(id)
    .bind(TicketStatus::Cancelled)
    .bind(TicketStatus::Used)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE payment_installments SET status = $2, updated_at = now()
         WHERE transaction_id = $1 AND status IN ($3, $4)",
    )
    .bind(id)
    .bind(InstallmentStatus::Cancelled)
    .bind(InstallmentStatus::Pending)
    .bind(InstallmentStatus::Overdue)
    .execute(&mut *tx)
    .await?;

    // seats go back on sale
    sqlx::query(
        "UPDATE ticket_zones z
         SET available_quantity = LEAST(z.total_quantity, z.available_quantity + sub.cnt),
             updated_at = now()
         FROM (SELECT zone_id, COUNT(*)::int AS cnt
               FROM ticket_items WHERE transaction_id = $1 GROUP BY zone_id) sub
         WHERE z.id = sub.zone_id",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_details(pool, id).await
}

/// Assign a named attendee to one ticket of a purchase. The ticket must
/// belong to the given transaction; nomination closes when the event starts.
pub async fn nominate(
    pool: &PgPool,
    transaction_id: Uuid,
    ticket_id: Uuid,
    req: &NominationRequest,
) -> Result<TicketItem, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let item = sqlx::query_as::<_, TicketItem>(
        "SELECT * FROM ticket_items WHERE id = $1 AND transaction_id = $2 FOR UPDATE",
    )
    .bind(ticket_id)
    .bind(transaction_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Ticket was not found in this purchase".to_string()))?;

    if matches!(item.status, TicketStatus::Cancelled | TicketStatus::Used) {
        return Err(AppError::Conflict(format!(
            "A {} ticket cannot be nominated",
            item.status
        )));
    }

    let starts_at: DateTime<Utc> = sqlx::query_scalar(
        "SELECT e.starts_at FROM events e
         JOIN ticket_transactions t ON t.event_id = e.id
         WHERE t.id = $1",
    )
    .bind(transaction_id)
    .fetch_one(&mut *tx)
    .await?;

    if now >= starts_at {
        return Err(AppError::Conflict(
            "The event has already started".to_string(),
        ));
    }

    let item = sqlx::query_as::<_, TicketItem>(
        "UPDATE ticket_items
         SET attendee_name = $2, attendee_document = $3, nominated_at = $4, updated_at = $4
         WHERE id = $1
         RETURNING *",
    )
    .bind(item.id)
    .bind(&req.attendee_name)
    .bind(&req.attendee_document)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(item)
}

/// Record the issued PDF for a ticket.
pub async fn set_item_pdf(
    pool: &PgPool,
    ticket_id: Uuid,
    pdf_url: &str,
) -> Result<TicketItem, AppError> {
    sqlx::query_as::<_, TicketItem>(
        "UPDATE ticket_items SET pdf_url = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(ticket_id)
    .bind(pdf_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Ticket was not found".to_string()))
}

/// Transaction header plus one of its tickets, for the download gate.
pub async fn get_item(
    pool: &PgPool,
    transaction_id: Uuid,
    ticket_id: Uuid,
) -> Result<(TicketTransaction, TicketItem), AppError> {
    let transaction = get(pool, transaction_id).await?;

    let item = sqlx::query_as::<_, TicketItem>(
        "SELECT * FROM ticket_items WHERE id = $1 AND transaction_id = $2",
    )
    .bind(ticket_id)
    .bind(transaction_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Ticket was not found in this purchase".to_string()))?;

    Ok((transaction, item))
}

fn validate_lines(lines: &[PurchaseLine]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::ValidationError(
            "A purchase needs at least one ticket".to_string(),
        ));
    }
    for line in lines {
        if line.quantity == 0 || line.quantity > MAX_TICKETS_PER_LINE {
            return Err(AppError::ValidationError(format!(
                "Quantity per zone must be between 1 and {MAX_TICKETS_PER_LINE}"
            )));
        }
    }
    Ok(())
}

async fn lock_zone(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    zone_id: Uuid,
    event_id: Uuid,
) -> Result<TicketZone, AppError> {
    sqlx::query_as::<_, TicketZone>(
        "SELECT * FROM ticket_zones WHERE id = $1 AND event_id = $2 FOR UPDATE",
    )
    .bind(zone_id)
    .bind(event_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Ticket zone was not found for this event".to_string()))
}

async fn reserve_seats(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    zone: &TicketZone,
    quantity: u32,
) -> Result<(), AppError> {
    let done = sqlx::query(
        "UPDATE ticket_zones
         SET available_quantity = available_quantity - $2, updated_at = now()
         WHERE id = $1 AND available_quantity >= $2",
    )
    .bind(zone.id)
    .bind(quantity as i32)
    .execute(&mut **tx)
    .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Not enough tickets left in zone '{}'",
            zone.name
        )));
    }

    Ok(())
}

async fn insert_item(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    transaction_id: Uuid,
    zone_id: Uuid,
    price: Decimal,
    status: TicketStatus,
) -> Result<TicketItem, AppError> {
    let item = sqlx::query_as::<_, TicketItem>(
        "INSERT INTO ticket_items (id, transaction_id, zone_id, price, status)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(transaction_id)
    .bind(zone_id)
    .bind(price)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;

    Ok(item)
}

async fn lock_transaction(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<TicketTransaction, AppError> {
    sqlx::query_as::<_, TicketTransaction>(
        "SELECT * FROM ticket_transactions WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Transaction was not found".to_string()))
}

fn require_pending(transaction: &TicketTransaction) -> Result<(), AppError> {
    if transaction.status != TransactionStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Transaction has already been {}",
            transaction.status
        )));
    }
    Ok(())
}
