use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use super::{
    documents, ensure_non_negative, from_json, now,
    order_service::{discount_of, resolve_lines, tax_rate_or_default},
    to_json, utc, write_error,
};
use crate::{
    audit,
    dto::{
        orders::OrderItemRequest,
        pending_orders::{
            BillPendingOrderRequest, CreatePendingOrderRequest, InvoiceList, PendingOrderList,
            RecordPaymentRequest,
        },
    },
    entity::{
        invoices::{self, Entity as Invoices},
        pending_orders::{self, Entity as PendingOrders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Invoice, InvoiceLine, PendingOrder, PendingOrderStatus, parse_stored},
    pricing::{settle, summarize},
    response::{ApiResponse, Meta},
    routes::params::{PaymentQuery, PendingOrderQuery},
    sequence,
    state::AppState,
};

pub async fn create_pending_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePendingOrderRequest,
) -> AppResult<ApiResponse<PendingOrder>> {
    payload.validate()?;

    let model = pending_orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        branch_id: Set(user.owning_branch(payload.branch_id)),
        customer: Set(to_json(&payload.customer)?),
        order_type: Set(payload.order_type.as_str().to_string()),
        items: Set(to_json(&payload.items)?),
        master_name: Set(payload.master_name),
        salesman_name: Set(payload.salesman_name),
        notes: Set(payload.notes),
        status: Set(PendingOrderStatus::Pending.as_str().to_string()),
        expires_at: Set(now() + Duration::hours(state.config.pending_order_ttl_hours)),
        invoice_id: Set(None),
        created_by: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "pending_order_create",
        "pending_orders",
        serde_json::json!({ "pending_order_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Pending order created",
        pending_order_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

/// Mark every pending row past its expiry as expired.
pub async fn expire_stale(orm: &DatabaseConnection) -> AppResult<u64> {
    let result = PendingOrders::update_many()
        .col_expr(
            pending_orders::Column::Status,
            Expr::value(PendingOrderStatus::Expired.as_str()),
        )
        .col_expr(pending_orders::Column::UpdatedAt, Expr::value(now()))
        .filter(pending_orders::Column::Status.eq(PendingOrderStatus::Pending.as_str()))
        .filter(pending_orders::Column::ExpiresAt.lte(now()))
        .exec(orm)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(expired = result.rows_affected, "pending orders expired");
    }
    Ok(result.rows_affected)
}

pub async fn list_pending_orders(
    state: &AppState,
    user: &AuthUser,
    query: PendingOrderQuery,
) -> AppResult<ApiResponse<PendingOrderList>> {
    expire_stale(&state.orm).await?;

    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = user.branch_condition(pending_orders::Column::BranchId);
    if let Some(status) = query.status {
        condition = condition.add(pending_orders::Column::Status.eq(status.as_str()));
    }

    let finder = PendingOrders::find()
        .filter(condition)
        .order_by_desc(pending_orders::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(pending_order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Pending orders",
        PendingOrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn find_pending(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<pending_orders::Model> {
    PendingOrders::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|p| user.can_access(p.branch_id))
        .ok_or_else(|| AppError::not_found("Pending order"))
}

pub async fn get_pending_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PendingOrder>> {
    let model = find_pending(state, user, id).await?;
    Ok(ApiResponse::success(
        "Pending order",
        pending_order_from_entity(model)?,
        None,
    ))
}

pub async fn delete_pending_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_pending(state, user, id).await?;
    if existing.status == PendingOrderStatus::Billed.as_str() {
        return Err(AppError::Conflict(
            "pending order has been billed and cannot be deleted".into(),
        ));
    }

    PendingOrders::delete_by_id(existing.id)
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "pending_order_delete",
        "pending_orders",
        serde_json::json!({ "pending_order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Price a pending order and turn it into an invoice.
pub async fn bill_pending_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: BillPendingOrderRequest,
) -> AppResult<ApiResponse<Invoice>> {
    let pending = find_pending(state, user, id).await?;
    let order_type = parse_stored(&pending.order_type)?;
    let requests: Vec<OrderItemRequest> = from_json(pending.items.clone())?;
    let lines = resolve_lines(state, order_type, &requests).await?;

    let discount = discount_of(payload.discount_type, payload.discount_value)?;
    let tax_rate = tax_rate_or_default(state, payload.tax_rate)?;
    ensure_non_negative("paid_amount", payload.paid_amount)?;
    let totals = summarize(lines.iter().map(|l| &l.priced), discount, tax_rate);
    let settlement = settle(totals.total_amount, payload.paid_amount);
    let invoice_lines: Vec<InvoiceLine> = lines.iter().map(|l| l.to_invoice_line()).collect();

    let txn = state.orm.begin().await?;
    let locked = PendingOrders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Pending order"))?;
    if locked.status != PendingOrderStatus::Pending.as_str() {
        return Err(AppError::Conflict(format!(
            "pending order is {} and cannot be billed",
            locked.status
        )));
    }
    if locked.expires_at <= now() {
        return Err(AppError::Conflict("pending order has expired".into()));
    }

    let invoice_number = sequence::allocate(
        &state.orm,
        sequence::INVOICE_SCOPE,
        sequence::INVOICE_PREFIX,
        Utc::now().date_naive(),
    )
    .await?;

    let invoice = invoices::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_number: Set(invoice_number),
        pending_order_id: Set(Some(locked.id)),
        branch_id: Set(locked.branch_id),
        customer: Set(locked.customer.clone()),
        order_type: Set(locked.order_type.clone()),
        items: Set(to_json(&invoice_lines)?),
        subtotal: Set(totals.subtotal),
        discount_type: Set(discount.kind.as_str().to_string()),
        discount_value: Set(discount.value),
        discount_amount: Set(totals.discount_amount),
        taxable_amount: Set(totals.taxable_amount),
        tax_rate: Set(totals.tax_rate),
        tax_amount: Set(totals.tax_amount),
        total_amount: Set(totals.total_amount),
        paid_amount: Set(settlement.paid_amount),
        balance_amount: Set(settlement.pending_amount),
        payment_status: Set(settlement.payment_status.as_str().to_string()),
        notes: Set(payload.notes.or_else(|| locked.notes.clone())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| write_error(e, "pending order has already been billed"))?;

    let mut active: pending_orders::ActiveModel = locked.into();
    active.status = Set(PendingOrderStatus::Billed.as_str().to_string());
    active.invoice_id = Set(Some(invoice.id));
    active.updated_at = Set(now());
    active.update(&txn).await?;
    txn.commit().await?;

    let invoice = invoice_from_entity(invoice)?;
    tracing::info!(
        invoice_number = %invoice.invoice_number,
        total = %invoice.total_amount,
        "pending order billed"
    );

    audit::record(
        &state.orm,
        user.user_id,
        "pending_order_bill",
        "invoices",
        serde_json::json!({ "pending_order_id": id, "invoice_id": invoice.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Invoice created",
        invoice,
        Some(Meta::empty()),
    ))
}

pub async fn list_invoices(
    state: &AppState,
    user: &AuthUser,
    query: PaymentQuery,
) -> AppResult<ApiResponse<InvoiceList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = user.branch_condition(invoices::Column::BranchId);
    if let Some(payment_status) = query.payment_status {
        condition = condition.add(invoices::Column::PaymentStatus.eq(payment_status.as_str()));
    }

    let finder = Invoices::find()
        .filter(condition)
        .order_by_desc(invoices::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(invoice_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Invoices",
        InvoiceList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn find_invoice(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<invoices::Model> {
    Invoices::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|i| user.can_access(i.branch_id))
        .ok_or_else(|| AppError::not_found("Invoice"))
}

pub async fn get_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Invoice>> {
    let model = find_invoice(state, user, id).await?;
    Ok(ApiResponse::success("Invoice", invoice_from_entity(model)?, None))
}

/// Credit a payment against the invoice and recompute its balance.
pub async fn record_invoice_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RecordPaymentRequest,
) -> AppResult<ApiResponse<Invoice>> {
    if payload.amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "payment amount must be greater than zero".into(),
        ));
    }
    // Visibility check before taking the row lock.
    find_invoice(state, user, id).await?;

    let txn = state.orm.begin().await?;
    let existing = Invoices::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice"))?;

    let settlement = settle(existing.total_amount, existing.paid_amount + payload.amount);
    let mut active: invoices::ActiveModel = existing.into();
    active.paid_amount = Set(settlement.paid_amount);
    active.balance_amount = Set(settlement.pending_amount);
    active.payment_status = Set(settlement.payment_status.as_str().to_string());
    active.updated_at = Set(now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "invoice_payment",
        "invoices",
        serde_json::json!({ "invoice_id": id, "amount": payload.amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment recorded",
        invoice_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

/// Rendered invoice PDF as `(filename, bytes)`.
pub async fn invoice_pdf(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<(String, std::sync::Arc<Vec<u8>>)> {
    let invoice = invoice_from_entity(find_invoice(state, user, id).await?)?;
    let document = documents::invoice_document(&state.config.company, &invoice);
    let filename = document.file_name();
    let pdf = documents::render(state, document).await?;
    Ok((filename, pdf))
}

pub(crate) fn pending_order_from_entity(model: pending_orders::Model) -> AppResult<PendingOrder> {
    Ok(PendingOrder {
        id: model.id,
        branch_id: model.branch_id,
        customer: from_json(model.customer)?,
        order_type: parse_stored(&model.order_type)?,
        items: model.items,
        master_name: model.master_name,
        salesman_name: model.salesman_name,
        notes: model.notes,
        status: parse_stored(&model.status)?,
        expires_at: utc(model.expires_at),
        invoice_id: model.invoice_id,
        created_at: utc(model.created_at),
    })
}

pub(crate) fn invoice_from_entity(model: invoices::Model) -> AppResult<Invoice> {
    Ok(Invoice {
        id: model.id,
        invoice_number: model.invoice_number,
        pending_order_id: model.pending_order_id,
        branch_id: model.branch_id,
        customer: from_json(model.customer)?,
        order_type: parse_stored(&model.order_type)?,
        items: from_json(model.items)?,
        subtotal: model.subtotal,
        discount_type: parse_stored(&model.discount_type)?,
        discount_value: model.discount_value,
        discount_amount: model.discount_amount,
        taxable_amount: model.taxable_amount,
        tax_rate: model.tax_rate,
        tax_amount: model.tax_amount,
        total_amount: model.total_amount,
        paid_amount: model.paid_amount,
        balance_amount: model.balance_amount,
        payment_status: parse_stored(&model.payment_status)?,
        notes: model.notes,
        created_at: utc(model.created_at),
    })
}
