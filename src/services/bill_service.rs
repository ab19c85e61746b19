use std::sync::Arc;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{
    documents,
    now,
    order_service::{find_order, load_items, order_client, order_from_entity},
    utc, write_error,
};
use crate::{
    audit,
    dto::bills::{BillGenerated, BillList, GenerateBillRequest},
    entity::{
        bills::{self, Entity as Bills},
        orders::{self, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Bill, ClientDetails, Order, OrderStatus, PaymentStatus, parse_stored},
    notify::{Delivery, NotificationJob},
    pdf::format_inr,
    pricing::settle,
    response::{ApiResponse, Meta},
    routes::params::PaymentQuery,
    sequence,
    state::AppState,
};

pub async fn generate_bill(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: GenerateBillRequest,
) -> AppResult<ApiResponse<BillGenerated>> {
    let txn = state.orm.begin().await?;
    let order = find_order(&txn, user, order_id, true).await?;
    if order.bill_id.is_some() {
        return Err(AppError::Conflict("bill already generated for this order".into()));
    }

    let bill_number = sequence::allocate(
        &state.orm,
        sequence::BILL_SCOPE,
        sequence::BILL_PREFIX,
        Utc::now().date_naive(),
    )
    .await?;
    let settlement = settle(order.total_amount, order.advance_payment);

    let bill = bills::ActiveModel {
        id: Set(Uuid::new_v4()),
        bill_number: Set(bill_number),
        order_id: Set(order.id),
        branch_id: Set(order.branch_id),
        bill_date: Set(now()),
        due_date: Set(payload.due_date),
        subtotal: Set(order.subtotal),
        discount_amount: Set(order.discount_amount),
        taxable_amount: Set(order.taxable_amount),
        tax_rate: Set(order.tax_rate),
        tax_amount: Set(order.tax_amount),
        total_amount: Set(order.total_amount),
        paid_amount: Set(settlement.paid_amount),
        pending_amount: Set(settlement.pending_amount),
        payment_status: Set(settlement.payment_status.as_str().to_string()),
        notes: Set(payload.notes),
        pdf_url: Set(None),
        pdf_public_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| write_error(e, "bill already generated for this order"))?;

    let delivered_on = order
        .actual_delivery_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let mut active: orders::ActiveModel = order.into();
    active.bill_id = Set(Some(bill.id));
    active.status = Set(OrderStatus::Completed.as_str().to_string());
    active.payment_status = Set(settlement.payment_status.as_str().to_string());
    active.actual_delivery_date = Set(Some(delivered_on));
    active.updated_at = Set(now());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    let order = order_from_entity(order)?;
    let bill = bill_from_entity(bill)?;
    tracing::info!(
        bill_number = %bill.bill_number,
        order_number = %order.order_number,
        total = %bill.total_amount,
        "bill generated"
    );

    audit::record(
        &state.orm,
        user.user_id,
        "bill_generate",
        "bills",
        serde_json::json!({ "bill_id": bill.id, "order_id": order.id }),
    )
    .await;

    // The bill is committed; a rendering or upload failure surfaces here
    // and is recovered through `regenerate_pdf`.
    let generated = publish_pdf(state, order, bill).await?;
    Ok(ApiResponse::success(
        "Bill generated",
        generated,
        Some(Meta::empty()),
    ))
}

/// Re-render and re-upload the PDF of an existing bill.
pub async fn regenerate_pdf(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
) -> AppResult<ApiResponse<BillGenerated>> {
    let bill = find_bill(state, user, bill_id).await?;
    let order = Orders::find_by_id(bill.order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let generated = publish_pdf(state, order_from_entity(order)?, bill_from_entity(bill)?).await?;
    Ok(ApiResponse::success(
        "Bill PDF regenerated",
        generated,
        Some(Meta::empty()),
    ))
}

/// Renders and uploads the bill. The client is sent the bill only on its first
/// successful upload; later re-renders just replace the stored file.
async fn publish_pdf(state: &AppState, mut order: Order, mut bill: Bill) -> AppResult<BillGenerated> {
    let first_upload = bill.pdf_url.is_none();
    let items = load_items(&state.orm, order.id).await?;
    let client = order_client(state, &order).await?;
    let document = documents::bill_document(&state.config.company, &order, &items, &client, &bill);
    let filename = document.file_name();
    let pdf = documents::render(state, document).await?;

    let key = format!("bills/{filename}");
    let stored = state.dispatcher.upload_pdf(&key, &pdf).await?;

    Bills::update_many()
        .col_expr(bills::Column::PdfUrl, Expr::value(stored.url.clone()))
        .col_expr(bills::Column::PdfPublicId, Expr::value(stored.key.clone()))
        .col_expr(bills::Column::UpdatedAt, Expr::value(now()))
        .filter(bills::Column::Id.eq(bill.id))
        .exec(&state.orm)
        .await?;
    Orders::update_many()
        .col_expr(orders::Column::PdfUrl, Expr::value(stored.url.clone()))
        .col_expr(orders::Column::UpdatedAt, Expr::value(now()))
        .filter(orders::Column::Id.eq(order.id))
        .exec(&state.orm)
        .await?;
    bill.pdf_url = Some(stored.url.clone());
    bill.pdf_public_id = Some(stored.key.clone());
    order.pdf_url = Some(stored.url.clone());

    if !first_upload {
        tracing::debug!(bill_number = %bill.bill_number, "bill re-rendered, delivery skipped");
    } else if let Some(delivery) =
        bill_delivery(&order, &bill, &client, key, filename, pdf.clone())
    {
        state
            .notifications
            .enqueue(NotificationJob::BillIssued { delivery });
    }

    Ok(BillGenerated {
        order,
        bill,
        pdf_url: Some(stored.url),
        pdf_size: pdf.len(),
    })
}

fn bill_delivery(
    order: &Order,
    bill: &Bill,
    client: &ClientDetails,
    key: String,
    filename: String,
    pdf: Arc<Vec<u8>>,
) -> Option<Delivery> {
    let emails: Vec<String> = client.email.iter().cloned().collect();
    let whatsapp_to = Some(client.mobile.clone()).filter(|m| !m.trim().is_empty());
    if emails.is_empty() && whatsapp_to.is_none() {
        return None;
    }

    Some(Delivery {
        key,
        filename,
        pdf,
        subject: format!("Bill {} for order {}", bill.bill_number, order.order_number),
        html: format!(
            "<p>Dear {},</p><p>Please find attached bill <strong>{}</strong> for order {}.</p>\
             <p>Total: {}<br>Paid: {}<br>Balance: {}</p>",
            client.name,
            bill.bill_number,
            order.order_number,
            format_inr(bill.total_amount),
            format_inr(bill.paid_amount),
            format_inr(bill.pending_amount),
        ),
        emails,
        whatsapp_to,
        whatsapp_params: vec![
            client.name.clone(),
            bill.bill_number.clone(),
            format_inr(bill.total_amount),
        ],
    })
}

pub async fn list_bills(
    state: &AppState,
    user: &AuthUser,
    query: PaymentQuery,
) -> AppResult<ApiResponse<BillList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = user.branch_condition(bills::Column::BranchId);
    if let Some(payment_status) = query.payment_status {
        condition = condition.add(bills::Column::PaymentStatus.eq(payment_status.as_str()));
    }

    let finder = Bills::find()
        .filter(condition)
        .order_by_desc(bills::Column::BillDate);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(bill_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Bills",
        BillList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn find_bill(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<bills::Model> {
    Bills::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|b| user.can_access(b.branch_id))
        .ok_or_else(|| AppError::not_found("Bill"))
}

pub async fn get_bill(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Bill>> {
    let bill = find_bill(state, user, id).await?;
    Ok(ApiResponse::success("Bill", bill_from_entity(bill)?, None))
}

pub(crate) fn bill_from_entity(model: bills::Model) -> AppResult<Bill> {
    Ok(Bill {
        id: model.id,
        bill_number: model.bill_number,
        order_id: model.order_id,
        branch_id: model.branch_id,
        bill_date: utc(model.bill_date),
        due_date: model.due_date,
        subtotal: model.subtotal,
        discount_amount: model.discount_amount,
        taxable_amount: model.taxable_amount,
        tax_rate: model.tax_rate,
        tax_amount: model.tax_amount,
        total_amount: model.total_amount,
        paid_amount: model.paid_amount,
        pending_amount: model.pending_amount,
        payment_status: parse_stored::<PaymentStatus>(&model.payment_status)?,
        notes: model.notes,
        pdf_url: model.pdf_url,
        pdf_public_id: model.pdf_public_id,
        created_at: utc(model.created_at),
    })
}
