use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use super::{
    bill_service::bill_from_entity,
    catalogue_service::{load_fabric, load_item},
    client_service::{client_from_entity, load_client},
    documents, ensure_non_negative, from_json, now, to_json, utc,
};
use crate::{
    audit,
    dto::orders::{
        CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems, UpdateOrderRequest,
        UpdatePaymentRequest, UpdateStatusRequest,
    },
    entity::{
        bills::{self, Entity as Bills},
        order_items::{self, Entity as OrderItems},
        orders::{self, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{
        Client, ClientDetails, DiscountType, InvoiceLine, Order, OrderItem, OrderStatus,
        OrderType, PaymentStatus, parse_stored,
    },
    notify::{NotificationJob, dispatcher::share_key},
    pricing::{Discount, LineInput, LineRates, PricedLine, price_line, summarize},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    sequence,
    state::AppState,
};

/// A requested line with its catalogue references resolved and priced.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub request: OrderItemRequest,
    pub item_name: String,
    pub fabric_name: Option<String>,
    pub priced: PricedLine,
}

impl ResolvedLine {
    pub fn to_invoice_line(&self) -> InvoiceLine {
        InvoiceLine {
            item_type_id: self.request.item_type_id,
            item_name: self.item_name.clone(),
            fabric_id: self.request.fabric_id,
            fabric_name: self.fabric_name.clone(),
            fabric_meters: self.request.fabric_meters,
            style: self.request.style.clone(),
            quantity: self.priced.quantity,
            unit_price: self.priced.unit_price,
            fabric_cost: self.priced.fabric_cost,
            stitching_cost: self.priced.stitching_cost,
            alteration: self.priced.alteration,
            handwork: self.priced.handwork,
            other_charges: self.priced.other_charges,
            total_price: self.priced.total_price,
        }
    }
}

/// Resolve every catalogue reference before anything is written, so a
/// missing item type or fabric fails the whole request.
pub async fn resolve_lines(
    state: &AppState,
    order_type: OrderType,
    requests: &[OrderItemRequest],
) -> AppResult<Vec<ResolvedLine>> {
    let mut lines = Vec::with_capacity(requests.len());
    for request in requests {
        ensure_non_negative("fabric_meters", request.fabric_meters)?;
        ensure_non_negative("alteration", request.alteration)?;
        ensure_non_negative("handwork", request.handwork)?;
        ensure_non_negative("other_charges", request.other_charges)?;

        let item = load_item(state, request.item_type_id).await?;
        let fabric = match request.fabric_id {
            Some(fabric_id) => Some(load_fabric(state, fabric_id).await?),
            None => None,
        };

        let input = LineInput {
            quantity: request.quantity,
            fabric_meters: request.fabric_meters,
            alteration: request.alteration,
            handwork: request.handwork,
            other_charges: request.other_charges,
        };
        let rates = LineRates {
            stitching_charge: item.stitching_charge,
            fabric_price_per_meter: fabric.as_ref().map(|f| f.price_per_meter),
        };

        lines.push(ResolvedLine {
            request: request.clone(),
            item_name: item.name,
            fabric_name: fabric.map(|f| f.name),
            priced: price_line(order_type, &input, &rates),
        });
    }
    Ok(lines)
}

pub(crate) fn discount_of(kind: DiscountType, value: Decimal) -> AppResult<Discount> {
    ensure_non_negative("discount_value", value)?;
    if kind == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(
            "percentage discount cannot exceed 100".into(),
        ));
    }
    Ok(Discount { kind, value })
}

pub(crate) fn tax_rate_or_default(
    state: &AppState,
    requested: Option<Decimal>,
) -> AppResult<Decimal> {
    let rate = requested.unwrap_or(state.config.default_tax_rate);
    ensure_non_negative("tax_rate", rate)?;
    if rate > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation("tax_rate must not exceed 100".into()));
    }
    Ok(rate)
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    lines: &[ResolvedLine],
) -> AppResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let style = match &line.request.style {
            Some(style) => Some(to_json(style)?),
            None => None,
        };
        let model = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            position: Set(position as i32),
            item_type_id: Set(line.request.item_type_id),
            item_name: Set(line.item_name.clone()),
            fabric_id: Set(line.request.fabric_id),
            fabric_name: Set(line.fabric_name.clone()),
            fabric_meters: Set(line.request.fabric_meters),
            style: Set(style),
            quantity: Set(line.priced.quantity),
            unit_price: Set(line.priced.unit_price),
            fabric_cost: Set(line.priced.fabric_cost),
            stitching_cost: Set(line.priced.stitching_cost),
            alteration: Set(line.priced.alteration),
            handwork: Set(line.priced.handwork),
            other_charges: Set(line.priced.other_charges),
            total_price: Set(line.priced.total_price),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
        items.push(order_item_from_entity(model)?);
    }
    Ok(items)
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    payload.validate()?;

    // A registered client or an inline snapshot, never both.
    let (client_id, details, snapshot) = match (payload.client_id, payload.client_details) {
        (Some(client_id), None) => {
            let client = load_client(state, user, client_id).await?;
            (Some(client.id), ClientDetails::from(&client), None)
        }
        (None, Some(details)) => {
            let snapshot = to_json(&details)?;
            (None, details, Some(snapshot))
        }
        _ => {
            return Err(AppError::Validation(
                "exactly one of client_id or client_details is required".into(),
            ));
        }
    };

    let lines = resolve_lines(state, payload.order_type, &payload.items).await?;
    let discount = discount_of(payload.discount_type, payload.discount_value)?;
    let tax_rate = tax_rate_or_default(state, payload.tax_rate)?;
    ensure_non_negative("advance_payment", payload.advance_payment)?;

    let totals = summarize(lines.iter().map(|l| &l.priced), discount, tax_rate);
    let order_number = sequence::allocate(
        &state.orm,
        sequence::ORDER_SCOPE,
        sequence::ORDER_PREFIX,
        Utc::now().date_naive(),
    )
    .await?;

    let shipping_details = match &payload.shipping_details {
        Some(shipping) => Some(to_json(shipping)?),
        None => None,
    };

    let txn = state.orm.begin().await?;
    let order_id = Uuid::new_v4();
    let model = orders::ActiveModel {
        id: Set(order_id),
        order_number: Set(order_number),
        branch_id: Set(user.owning_branch(payload.branch_id)),
        client_id: Set(client_id),
        client_details: Set(snapshot),
        order_type: Set(payload.order_type.as_str().to_string()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        // Settled against the advance only when the bill is generated.
        payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
        subtotal: Set(totals.subtotal),
        discount_type: Set(discount.kind.as_str().to_string()),
        discount_value: Set(discount.value),
        discount_amount: Set(totals.discount_amount),
        taxable_amount: Set(totals.taxable_amount),
        tax_rate: Set(totals.tax_rate),
        tax_amount: Set(totals.tax_amount),
        total_amount: Set(totals.total_amount),
        advance_payment: Set(payload.advance_payment),
        shipping_details: Set(shipping_details),
        notes: Set(payload.notes),
        expected_delivery_date: Set(payload.expected_delivery_date),
        actual_delivery_date: Set(None),
        bill_id: Set(None),
        pdf_url: Set(None),
        created_by: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    let items = insert_lines(&txn, order_id, &lines).await?;
    txn.commit().await?;

    let order = order_from_entity(model)?;
    tracing::info!(order_number = %order.order_number, total = %order.total_amount, "order created");

    audit::record(
        &state.orm,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "order_number": order.order_number }),
    )
    .await;

    let document = documents::order_confirmation(&state.config.company, &order, &items, &details);
    state.notifications.enqueue(NotificationJob::OrderPlaced {
        document: Box::new(document),
        branch_id: order.branch_id,
        client_email: details.email.clone(),
        client_mobile: Some(details.mobile.clone()),
    });

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order,
            items,
            bill: None,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = user.branch_condition(orders::Column::BranchId);
    if let Some(status) = query.status {
        condition = condition.add(orders::Column::Status.eq(status.as_str()));
    }
    if let Some(payment_status) = query.payment_status {
        condition = condition.add(orders::Column::PaymentStatus.eq(payment_status.as_str()));
    }
    if let Some(client_id) = query.client_id {
        condition = condition.add(orders::Column::ClientId.eq(client_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(orders::Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(orders::Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Order row visible to `user`, optionally locked for the enclosing transaction.
pub(crate) async fn find_order<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
    lock: bool,
) -> AppResult<orders::Model> {
    let mut finder = Orders::find_by_id(id);
    if lock {
        finder = finder.lock(LockType::Update);
    }
    finder
        .one(conn)
        .await?
        .filter(|o| user.can_access(o.branch_id))
        .ok_or_else(|| AppError::not_found("Order"))
}

pub(crate) async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderItem>> {
    OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect()
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let model = find_order(&state.orm, user, id, false).await?;
    let items = load_items(&state.orm, model.id).await?;
    let bill = match model.bill_id {
        Some(bill_id) => Bills::find_by_id(bill_id)
            .one(&state.orm)
            .await?
            .map(bill_from_entity)
            .transpose()?,
        None => None,
    };

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(model)?,
            items,
            bill,
        },
        None,
    ))
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    payload.validate()?;

    let current = find_order(&state.orm, user, id, false).await?;
    let order_type = parse_stored::<OrderType>(&current.order_type)?;
    // Catalogue lookups happen before the transaction opens.
    let replacement = match &payload.items {
        Some(items) => Some(resolve_lines(state, order_type, items).await?),
        None => None,
    };

    let txn = state.orm.begin().await?;
    let existing = find_order(&txn, user, id, true).await?;
    if existing.bill_id.is_some() {
        return Err(AppError::Conflict(
            "order has already been billed and can no longer be edited".into(),
        ));
    }

    let discount_type = match payload.discount_type {
        Some(kind) => kind,
        None => parse_stored::<DiscountType>(&existing.discount_type)?,
    };
    let discount = discount_of(
        discount_type,
        payload.discount_value.unwrap_or(existing.discount_value),
    )?;
    let tax_rate = match payload.tax_rate {
        Some(rate) => tax_rate_or_default(state, Some(rate))?,
        None => existing.tax_rate,
    };
    let advance = payload.advance_payment.unwrap_or(existing.advance_payment);
    ensure_non_negative("advance_payment", advance)?;

    let items = match &replacement {
        Some(lines) => {
            OrderItems::delete_many()
                .filter(order_items::Column::OrderId.eq(id))
                .exec(&txn)
                .await?;
            insert_lines(&txn, id, lines).await?
        }
        None => load_items(&txn, id).await?,
    };
    let priced: Vec<PricedLine> = items.iter().map(priced_from_item).collect();
    let totals = summarize(&priced, discount, tax_rate);

    let mut active: orders::ActiveModel = existing.into();
    active.discount_type = Set(discount.kind.as_str().to_string());
    active.discount_value = Set(discount.value);
    active.subtotal = Set(totals.subtotal);
    active.discount_amount = Set(totals.discount_amount);
    active.taxable_amount = Set(totals.taxable_amount);
    active.tax_rate = Set(totals.tax_rate);
    active.tax_amount = Set(totals.tax_amount);
    active.total_amount = Set(totals.total_amount);
    active.advance_payment = Set(advance);
    if let Some(shipping) = &payload.shipping_details {
        active.shipping_details = Set(Some(to_json(shipping)?));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(date) = payload.expected_delivery_date {
        active.expected_delivery_date = Set(Some(date));
    }
    active.updated_at = Set(now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_update",
        "orders",
        serde_json::json!({ "order_id": id, "items_replaced": replacement.is_some() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        OrderWithItems {
            order: order_from_entity(model)?,
            items,
            bill: None,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let order = find_order(&txn, user, id, true).await?;
    let bill = Bills::find()
        .filter(bills::Column::OrderId.eq(order.id))
        .one(&txn)
        .await?;

    OrderItems::delete_many()
        .filter(order_items::Column::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Bills::delete_many()
        .filter(bills::Column::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(key) = bill.and_then(|b| b.pdf_public_id) {
        for key in [share_key(&key), key] {
            if let Err(err) = state.dispatcher.delete_pdf(&key).await {
                tracing::warn!(key = %key, error = %err, "bill pdf cleanup failed");
            }
        }
    }

    audit::record(
        &state.orm,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id, "order_number": order.order_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Free-form status write. Re-sending the current status changes nothing.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let existing = find_order(&state.orm, user, id, false).await?;
    if existing.status == payload.status.as_str() {
        return Ok(ApiResponse::success(
            "Unchanged",
            order_from_entity(existing)?,
            Some(Meta::empty()),
        ));
    }

    let previous = existing.status.clone();
    let mut active: orders::ActiveModel = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(now());
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": id, "from": previous, "to": payload.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        order_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

/// Direct payment write; the bill, when one exists, mirrors the status.
pub async fn update_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePaymentRequest,
) -> AppResult<ApiResponse<Order>> {
    if let Some(advance) = payload.advance_payment {
        ensure_non_negative("advance_payment", advance)?;
    }

    let txn = state.orm.begin().await?;
    let existing = find_order(&txn, user, id, true).await?;
    let bill_id = existing.bill_id;

    let mut active: orders::ActiveModel = existing.into();
    active.payment_status = Set(payload.payment_status.as_str().to_string());
    if let Some(advance) = payload.advance_payment {
        active.advance_payment = Set(advance);
    }
    active.updated_at = Set(now());
    let model = active.update(&txn).await?;

    if let Some(bill_id) = bill_id {
        Bills::update_many()
            .col_expr(
                bills::Column::PaymentStatus,
                sea_orm::sea_query::Expr::value(payload.payment_status.as_str()),
            )
            .col_expr(bills::Column::UpdatedAt, sea_orm::sea_query::Expr::value(now()))
            .filter(bills::Column::Id.eq(bill_id))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_payment_update",
        "orders",
        serde_json::json!({ "order_id": id, "payment_status": payload.payment_status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        order_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

/// Customer shown on documents: the inline snapshot, else the registered client.
pub(crate) async fn order_client(state: &AppState, order: &Order) -> AppResult<ClientDetails> {
    if let Some(details) = &order.client_details {
        return Ok(details.clone());
    }
    let client_id = order
        .client_id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order {} has no client", order.id)))?;
    let client: Client = match state.cache.clients().get(&client_id) {
        Some(client) => client,
        None => {
            let client = crate::entity::clients::Entity::find_by_id(client_id)
                .one(&state.orm)
                .await?
                .map(client_from_entity)
                .ok_or_else(|| AppError::not_found("Client"))?;
            state.cache.clients().insert(client_id, client.clone());
            client
        }
    };
    Ok(ClientDetails::from(&client))
}

fn priced_from_item(item: &OrderItem) -> PricedLine {
    PricedLine {
        quantity: item.quantity,
        unit_price: item.unit_price,
        fabric_cost: item.fabric_cost,
        stitching_cost: item.stitching_cost,
        alteration: item.alteration,
        handwork: item.handwork,
        other_charges: item.other_charges,
        total_price: item.total_price,
    }
}

pub(crate) fn order_from_entity(model: orders::Model) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        branch_id: model.branch_id,
        client_id: model.client_id,
        client_details: model.client_details.map(from_json).transpose()?,
        order_type: parse_stored(&model.order_type)?,
        status: parse_stored(&model.status)?,
        payment_status: parse_stored::<PaymentStatus>(&model.payment_status)?,
        subtotal: model.subtotal,
        discount_type: parse_stored(&model.discount_type)?,
        discount_value: model.discount_value,
        discount_amount: model.discount_amount,
        taxable_amount: model.taxable_amount,
        tax_rate: model.tax_rate,
        tax_amount: model.tax_amount,
        total_amount: model.total_amount,
        advance_payment: model.advance_payment,
        shipping_details: model.shipping_details.map(from_json).transpose()?,
        notes: model.notes,
        expected_delivery_date: model.expected_delivery_date,
        actual_delivery_date: model.actual_delivery_date,
        bill_id: model.bill_id,
        pdf_url: model.pdf_url,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn order_item_from_entity(model: order_items::Model) -> AppResult<OrderItem> {
    Ok(OrderItem {
        id: model.id,
        order_id: model.order_id,
        position: model.position,
        item_type_id: model.item_type_id,
        item_name: model.item_name,
        fabric_id: model.fabric_id,
        fabric_name: model.fabric_name,
        fabric_meters: model.fabric_meters,
        style: model.style.map(from_json).transpose()?,
        quantity: model.quantity,
        unit_price: model.unit_price,
        fabric_cost: model.fabric_cost,
        stitching_cost: model.stitching_cost,
        alteration: model.alteration,
        handwork: model.handwork,
        other_charges: model.other_charges,
        total_price: model.total_price,
    })
}
