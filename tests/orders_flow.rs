mod common;

use jmd_backoffice_api::{
    dto::{
        bills::GenerateBillRequest,
        catalogue::{CreateBranchRequest, CreateFabricRequest, CreateItemRequest},
        orders::{CreateOrderRequest, OrderItemRequest, UpdateOrderRequest, UpdateStatusRequest},
        pending_orders::{BillPendingOrderRequest, CreatePendingOrderRequest, RecordPaymentRequest},
    },
    db::raw_pool,
    entity::Orders,
    error::AppError,
    middleware::auth::AuthUser,
    models::{
        ClientDetails, DiscountType, FabricType, ItemStyle, OrderStatus, OrderType, PaymentStatus,
        PendingOrderStatus, Role,
    },
    routes::params::{OrderListQuery, PaymentQuery},
    services::{bill_service, catalogue_service, order_service, pending_order_service},
    state::AppState,
};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

struct Catalogue {
    branch_a: Uuid,
    branch_b: Uuid,
    shirt: Uuid,
    cotton: Uuid,
}

async fn seed_catalogue(state: &AppState, director: &AuthUser) -> anyhow::Result<Catalogue> {
    let branch = |name: &str, code: &str| CreateBranchRequest {
        name: name.into(),
        code: code.into(),
        address: None,
        phone: None,
    };
    let branch_a = catalogue_service::create_branch(state, director, branch("Andheri", "AND"))
        .await?
        .data
        .expect("branch");
    let branch_b = catalogue_service::create_branch(state, director, branch("Bandra", "BAN"))
        .await?
        .data
        .expect("branch");

    let cotton = catalogue_service::create_fabric(
        state,
        director,
        CreateFabricRequest {
            name: "Egyptian Cotton".into(),
            fabric_type: FabricType::Cotton,
            color: Some("White".into()),
            price_per_meter: dec!(300),
            in_stock_meters: dec!(100),
        },
    )
    .await?
    .data
    .expect("fabric");

    let shirt = catalogue_service::create_item(
        state,
        director,
        CreateItemRequest {
            name: "Shirt".into(),
            stitching_charge: dec!(500),
            category: Some("Upper".into()),
            styles: vec![ItemStyle {
                style_id: None,
                style_name: "Slim fit".into(),
                description: None,
            }],
        },
    )
    .await?
    .data
    .expect("item");

    Ok(Catalogue {
        branch_a: branch_a.id,
        branch_b: branch_b.id,
        shirt: shirt.id,
        cotton: cotton.id,
    })
}

fn customer() -> ClientDetails {
    ClientDetails {
        name: "Asha Rao".into(),
        mobile: "9876543210".into(),
        email: Some("asha@example.com".into()),
        address: Some("12 MG Road".into()),
        city: Some("Pune".into()),
        state: Some("Maharashtra".into()),
        pincode: Some("411001".into()),
        gstin: None,
    }
}

fn shirt_line(catalogue: &Catalogue) -> OrderItemRequest {
    OrderItemRequest {
        item_type_id: catalogue.shirt,
        fabric_id: Some(catalogue.cotton),
        fabric_meters: dec!(1.5),
        style: None,
        quantity: 1,
        alteration: dec!(0),
        handwork: dec!(0),
        other_charges: dec!(0),
    }
}

fn order_request(catalogue: &Catalogue) -> CreateOrderRequest {
    CreateOrderRequest {
        branch_id: None,
        client_id: None,
        client_details: Some(customer()),
        order_type: OrderType::Stitching,
        items: vec![shirt_line(catalogue)],
        discount_type: DiscountType::Percentage,
        discount_value: dec!(10),
        tax_rate: None,
        advance_payment: dec!(500),
        shipping_details: None,
        notes: Some("Collar stiffener".into()),
        expected_delivery_date: None,
    }
}

// Order intake -> bill with PDF -> billed order is frozen; branch staff only see their branch.
#[tokio::test]
async fn order_bill_and_branch_scoping_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let app = common::setup_app(&database_url).await?;
    let state = app.state.clone();

    let director = common::create_user(&state, Role::Director, "director@jmd.test", None).await?;
    let catalogue = seed_catalogue(&state, &director).await?;
    let staff_a =
        common::create_user(&state, Role::Staff, "a@jmd.test", Some(catalogue.branch_a)).await?;
    let staff_b =
        common::create_user(&state, Role::Staff, "b@jmd.test", Some(catalogue.branch_b)).await?;

    // Both-or-neither client input is rejected
    let mut neither = order_request(&catalogue);
    neither.client_details = None;
    let result = order_service::create_order(&state, &staff_a, neither).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let created = order_service::create_order(&state, &staff_a, order_request(&catalogue))
        .await?
        .data
        .expect("order");
    let order = created.order;
    assert!(order.order_number.starts_with("JMD-ORD-"));
    assert_eq!(order.branch_id, Some(catalogue.branch_a));
    assert_eq!(order.subtotal, dec!(950));
    assert_eq!(order.discount_amount, dec!(95));
    assert_eq!(order.tax_rate, dec!(18));
    assert_eq!(order.tax_amount, dec!(153.90));
    assert_eq!(order.total_amount, dec!(1008.90));
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].total_price, dec!(950));

    // Another branch cannot see or fetch it
    let listed = order_service::list_orders(&state, &staff_b, OrderListQuery::default())
        .await?
        .data
        .expect("list");
    assert!(listed.items.is_empty());
    let result = order_service::get_order(&state, &staff_b, order.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let listed = order_service::list_orders(&state, &director, OrderListQuery::default())
        .await?
        .data
        .expect("list");
    assert_eq!(listed.items.len(), 1);

    // Re-sending the current status is a no-op
    let unchanged = order_service::update_status(
        &state,
        &staff_a,
        order.id,
        UpdateStatusRequest {
            status: OrderStatus::Pending,
        },
    )
    .await?;
    assert_eq!(unchanged.message, "Unchanged");

    let generated = bill_service::generate_bill(
        &state,
        &staff_a,
        order.id,
        GenerateBillRequest {
            due_date: None,
            notes: None,
        },
    )
    .await?
    .data
    .expect("bill");
    assert!(generated.bill.bill_number.starts_with("JMD-BILL-"));
    assert_eq!(generated.bill.total_amount, dec!(1008.90));
    assert_eq!(generated.bill.paid_amount, dec!(500));
    assert_eq!(generated.bill.pending_amount, dec!(508.90));
    assert_eq!(generated.order.status, OrderStatus::Completed);
    assert_eq!(generated.order.bill_id, Some(generated.bill.id));
    assert!(generated.order.actual_delivery_date.is_some());
    assert!(generated.pdf_url.is_some());
    assert!(generated.pdf_size > 0);

    let bill_key = format!("bills/{}.pdf", generated.bill.bill_number);
    assert!(app.storage.uploaded_keys().contains(&bill_key));

    // One bill per order
    let result = bill_service::generate_bill(
        &state,
        &staff_a,
        order.id,
        GenerateBillRequest {
            due_date: None,
            notes: None,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // A billed order is frozen
    let result = order_service::update_order(
        &state,
        &staff_a,
        order.id,
        UpdateOrderRequest {
            notes: Some("late change".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let bills = bill_service::list_bills(&state, &staff_b, PaymentQuery::default())
        .await?
        .data
        .expect("bills");
    assert!(bills.items.is_empty());

    let fetched = order_service::get_order(&state, &staff_a, order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(fetched.bill.map(|b| b.id), Some(generated.bill.id));

    // Re-rendering replaces the stored file without re-sending the bill
    let rerendered = bill_service::regenerate_pdf(&state, &staff_a, generated.bill.id)
        .await?
        .data
        .expect("bill");
    assert_eq!(rerendered.pdf_url, generated.pdf_url);

    let (email, whatsapp, storage) = app.drain().await;
    // Confirmation to director and client, then the bill to the client once
    assert_eq!(email.sent().len(), 2);
    assert_eq!(whatsapp.sent().len(), 2);
    assert!(
        storage
            .uploaded_keys()
            .contains(&format!("bills/{}-share.pdf", generated.bill.bill_number))
    );
    Ok(())
}

// Unknown items are rejected before anything is written; payment status waits for the bill.
#[tokio::test]
async fn order_intake_rules() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let app = common::setup_app(&database_url).await?;
    let state = app.state.clone();

    let director = common::create_user(&state, Role::Director, "director@jmd.test", None).await?;
    let catalogue = seed_catalogue(&state, &director).await?;
    let staff =
        common::create_user(&state, Role::Staff, "a@jmd.test", Some(catalogue.branch_a)).await?;

    let mut unknown = order_request(&catalogue);
    unknown.items[0].item_type_id = Uuid::new_v4();
    let result = order_service::create_order(&state, &staff, unknown).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    let sequences: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM number_sequences")
        .fetch_one(raw_pool(&state.orm))
        .await?;
    assert_eq!(sequences, 0);

    // Fabric sale: stitching is not charged and the line is a single unit
    let mut fabric_sale = order_request(&catalogue);
    fabric_sale.order_type = OrderType::Fabric;
    fabric_sale.discount_value = dec!(0);
    fabric_sale.tax_rate = Some(dec!(0));
    fabric_sale.advance_payment = dec!(0);
    fabric_sale.items[0].fabric_meters = dec!(2);
    fabric_sale.items[0].quantity = 3;
    let fabric_order = order_service::create_order(&state, &staff, fabric_sale)
        .await?
        .data
        .expect("order");
    assert_eq!(fabric_order.items[0].quantity, 1);
    assert_eq!(fabric_order.items[0].stitching_cost, dec!(0));
    assert_eq!(fabric_order.items[0].fabric_cost, dec!(600));
    assert_eq!(fabric_order.order.total_amount, dec!(600));

    // An advance covering the total does not settle the order at intake
    let mut prepaid = order_request(&catalogue);
    prepaid.advance_payment = dec!(5000);
    let order = order_service::create_order(&state, &staff, prepaid)
        .await?
        .data
        .expect("order")
        .order;
    assert_eq!(order.total_amount, dec!(1008.90));
    assert_eq!(order.payment_status, PaymentStatus::Pending);

    let generated = bill_service::generate_bill(
        &state,
        &staff,
        order.id,
        GenerateBillRequest {
            due_date: None,
            notes: None,
        },
    )
    .await?
    .data
    .expect("bill");
    assert_eq!(generated.bill.paid_amount, dec!(1008.90));
    assert_eq!(generated.bill.pending_amount, dec!(0));
    assert_eq!(generated.bill.payment_status, PaymentStatus::Paid);
    assert_eq!(generated.order.payment_status, PaymentStatus::Paid);

    app.drain().await;
    Ok(())
}

// Pending intake -> invoice -> part payments; an expired or billed intake cannot be billed again.
#[tokio::test]
async fn pending_order_invoice_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let app = common::setup_app(&database_url).await?;
    let state = app.state.clone();

    let director = common::create_user(&state, Role::Director, "director@jmd.test", None).await?;
    let catalogue = seed_catalogue(&state, &director).await?;
    let staff =
        common::create_user(&state, Role::Staff, "a@jmd.test", Some(catalogue.branch_a)).await?;

    let pending = pending_order_service::create_pending_order(
        &state,
        &staff,
        CreatePendingOrderRequest {
            branch_id: None,
            customer: customer(),
            order_type: OrderType::Stitching,
            items: vec![shirt_line(&catalogue)],
            master_name: Some("Ramesh".into()),
            salesman_name: None,
            notes: None,
        },
    )
    .await?
    .data
    .expect("pending order");
    assert_eq!(pending.status, PendingOrderStatus::Pending);
    assert!(pending.expires_at > chrono::Utc::now());

    let invoice = pending_order_service::bill_pending_order(
        &state,
        &staff,
        pending.id,
        BillPendingOrderRequest {
            discount_type: DiscountType::Fixed,
            discount_value: dec!(50),
            tax_rate: Some(dec!(0)),
            paid_amount: dec!(0),
            notes: None,
        },
    )
    .await?
    .data
    .expect("invoice");
    assert!(invoice.invoice_number.starts_with("INV-"));
    assert_eq!(invoice.pending_order_id, Some(pending.id));
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.total_amount, dec!(900));
    assert_eq!(invoice.balance_amount, dec!(900));
    assert_eq!(invoice.payment_status, PaymentStatus::Pending);

    let result = pending_order_service::bill_pending_order(
        &state,
        &staff,
        pending.id,
        BillPendingOrderRequest::default(),
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = pending_order_service::delete_pending_order(&state, &staff, pending.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = pending_order_service::record_invoice_payment(
        &state,
        &staff,
        invoice.id,
        RecordPaymentRequest { amount: dec!(0) },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let part = pending_order_service::record_invoice_payment(
        &state,
        &staff,
        invoice.id,
        RecordPaymentRequest { amount: dec!(400) },
    )
    .await?
    .data
    .expect("invoice");
    assert_eq!(part.paid_amount, dec!(400));
    assert_eq!(part.balance_amount, dec!(500));
    assert_eq!(part.payment_status, PaymentStatus::Pending);

    let settled = pending_order_service::record_invoice_payment(
        &state,
        &staff,
        invoice.id,
        RecordPaymentRequest { amount: dec!(500) },
    )
    .await?
    .data
    .expect("invoice");
    assert_eq!(settled.balance_amount, dec!(0));
    assert_eq!(settled.payment_status, PaymentStatus::Paid);

    let (filename, pdf) = pending_order_service::invoice_pdf(&state, &staff, invoice.id).await?;
    assert_eq!(filename, format!("{}.pdf", invoice.invoice_number));
    assert!(pdf.starts_with(b"%PDF"));

    app.drain().await;
    Ok(())
}
