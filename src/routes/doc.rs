use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        bills::{BillGenerated, BillList, GenerateBillRequest},
        catalogue::{
            BranchList, CreateBranchRequest, CreateFabricRequest, CreateItemRequest,
            CreateStyleRequest, FabricList, ItemList, StyleList, UpdateBranchRequest,
            UpdateFabricRequest, UpdateItemRequest, UpdateStyleRequest,
        },
        clients::{ClientList, CreateClientRequest, UpdateClientRequest},
        orders::{
            CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems, UpdateOrderRequest,
            UpdatePaymentRequest, UpdateStatusRequest,
        },
        pending_orders::{
            BillPendingOrderRequest, CreatePendingOrderRequest, InvoiceList, PendingOrderList,
            RecordPaymentRequest,
        },
    },
    error::ErrorData,
    models::{
        Bill, Branch, Client, ClientDetails, DiscountType, Fabric, FabricType, Invoice,
        InvoiceLine, ItemMaster, ItemStyle, Order, OrderItem, OrderStatus, OrderType,
        PaymentStatus, PendingOrder, PendingOrderStatus, Role, ShippingDetails, StyleMaster, User,
    },
    response::{ApiResponse, Meta},
    routes::{auth, bills, catalogue, clients, health, orders, params, pending_orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::me,
        catalogue::list_branches,
        catalogue::get_branch,
        catalogue::create_branch,
        catalogue::update_branch,
        catalogue::delete_branch,
        catalogue::list_fabrics,
        catalogue::get_fabric,
        catalogue::create_fabric,
        catalogue::update_fabric,
        catalogue::delete_fabric,
        catalogue::list_items,
        catalogue::get_item,
        catalogue::create_item,
        catalogue::update_item,
        catalogue::delete_item,
        catalogue::list_styles,
        catalogue::get_style,
        catalogue::create_style,
        catalogue::update_style,
        catalogue::delete_style,
        clients::list_clients,
        clients::get_client,
        clients::create_client,
        clients::update_client,
        clients::delete_client,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::update_status,
        orders::update_payment,
        orders::generate_bill,
        bills::list_bills,
        bills::get_bill,
        bills::regenerate_pdf,
        pending_orders::list_pending_orders,
        pending_orders::create_pending_order,
        pending_orders::get_pending_order,
        pending_orders::delete_pending_order,
        pending_orders::bill_pending_order,
        pending_orders::list_invoices,
        pending_orders::get_invoice,
        pending_orders::record_payment,
        pending_orders::invoice_pdf
    ),
    components(
        schemas(
            User,
            Role,
            Branch,
            Fabric,
            FabricType,
            ItemMaster,
            ItemStyle,
            StyleMaster,
            Client,
            ClientDetails,
            ShippingDetails,
            Order,
            OrderItem,
            OrderStatus,
            OrderType,
            PaymentStatus,
            DiscountType,
            Bill,
            PendingOrder,
            PendingOrderStatus,
            Invoice,
            InvoiceLine,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateBranchRequest,
            UpdateBranchRequest,
            CreateFabricRequest,
            UpdateFabricRequest,
            CreateItemRequest,
            UpdateItemRequest,
            CreateStyleRequest,
            UpdateStyleRequest,
            BranchList,
            FabricList,
            ItemList,
            StyleList,
            CreateClientRequest,
            UpdateClientRequest,
            ClientList,
            OrderItemRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            UpdateStatusRequest,
            UpdatePaymentRequest,
            OrderWithItems,
            OrderList,
            GenerateBillRequest,
            BillGenerated,
            BillList,
            CreatePendingOrderRequest,
            BillPendingOrderRequest,
            RecordPaymentRequest,
            PendingOrderList,
            InvoiceList,
            params::Pagination,
            params::SortOrder,
            ErrorData,
            Meta,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<BillGenerated>,
            ApiResponse<Invoice>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Staff accounts and tokens"),
        (name = "Catalogue", description = "Branches, fabrics, item and style masters"),
        (name = "Clients", description = "Customer records"),
        (name = "Orders", description = "Order intake, pricing and production status"),
        (name = "Bills", description = "Bill generation and PDF delivery"),
        (name = "Pending orders", description = "Counter intake awaiting pricing"),
        (name = "Invoices", description = "Invoices billed from pending orders"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
