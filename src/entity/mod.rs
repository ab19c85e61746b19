pub mod audit_logs;
pub mod bills;
pub mod branches;
pub mod clients;
pub mod fabrics;
pub mod invoices;
pub mod item_masters;
pub mod order_items;
pub mod orders;
pub mod pending_orders;
pub mod style_masters;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use bills::Entity as Bills;
pub use branches::Entity as Branches;
pub use clients::Entity as Clients;
pub use fabrics::Entity as Fabrics;
pub use invoices::Entity as Invoices;
pub use item_masters::Entity as ItemMasters;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use pending_orders::Entity as PendingOrders;
pub use style_masters::Entity as StyleMasters;
pub use users::Entity as Users;
