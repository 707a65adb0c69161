pub use super::auth_tokens::Entity as AuthTokens;
pub use super::operation_logs::Entity as OperationLogs;
pub use super::purchase_orders::Entity as PurchaseOrders;
pub use super::sim_cards::Entity as SimCards;
pub use super::usage_records::Entity as UsageRecords;
pub use super::users::Entity as Users;
