pub mod prelude;

pub mod auth_tokens;
pub mod operation_logs;
pub mod purchase_orders;
pub mod sim_cards;
pub mod usage_records;
pub mod users;
