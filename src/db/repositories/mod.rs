pub mod operation_log;
pub mod purchase;
pub mod sim;
pub mod token;
pub mod usage;
pub mod user;
