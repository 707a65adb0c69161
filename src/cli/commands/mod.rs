mod sim;
mod usage;
mod user;

pub use sim::{cmd_sim_add, cmd_sim_deactivate, cmd_sim_history};
pub use usage::cmd_usage_set;
pub use user::{cmd_user_add, cmd_user_disable};
