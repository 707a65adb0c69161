pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, CurrentUser, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod sim_service;
pub mod sim_service_impl;
pub use sim_service::{SimError, SimService};
pub use sim_service_impl::SeaOrmSimService;

pub mod purchase_service;
pub mod purchase_service_impl;
pub use purchase_service::{PurchaseError, PurchaseReceipt, PurchaseService};
pub use purchase_service_impl::{SeaOrmPurchaseService, generate_transid};
