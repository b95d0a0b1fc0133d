//! Account records and the registry that persists them

pub mod model;
pub mod registry;

pub use model::{Account, AccountId, Session, generate_account_id};
pub use registry::AccountRegistry;
