pub mod accounts;
pub mod users;

pub use accounts::LinkAccountData;
pub use users::{CreateUserData, UserRepo};
