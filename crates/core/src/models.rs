pub mod checkout;
pub mod permission;
pub mod registry;
