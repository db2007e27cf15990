pub mod checkout;
pub mod collector;
pub mod group;
pub mod health;
pub mod permission;
pub mod student;
