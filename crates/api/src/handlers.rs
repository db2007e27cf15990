pub mod checkout;
pub mod collector;
pub mod group;
pub mod permission;
pub mod student;
