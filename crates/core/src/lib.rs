//! # Hort Core
//!
//! Domain types and authorization logic for the Hort checkout service.
//!
//! This crate is deliberately free of I/O: it defines the permission and
//! checkout models, the error taxonomy shared across the workspace, and the
//! pure functions that decide who may take a student home on a given day.
//! The database and HTTP layers feed data in and act on the results.

pub mod errors;
pub mod models;
pub mod resolver;
pub mod timefmt;
