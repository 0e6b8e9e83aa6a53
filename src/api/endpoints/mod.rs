//! API endpoint handlers.
//!
//! Thin adapters: parse the request, call the lifecycle manager, review
//! gate or dashboard, and map the result.

pub mod admin;
pub mod appointments;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod reviews;
pub mod services;
