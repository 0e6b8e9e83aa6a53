//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. Auth: bearer session → actor, capability resolved per request
//! 2. Access log: method, path, actor and status once the handler returns

pub mod audit;
pub mod auth;
