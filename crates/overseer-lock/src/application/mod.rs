//! Application services for the ticket lock.

pub mod config;
pub mod ticket_lock;
