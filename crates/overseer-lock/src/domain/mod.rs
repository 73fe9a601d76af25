//! Domain model for the ticket lock.

pub mod ticket;
