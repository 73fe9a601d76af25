//! Overseer — HTTP transport.
//!
//! Exposes event submission as a unary call: the request carries one event,
//! the response carries every receipt the background processing produced.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
