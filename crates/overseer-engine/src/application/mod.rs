//! Dispatcher and receipt streaming.

pub mod config;
pub mod dispatcher;
pub mod receipt_stream;
