//! Overseer — event-processing pipeline.
//!
//! Submitted events are validated, durably recorded and then handed to a
//! detached background task. That task runs every matching handler in
//! registration order, each under the game's ticket lock, and streams the
//! resulting receipts back to the submitter.

pub mod application;
pub mod domain;
pub mod handlers;
