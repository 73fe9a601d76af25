//! Overseer — PostgreSQL adapters.
//!
//! Implements the collaborator ports from `overseer-core` on top of a
//! `sqlx::PgPool`. The schema lives in the workspace `migrations/` directory.

mod error;
pub mod pg_directory;
pub mod pg_event_store;
pub mod pg_ticket_lock;
