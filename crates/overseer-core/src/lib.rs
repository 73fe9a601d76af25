//! Overseer Core — shared domain types and collaborator ports.
//!
//! This crate defines the events, receipts and identities that flow through
//! the event pipeline, along with the traits every adapter implements. It
//! contains no infrastructure code.

pub mod caller;
pub mod claim;
pub mod clock;
pub mod directory;
pub mod durability;
pub mod error;
pub mod event;
pub mod game;
pub mod lock;
pub mod receipt;
