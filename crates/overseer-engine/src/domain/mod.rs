//! Handler abstractions and the handler registry.

pub mod handler;
pub mod registry;
