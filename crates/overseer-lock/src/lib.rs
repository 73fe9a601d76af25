//! Overseer — Resource Ticket Lock.
//!
//! FIFO mutual exclusion scoped to a resource id (in practice, a game).
//! Every acquire attempt queues a ticket; a ticket may lock only once no
//! earlier, uncompleted ticket exists for the same resource.

pub mod application;
pub mod domain;
