//! Shared test doubles and fixtures for the Overseer session manager.

mod clock;
mod directory;
mod durability;
mod fixtures;
mod lock;

pub use clock::{FixedClock, SteppingClock};
pub use directory::{InMemoryActorDirectory, InMemoryGameDirectory};
pub use durability::{
    FailingEventDurability, ReceiptRejectingDurability, RecordingEventDurability, RejectReceipts,
};
pub use fixtures::{GameFixture, interaction_event, new_game_event};
pub use lock::{LockBehavior, LockCall, RecordingResourceLock};
