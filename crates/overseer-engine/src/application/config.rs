//! Dispatcher settings.

/// Receipt stream capacity used when none is configured.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Tuning for [`EventDispatcher`](crate::application::dispatcher::EventDispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Capacity of each submission's receipt stream. A full stream stalls
    /// the background task, and with it the game lock it holds.
    pub channel_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
