//! Built-in event handlers.

pub mod new_game;
