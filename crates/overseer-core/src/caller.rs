//! Identity attached to an inbound call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller of an operation.
///
/// Produced by the transport layer; authentication itself happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Authenticated user.
    pub user_id: String,
    /// Actor the user is currently playing as, if they selected one.
    pub actor_id: Option<Uuid>,
}

impl Caller {
    /// Creates a caller acting as `actor_id`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, actor_id: Option<Uuid>) -> Self {
        Self {
            user_id: user_id.into(),
            actor_id,
        }
    }
}
