//! Tickets and the per-resource ticket table.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use overseer_core::claim::ClaimId;
use overseer_core::error::DomainError;
use uuid::Uuid;

/// One claim against one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Caller-supplied claim identifier.
    pub claim_id: ClaimId,
    /// Resource the claim is for.
    pub resource_id: Uuid,
    /// Creation timestamp; the primary FIFO key.
    pub created_at: DateTime<Utc>,
    /// Table-wide insertion counter; breaks timestamp ties.
    pub sequence: u64,
    /// Set while the ticket holds the lock.
    pub locked: bool,
    /// Set once the ticket is released. Never reset.
    pub completed: bool,
}

impl Ticket {
    /// Whether this ticket was created before `other`.
    #[must_use]
    pub fn precedes(&self, other: &Self) -> bool {
        (self.created_at, self.sequence) < (other.created_at, other.sequence)
    }
}

/// Table of every ticket ever issued, grouped by resource.
///
/// Completed tickets are kept; nothing is garbage-collected.
#[derive(Debug, Default)]
pub struct TicketTable {
    tickets: HashMap<Uuid, Vec<Ticket>>,
    claims: HashSet<ClaimId>,
    next_sequence: u64,
    last_created_at: Option<DateTime<Utc>>,
}

impl TicketTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new, unlocked ticket and returns a copy of it.
    ///
    /// Timestamps are clamped so they never run backwards across inserts,
    /// keeping creation order total even if the clock steps back.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyExists` if `claim_id` was used before.
    pub fn insert(
        &mut self,
        claim_id: ClaimId,
        resource_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Ticket, DomainError> {
        if self.claims.contains(&claim_id) {
            return Err(DomainError::AlreadyExists(format!("claim {claim_id}")));
        }
        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(created_at);
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);

        let ticket = Ticket {
            claim_id: claim_id.clone(),
            resource_id,
            created_at,
            sequence,
            locked: false,
            completed: false,
        };
        self.claims.insert(claim_id);
        self.tickets
            .entry(resource_id)
            .or_default()
            .push(ticket.clone());
        Ok(ticket)
    }

    /// Counts uncompleted tickets for `resource_id` created before the
    /// ticket for `claim_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the claim has no ticket on the
    /// resource.
    pub fn pending(&self, resource_id: Uuid, claim_id: &ClaimId) -> Result<usize, DomainError> {
        let tickets = self.tickets.get(&resource_id).map_or(&[][..], Vec::as_slice);
        let mine = tickets
            .iter()
            .find(|t| &t.claim_id == claim_id)
            .ok_or_else(|| not_found(resource_id, claim_id))?;
        Ok(tickets
            .iter()
            .filter(|t| !t.completed && t.precedes(mine))
            .count())
    }

    /// Marks the ticket as holding the lock.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the claim has no ticket on the
    /// resource.
    pub fn mark_locked(&mut self, resource_id: Uuid, claim_id: &ClaimId) -> Result<(), DomainError> {
        let ticket = self
            .find_mut(resource_id, claim_id)
            .ok_or_else(|| not_found(resource_id, claim_id))?;
        ticket.locked = true;
        Ok(())
    }

    /// Completes the ticket. Returns `false` if it does not exist; completing
    /// an already completed ticket returns `true` and changes nothing.
    pub fn complete(&mut self, resource_id: Uuid, claim_id: &ClaimId) -> bool {
        match self.find_mut(resource_id, claim_id) {
            Some(ticket) => {
                ticket.completed = true;
                ticket.locked = false;
                true
            }
            None => false,
        }
    }

    /// Number of tickets currently holding the lock on `resource_id`.
    #[must_use]
    pub fn holders(&self, resource_id: Uuid) -> usize {
        self.tickets.get(&resource_id).map_or(0, |tickets| {
            tickets.iter().filter(|t| t.locked && !t.completed).count()
        })
    }

    /// Returns a copy of the ticket for `claim_id`, if any.
    #[must_use]
    pub fn get(&self, resource_id: Uuid, claim_id: &ClaimId) -> Option<Ticket> {
        self.tickets
            .get(&resource_id)?
            .iter()
            .find(|t| &t.claim_id == claim_id)
            .cloned()
    }

    fn find_mut(&mut self, resource_id: Uuid, claim_id: &ClaimId) -> Option<&mut Ticket> {
        self.tickets
            .get_mut(&resource_id)?
            .iter_mut()
            .find(|t| &t.claim_id == claim_id)
    }
}

fn not_found(resource_id: Uuid, claim_id: &ClaimId) -> DomainError {
    DomainError::NotFound(format!("ticket {claim_id} on resource {resource_id}"))
}
