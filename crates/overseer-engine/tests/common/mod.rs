//! Shared helpers for dispatcher integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use overseer_core::clock::Clock;
use overseer_core::durability::EventDurability;
use overseer_core::error::DomainError;
use overseer_core::event::{EventPayload, EventRecord};
use overseer_core::lock::ResourceLock;
use overseer_core::receipt::Receipt;
use overseer_engine::application::config::DispatcherConfig;
use overseer_engine::application::dispatcher::{DispatcherPorts, EventDispatcher};
use overseer_engine::application::receipt_stream::ReceiptStream;
use overseer_engine::domain::handler::EventHandler;
use overseer_engine::domain::registry::HandlerRegistry;
use overseer_test_support::{FixedClock, GameFixture, RecordingEventDurability};

/// Fixed timestamp used across all dispatcher tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Which events a [`ScriptedHandler`] accepts.
#[derive(Debug, Clone, Copy)]
pub enum Accepts {
    Everything,
    NewGame,
    Interaction,
    /// The predicate itself fails.
    Broken,
}

/// What a [`ScriptedHandler`] does when invoked.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Produce this many acknowledgement receipts.
    Acknowledge(usize),
    /// Produce one acknowledgement receipt twice, same id both times.
    Duplicate,
    /// Produce exactly these receipts.
    Emit(Vec<Receipt>),
    /// Fail with an internal error.
    Fail,
}

/// Ordered log of handler activity shared between handlers in one test.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog(Arc<Mutex<Vec<String>>>);

impl ActivityLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// A handler whose behavior is fixed at construction time.
pub struct ScriptedHandler {
    pub name: String,
    pub accepts: Accepts,
    pub outcome: Outcome,
    pub hold: Duration,
    pub log: ActivityLog,
}

impl ScriptedHandler {
    pub fn new(name: &str, accepts: Accepts, outcome: Outcome, log: &ActivityLog) -> Self {
        Self {
            name: name.to_owned(),
            accepts,
            outcome,
            hold: Duration::ZERO,
            log: log.clone(),
        }
    }

    /// Keeps the handler busy (and so the lock held) for `hold`.
    pub fn holding(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn shared(self) -> Arc<dyn EventHandler> {
        Arc::new(self)
    }
}

#[async_trait]
impl EventHandler for ScriptedHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn predicate(&self, record: &EventRecord) -> Result<bool, DomainError> {
        match (self.accepts, record.payload()) {
            (Accepts::Everything, _)
            | (Accepts::NewGame, EventPayload::NewGame(_))
            | (Accepts::Interaction, EventPayload::Interaction(_)) => Ok(true),
            (Accepts::Broken, _) => Err(DomainError::InvalidArgument("unreadable payload".into())),
            _ => Ok(false),
        }
    }

    async fn handle(&self, record: &EventRecord) -> Result<ReceiptStream, DomainError> {
        self.log.push(format!("start {}", self.name));
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        self.log.push(format!("end {}", self.name));
        match &self.outcome {
            Outcome::Acknowledge(count) => Ok(ReceiptStream::from_receipts(
                (0..*count)
                    .map(|i| {
                        Receipt::acknowledgement(
                            record.game_id(),
                            record.event_id,
                            Some(format!("{} #{i}", self.name)),
                        )
                    })
                    .collect(),
            )),
            Outcome::Duplicate => {
                let receipt = Receipt::acknowledgement(
                    record.game_id(),
                    record.event_id,
                    Some(format!("{} again", self.name)),
                );
                Ok(ReceiptStream::from_receipts(vec![receipt.clone(), receipt]))
            }
            Outcome::Emit(receipts) => Ok(ReceiptStream::from_receipts(receipts.clone())),
            Outcome::Fail => Err(DomainError::Internal(format!("{} exploded", self.name))),
        }
    }
}

/// Everything a dispatcher test needs to inspect afterwards.
pub struct Harness {
    pub fixture: GameFixture,
    pub durability: Arc<RecordingEventDurability>,
    pub dispatcher: EventDispatcher,
}

impl Harness {
    /// Builds a dispatcher over `fixture`'s game and actors with the given
    /// handlers and lock.
    pub fn new(
        fixture: GameFixture,
        handlers: Vec<Arc<dyn EventHandler>>,
        locks: Arc<dyn ResourceLock>,
    ) -> Self {
        let durability = Arc::new(RecordingEventDurability::default());
        let ports = DispatcherPorts {
            games: Arc::new(fixture.games()),
            actors: Arc::new(fixture.actors()),
            durability: durability.clone(),
            locks,
            clock: fixed_clock(),
        };
        let dispatcher = EventDispatcher::new(
            HandlerRegistry::new(handlers),
            ports,
            DispatcherConfig::default(),
        );
        Self {
            fixture,
            durability,
            dispatcher,
        }
    }
}

/// Builds a dispatcher over `fixture`'s game and actors with the given
/// handlers, the given lock and a custom durability layer.
pub fn dispatcher_with_durability(
    fixture: &GameFixture,
    handlers: Vec<Arc<dyn EventHandler>>,
    locks: Arc<dyn ResourceLock>,
    durability: Arc<dyn EventDurability>,
) -> EventDispatcher {
    let ports = DispatcherPorts {
        games: Arc::new(fixture.games()),
        actors: Arc::new(fixture.actors()),
        durability,
        locks,
        clock: fixed_clock(),
    };
    EventDispatcher::new(
        HandlerRegistry::new(handlers),
        ports,
        DispatcherConfig::default(),
    )
}

/// Polls `condition` every few milliseconds, panicking after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within two seconds"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
