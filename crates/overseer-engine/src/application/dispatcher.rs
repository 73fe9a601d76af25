//! The event dispatcher.
//!
//! [`EventDispatcher::submit`] checks its preconditions synchronously, records
//! the event and returns a [`ReceiptStream`]. Everything after that happens in
//! a detached task whose only output is the stream:
//!
//! 1. every registered handler whose predicate accepts the event is run, in
//!    registration order;
//! 2. each run acquires the game's ticket lock (waiting), invokes the handler,
//!    records and forwards its receipts, then releases the lock; a receipt id
//!    is delivered at most once per submission;
//! 3. lock acquire or release failures end processing with one error receipt;
//!    a handler failure yields one error receipt and processing moves on;
//! 4. the stream is closed exactly once when the task finishes.
//!
//! Dropping the stream does not stop processing. Only
//! [`EventDispatcher::shutdown`] cancels in-flight lock waits.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;

use overseer_core::caller::Caller;
use overseer_core::claim::ClaimId;
use overseer_core::clock::Clock;
use overseer_core::directory::{ActorDirectory, GameDirectory};
use overseer_core::durability::EventDurability;
use overseer_core::error::DomainError;
use overseer_core::event::{Event, EventRecord};
use overseer_core::lock::ResourceLock;
use overseer_core::receipt::{ErrorEffectKind, Receipt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

use crate::application::config::DispatcherConfig;
use crate::application::receipt_stream::{ReceiptSink, ReceiptStream, receipt_channel};
use crate::domain::handler::EventHandler;
use crate::domain::registry::{HandlerRegistry, accepts};

const CLAIM_NAMESPACE: &str = "eventbus";

/// Collaborators the dispatcher depends on.
#[derive(Clone)]
pub struct DispatcherPorts {
    /// Game lookup and persistence.
    pub games: Arc<dyn GameDirectory>,
    /// Actor lookup.
    pub actors: Arc<dyn ActorDirectory>,
    /// Durable event and receipt storage.
    pub durability: Arc<dyn EventDurability>,
    /// Per-game ticket lock.
    pub locks: Arc<dyn ResourceLock>,
    /// Time source for claim ids.
    pub clock: Arc<dyn Clock>,
}

/// Validates, records and asynchronously processes submitted events.
pub struct EventDispatcher {
    registry: Arc<HandlerRegistry>,
    ports: DispatcherPorts,
    config: DispatcherConfig,
    shutdown: CancellationToken,
}

impl EventDispatcher {
    /// Creates a dispatcher over a fixed handler registry.
    #[must_use]
    pub fn new(registry: HandlerRegistry, ports: DispatcherPorts, config: DispatcherConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            ports,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Submits an event for processing.
    ///
    /// Returns once the event is durably recorded; processing continues in
    /// the background and reports through the returned stream.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if `caller` is `None`.
    /// - `NotFound` if the game, or any of its declared participants, does
    ///   not exist.
    /// - `PermissionDenied` if the submitting actor is not a participant, or
    ///   the caller is acting as a different actor.
    /// - `Internal` if no handler is registered or recording fails.
    /// - `Cancelled` if the dispatcher has been shut down.
    ///
    /// No event is recorded and no stream is produced on error.
    #[instrument(
        skip(self, caller, event),
        fields(game_id = %event.game_id, actor_id = %event.actor_id)
    )]
    pub async fn submit(
        &self,
        caller: Option<&Caller>,
        event: Event,
    ) -> Result<ReceiptStream, DomainError> {
        let Some(caller) = caller else {
            error!("caller identity missing");
            return Err(DomainError::Unauthenticated(
                "caller identity missing".into(),
            ));
        };
        self.validate(caller, &event).await?;

        if self.registry.is_empty() {
            error!("no handlers registered");
            return Err(DomainError::Internal("no handlers registered".into()));
        }
        if self.shutdown.is_cancelled() {
            return Err(DomainError::Cancelled("dispatcher is shutting down".into()));
        }

        let (sink, stream) = receipt_channel(self.config.channel_capacity)?;
        let record = self
            .ports
            .durability
            .record_event(&event)
            .await
            .inspect_err(|err| error!(error = %err, "failed to record event"))?;
        debug!(event_id = %record.event_id, user = %caller.user_id, "event recorded");

        let span = info_span!(
            "submission",
            game_id = %record.game_id(),
            event_id = %record.event_id
        );
        let submission = Submission {
            record,
            registry: Arc::clone(&self.registry),
            durability: Arc::clone(&self.ports.durability),
            locks: Arc::clone(&self.ports.locks),
            clock: Arc::clone(&self.ports.clock),
            cancel: self.shutdown.child_token(),
            sink,
            delivered: HashSet::new(),
        };
        tokio::spawn(submission.run().instrument(span));

        Ok(stream)
    }

    /// Cancels every in-flight lock wait and rejects further submissions.
    pub fn shutdown(&self) {
        info!("dispatcher shutting down");
        self.shutdown.cancel();
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Handler names in dispatch order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    async fn validate(&self, caller: &Caller, event: &Event) -> Result<(), DomainError> {
        let game = self
            .ports
            .games
            .get_game(event.game_id)
            .await
            .inspect_err(|err| error!(error = %err, "failed to get game"))?;

        if let Some(acting_as) = caller.actor_id
            && acting_as != event.actor_id
        {
            error!(user = %caller.user_id, %acting_as, "caller is acting as another actor");
            return Err(DomainError::PermissionDenied(format!(
                "caller acts as {acting_as} but event was submitted by {}",
                event.actor_id
            )));
        }
        if !game.has_participant(event.actor_id) {
            error!(user = %caller.user_id, "actor not in game");
            return Err(DomainError::PermissionDenied(format!(
                "actor {} is not a participant of game {}",
                event.actor_id, game.game_id
            )));
        }
        for participant in &game.participants {
            debug!(actor = %participant, "validating participant");
            self.ports.actors.get_actor(*participant).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State owned by one submission's background task.
struct Submission {
    record: EventRecord,
    registry: Arc<HandlerRegistry>,
    durability: Arc<dyn EventDurability>,
    locks: Arc<dyn ResourceLock>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    sink: ReceiptSink,
    /// Ids already put on the stream; a receipt is delivered at most once.
    delivered: HashSet<Uuid>,
}

impl Submission {
    async fn run(mut self) {
        let registry = Arc::clone(&self.registry);
        for handler in registry.iter() {
            if !accepts(handler.as_ref(), &self.record) {
                continue;
            }
            if self.dispatch_to(handler.as_ref()).await.is_break() {
                break;
            }
        }
        debug!("submission finished");
        self.sink.close();
    }

    /// Runs one matching handler under the game lock.
    async fn dispatch_to(&mut self, handler: &dyn EventHandler) -> ControlFlow<()> {
        let name = handler.name();
        let game_id = self.record.game_id();
        let claim_id = ClaimId::derive(&[
            CLAIM_NAMESPACE,
            &game_id.to_string(),
            name,
            &self.clock.now().timestamp_micros().to_string(),
        ]);

        debug!(handler = name, %claim_id, "locking game");
        match self.locks.acquire(game_id, &claim_id, true, &self.cancel).await {
            Ok(true) => {}
            Ok(false) => {
                error!(handler = name, %claim_id, "game is locked");
                self.send_error(
                    ErrorEffectKind::LockUnavailable,
                    format!("game is locked, handler {name} cannot process event"),
                )
                .await;
                return ControlFlow::Break(());
            }
            Err(err) => {
                error!(handler = name, %claim_id, error = %err, "failed to lock game");
                self.send_error(
                    ErrorEffectKind::LockUnavailable,
                    format!("failed to lock game for handler {name}: {err}"),
                )
                .await;
                return ControlFlow::Break(());
            }
        }

        debug!(handler = name, "handling event");
        match handler.handle(&self.record).await {
            Ok(receipts) => self.forward(name, receipts).await,
            Err(err) => {
                error!(handler = name, error = %err, "failed to handle event");
                self.send_error(
                    ErrorEffectKind::HandlerFailed,
                    format!("handler {name} failed: {err}"),
                )
                .await;
            }
        }

        match self.locks.release(game_id, &claim_id).await {
            Ok(true) => ControlFlow::Continue(()),
            Ok(false) => {
                error!(handler = name, %claim_id, "game is not unlocked");
                self.send_error(
                    ErrorEffectKind::ReleaseFailed,
                    format!("failed to unlock game after handler {name}"),
                )
                .await;
                ControlFlow::Break(())
            }
            Err(err) => {
                error!(handler = name, %claim_id, error = %err, "failed to unlock game");
                self.send_error(
                    ErrorEffectKind::ReleaseFailed,
                    format!("failed to unlock game after handler {name}: {err}"),
                )
                .await;
                ControlFlow::Break(())
            }
        }
    }

    /// Records and delivers every receipt `handler` produced, in order.
    async fn forward(&mut self, handler: &str, mut receipts: ReceiptStream) {
        while let Some(receipt) = receipts.recv().await {
            if self.delivered.contains(&receipt.receipt_id) {
                warn!(handler, receipt_id = %receipt.receipt_id, "duplicate receipt dropped");
                continue;
            }
            match self.durability.record_receipt(&receipt).await {
                Ok(()) => {}
                Err(DomainError::AlreadyExists(_)) => {
                    debug!(handler, receipt_id = %receipt.receipt_id, "receipt already recorded");
                }
                Err(err) => {
                    error!(
                        handler,
                        receipt_id = %receipt.receipt_id,
                        error = %err,
                        "failed to record receipt"
                    );
                    self.send_error(
                        ErrorEffectKind::HandlerFailed,
                        format!(
                            "receipt {} from handler {handler} could not be recorded: {err}",
                            receipt.receipt_id
                        ),
                    )
                    .await;
                    continue;
                }
            }
            debug!(handler, receipt_id = %receipt.receipt_id, "event handled");
            self.deliver(receipt).await;
        }
    }

    /// Synthesizes, records and delivers one error receipt.
    async fn send_error(&mut self, kind: ErrorEffectKind, message: String) {
        let receipt = Receipt::error(self.record.game_id(), self.record.event_id, kind, message);
        if let Err(err) = self.durability.record_receipt(&receipt).await {
            error!(
                receipt_id = %receipt.receipt_id,
                error = %err,
                "failed to record error receipt"
            );
            return;
        }
        self.deliver(receipt).await;
    }

    async fn deliver(&mut self, receipt: Receipt) {
        self.delivered.insert(receipt.receipt_id);
        if let Err(gone) = self.sink.send(receipt).await {
            debug!(
                receipt_id = %gone.0.receipt_id,
                "consumer gone, receipt recorded but not delivered"
            );
        }
    }
}
