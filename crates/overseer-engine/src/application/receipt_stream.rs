//! Single-producer receipt channel.
//!
//! The producing side is a [`ReceiptSink`], owned by exactly one task and
//! closed by dropping it (or calling [`ReceiptSink::close`]). The consuming
//! side is a [`ReceiptStream`], which yields receipts in send order until the
//! sink is gone.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use overseer_core::error::DomainError;
use overseer_core::receipt::Receipt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Returned by [`ReceiptSink::send`] when the consumer dropped its stream.
#[derive(Debug, Error)]
#[error("receipt stream consumer has gone away")]
pub struct ConsumerGone(pub Receipt);

/// Creates a bounded receipt channel.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` if `capacity` is zero.
pub fn receipt_channel(capacity: usize) -> Result<(ReceiptSink, ReceiptStream), DomainError> {
    if capacity == 0 {
        return Err(DomainError::InvalidArgument(
            "receipt stream capacity must be positive".into(),
        ));
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((ReceiptSink { tx }, ReceiptStream::Channel(rx)))
}

/// Writing half of a receipt channel. Deliberately not `Clone`.
#[derive(Debug)]
pub struct ReceiptSink {
    tx: mpsc::Sender<Receipt>,
}

impl ReceiptSink {
    /// Sends `receipt`, waiting for capacity if the stream is full.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerGone`] with the receipt if the stream was dropped.
    pub async fn send(&self, receipt: Receipt) -> Result<(), ConsumerGone> {
        self.tx.send(receipt).await.map_err(|e| ConsumerGone(e.0))
    }

    /// Closes the stream. Consumers see the end after draining what was sent.
    pub fn close(self) {
        drop(self);
    }
}

/// Reading half of a receipt channel.
#[derive(Debug)]
pub enum ReceiptStream {
    /// Receipts arriving from a live [`ReceiptSink`].
    Channel(mpsc::Receiver<Receipt>),
    /// Receipts already produced.
    Ready(VecDeque<Receipt>),
}

impl ReceiptStream {
    /// A closed stream with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::Ready(VecDeque::new())
    }

    /// A closed stream that yields `receipts` in order.
    #[must_use]
    pub fn from_receipts(receipts: Vec<Receipt>) -> Self {
        Self::Ready(receipts.into())
    }

    /// Waits for the next receipt. Returns `None` once the stream is closed
    /// and drained.
    pub async fn recv(&mut self) -> Option<Receipt> {
        match self {
            Self::Channel(rx) => rx.recv().await,
            Self::Ready(queue) => queue.pop_front(),
        }
    }

    /// Drains the stream until it closes.
    pub async fn collect_all(mut self) -> Vec<Receipt> {
        let mut receipts = Vec::new();
        while let Some(receipt) = self.recv().await {
            receipts.push(receipt);
        }
        receipts
    }
}

impl Stream for ReceiptStream {
    type Item = Receipt;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut() {
            Self::Channel(rx) => rx.poll_recv(cx),
            Self::Ready(queue) => Poll::Ready(queue.pop_front()),
        }
    }
}
