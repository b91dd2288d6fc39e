use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use futures_util::stream::{FusedStream, Stream};
use tokio::time::{Sleep, sleep};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::{Config, Error, Pacing, Result, SequenceId, SequenceState};

/// An item taken from the source, waiting out its delay.
struct Pending<T> {
    item: T,
    delay: Pin<Box<Sleep>>,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl<T> Pending<T> {
    fn new(item: T, delay: Duration, max_wait: Option<Duration>) -> Self {
        Self {
            item,
            delay: Box::pin(sleep(delay)),
            // A bound at or above the delay can never trip.
            deadline: max_wait
                .filter(|max| *max < delay)
                .map(|max| Box::pin(sleep(max))),
        }
    }
}

/// A lazy, finite, ordered sequence with per-item latency.
///
/// Created by [`Producer::produce`](crate::Producer::produce) or [`produce`](crate::produce).
/// Nothing happens until the first pull. Each pull takes the next item from
/// the source, waits its delay without blocking the thread, and yields it.
/// Item `i + 1` is never taken from the source before item `i` is yielded.
///
/// Consume it as a [`Stream`] or with [`Sequence::pull`]:
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> paced::Result {
/// use std::time::Duration;
///
/// let mut names = paced::produce(["James", "Raj"], Duration::from_millis(5));
/// while let Some(name) = names.pull().await {
///     println!("{}", name?);
/// }
/// # Ok(())
/// # }
/// ```
///
/// Ways the sequence ends:
/// - the source is exhausted: the stream returns `None`;
/// - the consumer drops it (e.g. breaks out of its loop): nothing else is produced
///   and the in-flight timer is released;
/// - its token is cancelled: the pending or next pull returns [`Error::Cancelled`],
///   unless every item was already delivered, in which case it returns `None`;
/// - an item exceeds the configured max wait: the pull returns [`Error::Timeout`].
///
/// After an error the stream is fused and keeps returning `None`.
pub struct Sequence<I: Iterator> {
    id: SequenceId,
    source: I,
    pacing: Pacing,
    max_wait: Option<Duration>,
    cancel_token: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    pending: Option<Pending<I::Item>>,
    yielded: usize,
    state: SequenceState,
}

// No field is structurally pinned; timers and the cancellation future are boxed.
impl<I: Iterator> Unpin for Sequence<I> {}

impl<I: Iterator> Sequence<I> {
    pub(crate) fn new(source: I, config: &Config, cancel_token: CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4().as_u128(),
            source,
            pacing: config.pacing.clone(),
            max_wait: config.max_wait,
            cancelled: Box::pin(cancel_token.clone().cancelled_owned()),
            cancel_token,
            pending: None,
            yielded: 0,
            state: SequenceState::Idle,
        }
    }

    /// Unique identifier, used to correlate log records.
    #[inline]
    pub fn id(&self) -> SequenceId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Number of items handed to the consumer so far.
    #[inline]
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Stop producing. The pending or next pull returns [`Error::Cancelled`].
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Token that cancels this sequence when triggered from elsewhere.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Pull the next item, waiting out its delay.
    ///
    /// Returns `None` once the sequence has ended.
    pub async fn pull(&mut self) -> Option<Result<I::Item>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Drain the sequence, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<I::Item>> {
        let mut items = Vec::with_capacity(self.source.size_hint().0);
        while let Some(item) = self.pull().await {
            items.push(item?);
        }
        Ok(items)
    }

    fn finish(&mut self, state: SequenceState) {
        self.pending = None;
        self.state = state;
    }
}

impl<I: Iterator> Stream for Sequence<I> {
    type Item = Result<I::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state.is_terminal() {
            return Poll::Ready(None);
        }

        if this.cancelled.as_mut().poll(cx).is_ready() {
            // Every item was already delivered; cancelling changes nothing.
            if this.pending.is_none() && this.source.size_hint().1 == Some(0) {
                this.finish(SequenceState::Done);
                debug!(sequence = %this.id, yielded = this.yielded, "sequence exhausted");
                return Poll::Ready(None);
            }
            this.finish(SequenceState::Cancelled);
            debug!(sequence = %this.id, yielded = this.yielded, "sequence cancelled");
            return Poll::Ready(Some(Err(Error::Cancelled)));
        }

        let index = this.yielded;
        if this.pending.is_none() {
            let Some(item) = this.source.next() else {
                this.finish(SequenceState::Done);
                debug!(sequence = %this.id, yielded = this.yielded, "sequence exhausted");
                return Poll::Ready(None);
            };
            if this.state == SequenceState::Idle {
                debug!(sequence = %this.id, pacing = %this.pacing, "sequence started");
            }
            let delay = this.pacing.delay_for(index);
            this.pending = Some(Pending::new(item, delay, this.max_wait));
            this.state = SequenceState::Producing(index);
        }

        let Some(pending) = this.pending.as_mut() else {
            return Poll::Pending;
        };

        // The delay is polled first so an item wins a tie with its deadline.
        let ready = pending.delay.as_mut().poll(cx).is_ready();
        let timed_out = !ready
            && pending
                .deadline
                .as_mut()
                .is_some_and(|deadline| deadline.as_mut().poll(cx).is_ready());

        if ready {
            if let Some(Pending { item, .. }) = this.pending.take() {
                this.yielded += 1;
                this.state = SequenceState::Yielded(index);
                trace!(sequence = %this.id, index, "item yielded");
                return Poll::Ready(Some(Ok(item)));
            }
        }

        if timed_out {
            let max_wait = this.max_wait.unwrap_or_default();
            this.finish(SequenceState::Failed);
            warn!(sequence = %this.id, index, ?max_wait, "item timed out");
            return Poll::Ready(Some(Err(Error::Timeout(max_wait))));
        }

        Poll::Pending
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_terminal() {
            return (0, Some(0));
        }
        let in_flight = usize::from(self.pending.is_some());
        let (lower, upper) = self.source.size_hint();
        (
            lower.saturating_add(in_flight),
            upper.and_then(|u| u.checked_add(in_flight)),
        )
    }
}

impl<I: Iterator> FusedStream for Sequence<I> {
    fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

impl<I: Iterator> Drop for Sequence<I> {
    fn drop(&mut self) {
        if self.state.is_producing() {
            debug!(sequence = %self.id, yielded = self.yielded, "sequence dropped while waiting on an item");
        } else if !self.state.is_terminal() && self.state != SequenceState::Idle {
            debug!(sequence = %self.id, yielded = self.yielded, "sequence dropped before completion");
        }
    }
}

impl<I: Iterator> std::fmt::Debug for Sequence<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("yielded", &self.yielded)
            .field("pacing", &self.pacing)
            .field("max_wait", &self.max_wait)
            .finish()
    }
}
