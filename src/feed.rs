use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::stream::{FusedStream, Stream};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Error, Result, Sequence, SequenceId};

/// A sequence driven by its own task and delivered through a bounded channel.
///
/// Created by [`Producer::feed`](crate::Producer::feed). The task pushes items
/// into a channel of [`Config::channel_size`](crate::Config::channel_size)
/// slots, so it runs at most that many items ahead of the consumer. Ordering
/// and the no-partial-item guarantee are the ones of [`Sequence`].
///
/// Dropping the feed cancels the task. Use [`Feed::close`] to also wait for it.
#[derive(Debug)]
pub struct Feed<T> {
    id: SequenceId,
    receiver: mpsc::Receiver<Result<T>>,
    task: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
    done: bool,
}

impl<T> Unpin for Feed<T> {}

impl<T: Send + 'static> Feed<T> {
    pub(crate) fn spawn<I>(sequence: Sequence<I>, channel_size: usize) -> Self
    where
        I: Iterator<Item = T> + Send + 'static,
    {
        let id = sequence.id();
        let cancel_token = sequence.cancel_token();
        let (tx, rx) = mpsc::channel(channel_size);
        let task = tokio::spawn(drive(sequence, tx));
        Self {
            id,
            receiver: rx,
            task: Some(task),
            cancel_token,
            done: false,
        }
    }
}

impl<T> Feed<T> {
    #[inline]
    pub fn id(&self) -> SequenceId {
        self.id
    }

    /// Receive the next item. Returns `None` once the feed has ended.
    ///
    /// If the producing task panicked, the last item is
    /// [`Error::ProducerJoin`](crate::Error::ProducerJoin).
    pub async fn recv(&mut self) -> Option<Result<T>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Stop producing. Items already in the channel can still be received,
    /// followed by [`Error::Cancelled`](crate::Error::Cancelled) if the task was mid-wait.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Whether the producing task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel the producing task and wait for it to end.
    pub async fn close(mut self) -> Result<()> {
        self.cancel_token.cancel();
        self.receiver.close();
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}

async fn drive<I: Iterator>(mut sequence: Sequence<I>, sender: mpsc::Sender<Result<I::Item>>) {
    let id = sequence.id();
    debug!(sequence = %id, "feed started");
    while let Some(item) = sequence.pull().await {
        if sender.send(item).await.is_err() {
            break;
        }
    }
    debug!(sequence = %id, state = %sequence.state(), "feed stopped");
}

impl<T> Stream for Feed<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        if let Some(item) = std::task::ready!(this.receiver.poll_recv(cx)) {
            return Poll::Ready(Some(item));
        }

        // The channel closes once the task is gone; find out how it ended.
        if let Some(task) = this.task.as_mut() {
            let joined = std::task::ready!(Pin::new(task).poll(cx));
            this.task = None;
            this.done = true;
            if let Err(e) = joined {
                warn!(sequence = %this.id, error = %e, "feed task failed");
                return Poll::Ready(Some(Err(Error::ProducerJoin(e))));
            }
        }
        this.done = true;
        Poll::Ready(None)
    }
}

impl<T> FusedStream for Feed<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<T> Drop for Feed<T> {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
