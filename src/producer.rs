use std::{ops::Range, sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{Config, Feed, Result, Sequence};

/// Produces lazy sequences over a fixed, ordered source.
///
/// - `produce()` returns a fresh [`Sequence`]; nothing runs until it is pulled.
/// - `feed()` returns a [`Feed`], the same sequence driven by a spawned task.
/// - `shutdown()` cancels every sequence and feed this producer created.
///
/// The source is cloned for every sequence, so sequences never share a cursor
/// and each one starts from the first item.
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> paced::Result {
/// use std::time::Duration;
/// use paced::Producer;
///
/// let producer = Producer::counting(3, Duration::from_millis(10));
/// assert_eq!(producer.produce().collect_all().await?, vec![0, 1, 2]);
/// assert_eq!(producer.produce().collect_all().await?, vec![0, 1, 2]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Producer<S> {
    source: S,
    config: Arc<Config>,
    cancel_token: CancellationToken,
}

impl<S> Producer<S>
where
    S: IntoIterator + Clone,
{
    /// Producer with the same `per_item_delay` before every item.
    pub fn new(source: S, per_item_delay: Duration) -> Self {
        Self {
            source,
            config: Arc::new(Config::default().with_delay(per_item_delay)),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_config(source: S, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config: Arc::new(config),
            cancel_token: CancellationToken::new(),
        })
    }

    /// Create a new sequence over the whole source.
    pub fn produce(&self) -> Sequence<S::IntoIter> {
        Sequence::new(
            self.source.clone().into_iter(),
            &self.config,
            self.cancel_token.child_token(),
        )
    }

    /// Create a new sequence and drive it from a spawned task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn feed(&self) -> Feed<S::Item>
    where
        S::IntoIter: Send + 'static,
        S::Item: Send + 'static,
    {
        Feed::spawn(self.produce(), self.config.channel_size)
    }

    /// Cancel all sequences and feeds created by this producer, including
    /// the ones created after this call.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }
}

impl Producer<Range<usize>> {
    /// Producer over the integers `[0, count)`.
    pub fn counting(count: usize, per_item_delay: Duration) -> Self {
        Self::new(0..count, per_item_delay)
    }
}

/// Lazy sequence over `source` with the same `per_item_delay` before every item.
///
/// Shorthand for `Producer::new(source, per_item_delay).produce()` that does
/// not keep the producer around.
pub fn produce<S: IntoIterator>(source: S, per_item_delay: Duration) -> Sequence<S::IntoIter> {
    Sequence::new(
        source.into_iter(),
        &Config::default().with_delay(per_item_delay),
        CancellationToken::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, SequenceState};

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_invalid_config_is_rejected() {
        let res = Producer::with_config(vec![1], Config::default().with_channel_size(0));
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_produce_does_not_start_work() {
        let producer = Producer::counting(5, 10 * MS);
        let seq = producer.produce();
        assert_eq!(seq.state(), SequenceState::Idle);
        assert_eq!(seq.yielded(), 0);
        assert_eq!(producer.source(), &(0..5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_live_and_future_sequences() {
        let producer = Producer::new(vec!['a', 'b', 'c'], 10 * MS);
        let mut live = producer.produce();
        assert_eq!(live.pull().await.unwrap().unwrap(), 'a');

        producer.shutdown();
        assert!(producer.is_shut_down());
        assert!(live.pull().await.unwrap().unwrap_err().is_cancelled());

        let mut late = producer.produce();
        assert!(late.pull().await.unwrap().unwrap_err().is_cancelled());
        assert!(late.pull().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelling_one_sequence_leaves_siblings_alone() {
        let producer = Producer::counting(2, MS);
        let first = producer.produce();
        let second = producer.produce();
        first.cancel();
        assert!(first.collect_all().await.unwrap_err().is_cancelled());
        assert_eq!(second.collect_all().await.unwrap(), vec![0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_free_function_produce() {
        let items = produce(["x", "y"], 5 * MS).collect_all().await.unwrap();
        assert_eq!(items, vec!["x", "y"]);
    }
}
