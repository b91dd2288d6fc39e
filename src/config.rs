use std::time::Duration;

use crate::{Error, Pacing, Result};

/// Configuration shared by every sequence a [`Producer`](crate::Producer) creates.
///
/// Use the builder methods to customize, or [`Default`] for an immediate,
/// unbounded-wait, single-slot setup.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use paced::Config;
///
/// let config = Config::default()
///     .with_delay(Duration::from_millis(5))        // Simulated latency per item
///     .with_max_wait(Duration::from_millis(50));   // Fail items that take longer
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Delay applied before each item is yielded.
    /// Default: [`Pacing::Immediate`]
    pub pacing: Pacing,

    /// Upper bound on a single item's wait. An item whose delay exceeds it
    /// fails with [`Error::Timeout`] and ends the sequence.
    /// Default: `None` (no bound)
    pub max_wait: Option<Duration>,

    /// Capacity of the channel behind a [`Feed`](crate::Feed).
    /// The producing task runs at most this many items ahead of the consumer.
    /// Default: 1
    pub channel_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pacing: Pacing::Immediate,
            max_wait: None,
            channel_size: 1,
        }
    }
}

impl Config {
    /// Use the same delay for every item.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.pacing = Pacing::Fixed(delay);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Bound the wait of every single item.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Set the channel capacity used by feeds.
    ///
    /// `1` keeps production in lock step with consumption. Larger values let
    /// the producing task buffer items while the consumer is busy.
    pub fn with_channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_size == 0 {
            return Err(Error::InvalidConfig(
                "channel_size must be greater than zero".into(),
            ));
        }
        if self.max_wait.is_some_and(|d| d.is_zero()) {
            return Err(Error::InvalidConfig(
                "max_wait must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.channel_size, 1);
        assert_eq!(config.max_wait, None);
        assert_eq!(config.pacing, Pacing::Immediate);
    }

    #[test]
    fn test_zero_channel_size_is_rejected() {
        let config = Config::default().with_channel_size(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_max_wait_is_rejected() {
        let config = Config::default().with_max_wait(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_chain() {
        let config = Config::default()
            .with_delay(Duration::from_millis(10))
            .with_max_wait(Duration::from_millis(30))
            .with_channel_size(4);
        assert_eq!(config.pacing, Pacing::Fixed(Duration::from_millis(10)));
        assert_eq!(config.max_wait, Some(Duration::from_millis(30)));
        assert_eq!(config.channel_size, 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{ "pacing": { "Fixed": { "secs": 0, "nanos": 5000000 } } }"#)
                .expect("valid config");
        assert_eq!(config.pacing, Pacing::Fixed(Duration::from_millis(5)));
        assert_eq!(config.channel_size, 1);

        let err = Config::from_json(r#"{ "channel_size": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
