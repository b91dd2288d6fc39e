use std::{fmt, sync::Arc, time::Duration};

/// How long each item of a sequence waits before it is handed to the consumer.
///
/// Pacing only shapes timing. It never changes which items are produced or
/// in which order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pacing {
    /// No delay, but every item still passes through one suspension point.
    #[default]
    Immediate,
    /// The same delay before every item.
    Fixed(Duration),
    /// Item `i` waits entry `i`. Items past the end reuse the last entry.
    PerItem(Arc<[Duration]>),
}

impl Pacing {
    pub fn fixed(delay: Duration) -> Self {
        Pacing::Fixed(delay)
    }

    pub fn per_item(delays: impl Into<Arc<[Duration]>>) -> Self {
        Pacing::PerItem(delays.into())
    }

    /// Delay applied before the item at `index` is yielded.
    pub fn delay_for(&self, index: usize) -> Duration {
        match self {
            Pacing::Immediate => Duration::ZERO,
            Pacing::Fixed(delay) => *delay,
            Pacing::PerItem(delays) => delays
                .get(index)
                .or_else(|| delays.last())
                .copied()
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Lower bound of the time needed to produce `count` items.
    pub fn total_for(&self, count: usize) -> Duration {
        match self {
            Pacing::Immediate => Duration::ZERO,
            Pacing::Fixed(delay) => delay.saturating_mul(count.min(u32::MAX as usize) as u32),
            Pacing::PerItem(_) => (0..count).map(|i| self.delay_for(i)).sum(),
        }
    }

    pub fn is_immediate(&self) -> bool {
        match self {
            Pacing::Immediate => true,
            Pacing::Fixed(delay) => delay.is_zero(),
            Pacing::PerItem(delays) => delays.iter().all(Duration::is_zero),
        }
    }
}

impl From<Duration> for Pacing {
    fn from(delay: Duration) -> Self {
        Pacing::Fixed(delay)
    }
}

impl fmt::Display for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pacing::Immediate => write!(f, "Immediate"),
            Pacing::Fixed(delay) => write!(f, "Fixed({delay:?})"),
            Pacing::PerItem(delays) => write!(f, "PerItem({} delays)", delays.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fixed_delay_is_the_same_for_every_item() {
        let pacing = Pacing::fixed(5 * MS);
        assert_eq!(pacing.delay_for(0), 5 * MS);
        assert_eq!(pacing.delay_for(100), 5 * MS);
        assert_eq!(pacing.total_for(7), 35 * MS);
    }

    #[test]
    fn test_per_item_reuses_last_entry() {
        let pacing = Pacing::per_item(vec![MS, 3 * MS, 2 * MS]);
        assert_eq!(pacing.delay_for(0), MS);
        assert_eq!(pacing.delay_for(1), 3 * MS);
        assert_eq!(pacing.delay_for(2), 2 * MS);
        assert_eq!(pacing.delay_for(9), 2 * MS);
        assert_eq!(pacing.total_for(4), 8 * MS);
    }

    #[test]
    fn test_empty_per_item_is_immediate() {
        let pacing = Pacing::per_item(Vec::new());
        assert_eq!(pacing.delay_for(0), Duration::ZERO);
        assert!(pacing.is_immediate());
    }

    #[test]
    fn test_from_duration() {
        assert_eq!(Pacing::from(10 * MS), Pacing::Fixed(10 * MS));
        assert!(!Pacing::from(10 * MS).is_immediate());
        assert!(Pacing::from(Duration::ZERO).is_immediate());
    }
}
