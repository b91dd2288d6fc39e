use std::fmt;

/// Lifecycle of a [`Sequence`](crate::Sequence).
///
/// ```text
/// Idle -> Producing(i) -> [Yielded(i) -> Producing(i+1)]* -> Done | Cancelled | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SequenceState {
    /// Created, nothing pulled yet.
    #[default]
    Idle,
    /// Waiting out the delay of the item at the given index.
    Producing(usize),
    /// The item at the given index has been handed to the consumer.
    Yielded(usize),
    /// The source is exhausted.
    Done,
    /// Shutdown or explicit cancel.
    Cancelled,
    /// An item exceeded its max wait.
    Failed,
}

impl SequenceState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SequenceState::Done | SequenceState::Cancelled | SequenceState::Failed
        )
    }

    pub fn is_producing(&self) -> bool {
        matches!(self, SequenceState::Producing(_))
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceState::Idle => write!(f, "Idle"),
            SequenceState::Producing(i) => write!(f, "Producing({i})"),
            SequenceState::Yielded(i) => write!(f, "Yielded({i})"),
            SequenceState::Done => write!(f, "Done"),
            SequenceState::Cancelled => write!(f, "Cancelled"),
            SequenceState::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SequenceState;

    #[test]
    fn test_terminal_states() {
        assert!(!SequenceState::Idle.is_terminal());
        assert!(!SequenceState::Producing(0).is_terminal());
        assert!(!SequenceState::Yielded(3).is_terminal());
        assert!(SequenceState::Done.is_terminal());
        assert!(SequenceState::Cancelled.is_terminal());
        assert!(SequenceState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(SequenceState::Producing(2).to_string(), "Producing(2)");
        assert_eq!(SequenceState::Done.to_string(), "Done");
    }
}
