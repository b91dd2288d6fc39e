//! Paced - lazy async sequences with per-item latency
//!
//! A [`Producer`] turns a finite, ordered source into [`Sequence`]s that
//! yield one item at a time, each after a simulated delay, without blocking
//! the calling thread. Consumers pull items as they arrive and may stop at
//! any point; nothing is produced ahead of demand.
//!
//! See `demos/names.rs` and `demos/numbers.rs`.

mod config;
mod error;
mod feed;
mod pacing;
mod producer;
mod sequence;
mod state;

pub use config::Config;
pub use error::Error;
pub use feed::Feed;
pub use pacing::Pacing;
pub use producer::{Producer, produce};
pub use sequence::Sequence;
pub use state::SequenceState;

pub type Result<T = ()> = std::result::Result<T, Error>;
pub type SequenceId = u128;
