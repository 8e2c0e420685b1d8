//! Async control flow for timeable work.
//!
//! Batch runners ([`concurrent`], [`consecutive`] and friends) settle every
//! invocation into a [`Settled`] record instead of failing fast. The timed
//! components ([`until_settled_or_timed_out`], [`poll`], [`wait_for`]) run on
//! the ambient tokio runtime and release their timers on every exit path.

mod concurrent;
mod consecutive;
mod facade;
mod outcome;
pub mod poll;
pub mod race;
pub mod timer;
pub mod wait;

pub use concurrent::{concurrent, concurrents};
pub use consecutive::{consecutive, consecutives};
pub use facade::{parallel, sequential};
pub use outcome::outcome;
pub use poll::{PollHandle, PollOptions, Stopped, TickOutcome, poll, poll_with};
pub use race::{Pending, Settle, until_settled_or_timed_out};
pub use timer::sleep;
pub use wait::wait_for;

pub use timeable_types::{Batch, Chunked, ExecutorFault, SettleStatus, Settled};
