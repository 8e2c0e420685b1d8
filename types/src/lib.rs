//! Core data types for timeable.
//!
//! Pure data with no IO and no async, usable from every layer:
//!
//! - **`Settled`**: tagged outcome of one executor invocation
//! - **`Batch`** / **`Chunked`**: what the batch runners hand to executors
//! - **`ExecutorFault`**: panics and abandoned races, convertible into caller errors

#![allow(clippy::missing_errors_doc)]

mod batch;
mod fault;
mod settled;

pub use batch::{Batch, Chunked};
pub use fault::ExecutorFault;
pub use settled::{SettleStatus, Settled};
