//! Pure helpers shared by the timeable runners.
//!
//! - **`number`**: loose numeric coercion (`to_number`, `concurrency_from`)
//! - **`chunk`**: fixed-size partitioning with identity pass-through
//! - **`append`**: in-place accumulation

pub mod append;
pub mod chunk;
pub mod number;

pub use append::append;
pub use chunk::chunk;
pub use number::{ToNumber, concurrency_from, to_number};
