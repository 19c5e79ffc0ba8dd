//! Draw-probability math and the point-in-time risk queries built on it.
//!
//! - `combinatorics`: pure hypergeometric helpers with no state of their own.
//! - `forecast`: read-only queries over a session's decks and locations.

pub mod combinatorics;
pub mod forecast;

pub use combinatorics::{at_least_n_draws, exactly_n_draws};
pub use forecast::Forecaster;
