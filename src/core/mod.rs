//! Canonical invoice model, builders, and numeric normalization.
//!
//! The canonical model is the already-calculated system of record that the
//! UBL mappers read from and write to. Nothing here computes taxes or
//! totals.

mod builder;
mod error;
pub mod num;
mod types;
pub mod units;

pub use builder::*;
pub use error::*;
pub use num::{Percentage, normalize_numeric_string};
pub use types::*;
pub use units::is_known_unit_code;
