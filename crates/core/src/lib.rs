//! Wirebuf Core - Error taxonomy and shared wire value types

mod error;
mod types;
mod positions;

pub use error::*;
pub use types::*;
pub use positions::*;
