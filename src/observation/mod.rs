//! Observation records and their annotations
mod lli;
mod record;
mod value;

pub mod flag;

pub use flag::EpochFlag;
pub use lli::LliFlags;
pub use record::{Record, SignalMap};
pub use value::{AnnotatedValue, WavelengthFactor};
