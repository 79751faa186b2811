//! integrated tests
pub mod toolkit;

mod events;
