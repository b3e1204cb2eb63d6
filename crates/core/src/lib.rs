#![forbid(unsafe_code)]

//! Domain model for the quiz practice workspace.
//!
//! Everything in this crate is pure: no I/O, no async, no global state.

pub mod error;
pub mod model;
pub mod review;
pub mod time;

pub use error::Error;
pub use time::Clock;
