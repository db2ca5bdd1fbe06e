//! `echo-core` -- pure domain logic for the ECHO operator console.
//!
//! Data model, alert lifecycle state machine, and the read-side
//! projections (sort/filter, map bounds fit). No I/O and no async: the
//! sync layer owns all effects and calls into this crate.

pub mod alert;
pub mod geo;
pub mod projection;
pub mod state_machine;
pub mod types;
