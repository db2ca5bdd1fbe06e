//! `echo-client` -- REST client for the ECHO dashboard API.
//!
//! [`api::EchoApi`] implements the [`api::DashboardApi`] trait over
//! HTTP; [`snapshot`] holds the malformed-record drop policy for poll
//! payloads.

pub mod api;
pub mod snapshot;

pub use api::{ApiError, DashboardApi, EchoApi, StatsPeriod};
