//! Clinic dashboard backend library.
//!
//! Hosts the access evaluator that decides which navigation items a user may
//! see, and the entity lifecycle manager that keeps configurable records
//! such as appointment statuses consistent.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;

pub use settings::ClinicSettings;
