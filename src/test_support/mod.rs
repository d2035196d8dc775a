//! Test-only utilities shared across the crate's unit and integration
//! tests.

pub mod fixture;
