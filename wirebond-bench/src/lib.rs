//! # WireBond Bench
//!
//! Payload fixtures shared by the WireBond benchmarks.

pub mod fixtures;
