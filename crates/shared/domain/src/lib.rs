//! # Domain
//!
//! Plain data shared by every Platter crate. Dependencies stay at `serde` and
//! `bitflags`: no I/O, no async, only types and the validation that belongs to them.

pub mod config;
pub mod constants;
pub mod phone;
pub mod pincode;
pub mod registry;
pub mod roles;
