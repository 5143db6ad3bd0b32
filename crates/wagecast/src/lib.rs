//! # Wagecast
//!
//! Umbrella crate: inference and feature alignment from [`wagecast_core`],
//! the offline selection pipeline from [`wagecast_trainer`].

pub use wagecast_core::*;

pub use wagecast_trainer as trainer;
