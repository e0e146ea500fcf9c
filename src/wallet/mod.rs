//! Wallet Module
//!
//! Handles key material: private key parsing, key pair derivation with
//! lease tracking, and recipient address validation.

mod address_validation;
mod keypair;
pub mod tracker;

pub use address_validation::*;
pub use keypair::*;
pub use tracker::{CountingTracker, KeyTracker, NoopTracker};
