//! Transaction Module
//!
//! Signs canonical encodings and orchestrates the derive, encode and sign
//! pipeline.

mod builder;
mod signer;

pub use builder::*;
pub use signer::*;
