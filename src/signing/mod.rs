//! Transaction Encoding and Signature Compilation
//!
//! 1. Render the canonical encoding and its pre-image hash
//! 2. Compile a signature into the signed-transaction envelope
//! 3. Decode and verify envelopes

pub mod compiler;
pub mod preimage;

pub use compiler::*;
pub use preimage::*;
