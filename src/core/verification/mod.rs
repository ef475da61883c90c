//! Output verification
//!
//! Re-reads the files listed in a manifest and checks that each still
//! exists with the recorded size and SHA-256 checksum.

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{VerificationFailure, VerificationReport};
pub use verify::Verifier;
