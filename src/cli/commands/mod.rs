//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 1 partial failure, 2 configuration error, 5 fatal error,
//! 130 interrupted.

pub mod export;
pub mod init;
pub mod validate;
pub mod verify;
