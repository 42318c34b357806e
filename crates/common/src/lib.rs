//! Modular common utilities shared across mailsweep crates.
//!
//! Nothing in here knows about mail. The modules are generic building blocks
//! that `mailsweep-core` composes into the request executor.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

pub use resilience::{BackoffError, BackoffPolicy, BackoffPolicyBuilder};
