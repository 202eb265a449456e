//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Store call:
//!     → timeouts.rs (bounded probe at startup, bounded command afterwards)
//!     → error returned to the caller, never retried here
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every store round trip has a deadline
//! - No retries or backoff: startup fails fast, runtime errors go to the caller

pub mod timeouts;

pub use timeouts::with_deadline;
